use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    services: ServicesConfig,
    status: StatusConfig,
    models: ModelsConfig,
    storage: StorageConfig,
    app: AppConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ServicesConfig {
    text_gen_url: String,
    image_gen_url: String,
    request_timeout: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            text_gen_url: "http://localhost:11434".to_string(),
            image_gen_url: "http://localhost:7860".to_string(),
            request_timeout: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct StatusConfig {
    probe_timeout: u64,
    image_probe_timeout: u64,
    poll_interval_secs: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            probe_timeout: 3,
            image_probe_timeout: 5,
            poll_interval_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ModelsConfig {
    llm: String,
    stable_diffusion: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            llm: "llama3".to_string(),
            stable_diffusion: "sd_xl_base_1.0.safetensors".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct StorageConfig {
    data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct AppConfig {
    demo_mode: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub text_gen_url: String,
    pub image_gen_url: String,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    pub image_probe_timeout: Duration,
    pub poll_interval: Duration,
    pub default_llm_model: String,
    pub default_sd_model: String,
    pub data_dir: PathBuf,
    pub demo_mode: bool,
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        Self {
            text_gen_url: file.services.text_gen_url.trim_end_matches('/').to_string(),
            image_gen_url: file.services.image_gen_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(file.services.request_timeout),
            probe_timeout: Duration::from_secs(file.status.probe_timeout),
            image_probe_timeout: Duration::from_secs(file.status.image_probe_timeout),
            poll_interval: Duration::from_secs(file.status.poll_interval_secs.max(1)),
            default_llm_model: file.models.llm,
            default_sd_model: file.models.stable_diffusion,
            data_dir: file.storage.data_dir.into(),
            demo_mode: file.app.demo_mode,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        ConfigFile::default().into()
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        let config_file: ConfigFile =
            toml::from_str(content).context("Failed to parse config file")?;
        Ok(config_file.into())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Reads `config.toml` from the working directory, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}
