use crate::config::Config;
use crate::models::ModelSettings;
use crate::services::{ImageGenerator, TextGenerator};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableModels {
    pub llm: Vec<String>,
    pub stable_diffusion: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub is_running: bool,
    pub llm_available: bool,
    pub llm_model: String,
    pub stable_diffusion_available: bool,
    pub available_models: AvailableModels,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceStatus {
    fn combine(
        llm: Option<Vec<String>>,
        sd: Option<Vec<String>>,
        selected_llm: &str,
    ) -> Self {
        // Image models are only reported while the text-gen service is reachable.
        let Some(llm_models) = llm else {
            return Self {
                error: Self::summarize(false, false),
                ..Self::default()
            };
        };
        let is_running = true;
        let llm_available = !llm_models.is_empty();
        let llm_model = if llm_models.iter().any(|m| m == selected_llm) {
            selected_llm.to_string()
        } else {
            llm_models.first().cloned().unwrap_or_default()
        };
        let stable_diffusion_available = sd.is_some();

        Self {
            is_running,
            llm_available,
            llm_model,
            stable_diffusion_available,
            available_models: AvailableModels {
                llm: llm_models,
                stable_diffusion: sd.unwrap_or_default(),
            },
            error: Self::summarize(llm_available, stable_diffusion_available),
        }
    }

    fn summarize(llm_available: bool, sd_available: bool) -> Option<String> {
        let mut missing = Vec::new();
        if !llm_available {
            missing.push("LLM (text generation)");
        }
        if !sd_available {
            missing.push("Stable Diffusion (image generation)");
        }
        if missing.is_empty() {
            return None;
        }
        let verb = if missing.len() == 1 { "is" } else { "are" };
        Some(format!("{} {} not available", missing.join(" and "), verb))
    }
}

pub struct StatusProbe {
    text_gen: Arc<dyn TextGenerator>,
    image_gen: Arc<dyn ImageGenerator>,
    probe_timeout: Duration,
    image_probe_timeout: Duration,
}

impl StatusProbe {
    pub fn new(
        config: &Config,
        text_gen: Arc<dyn TextGenerator>,
        image_gen: Arc<dyn ImageGenerator>,
    ) -> Self {
        Self {
            text_gen,
            image_gen,
            probe_timeout: config.probe_timeout,
            image_probe_timeout: config.image_probe_timeout,
        }
    }

    /// Probes both services concurrently. Unreachable services are a normal outcome
    /// and only show up as `false` flags and empty lists.
    pub async fn probe(&self, models: &ModelSettings) -> ServiceStatus {
        let (llm, sd) = tokio::join!(
            self.text_gen.list_models(self.probe_timeout),
            self.image_gen.list_models(self.image_probe_timeout),
        );

        let llm = match llm {
            Ok(models) => Some(models),
            Err(e) if e.is_unreachable() => {
                debug!("Text-gen service unreachable: {}", e);
                None
            }
            Err(e) => {
                warn!("Text-gen service probe failed: {}", e);
                None
            }
        };
        let sd = match sd {
            Ok(models) => Some(models),
            Err(e) if e.is_unreachable() => {
                debug!("Image-gen service unreachable: {}", e);
                None
            }
            Err(e) => {
                warn!("Image-gen service probe failed: {}", e);
                None
            }
        };

        ServiceStatus::combine(llm, sd, &models.llm_model)
    }
}

pub type SharedStatus = Arc<RwLock<ServiceStatus>>;

/// Re-probes on a fixed interval regardless of earlier failures.
pub struct StatusMonitor {
    probe: Arc<StatusProbe>,
    status: SharedStatus,
    models: Arc<RwLock<ModelSettings>>,
    interval: Duration,
}

impl StatusMonitor {
    pub fn new(
        probe: Arc<StatusProbe>,
        status: SharedStatus,
        models: Arc<RwLock<ModelSettings>>,
        interval: Duration,
    ) -> Self {
        Self {
            probe,
            status,
            models,
            interval,
        }
    }

    pub async fn refresh(&self) -> ServiceStatus {
        let models = self.models.read().await.clone();
        let next = self.probe.probe(&models).await;

        let mut current = self.status.write().await;
        if current.llm_available != next.llm_available {
            info!(
                "Text generation {}",
                if next.llm_available { "available" } else { "unavailable" }
            );
        }
        if current.stable_diffusion_available != next.stable_diffusion_available {
            info!(
                "Image generation {}",
                if next.stable_diffusion_available {
                    "available"
                } else {
                    "unavailable"
                }
            );
        }
        *current = next.clone();
        next
    }

    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + self.interval;
            let mut ticker = tokio::time::interval_at(start, self.interval);
            loop {
                ticker.tick().await;
                self.refresh().await;
            }
        })
    }
}
