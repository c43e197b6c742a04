use super::{ImageGenerator, Result, ServiceError};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const NEGATIVE_PROMPT: &str = "deformed, distorted, disfigured, blurry, low quality, watermark, \
                               text, extra limbs, bad anatomy, nsfw";

#[derive(Debug, Clone, Serialize)]
pub struct Txt2ImgRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub cfg_scale: f32,
    pub sampler_name: String,
    pub restore_faces: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_settings: Option<serde_json::Value>,
}

impl Txt2ImgRequest {
    /// Portrait-shaped request; an empty model name leaves the loaded checkpoint in place.
    pub fn portrait(prompt: &str, model: &str) -> Self {
        let override_settings =
            (!model.is_empty()).then(|| json!({ "sd_model_checkpoint": model }));
        Self {
            prompt: prompt.to_string(),
            negative_prompt: NEGATIVE_PROMPT.to_string(),
            width: 512,
            height: 768,
            steps: 25,
            cfg_scale: 7.0,
            sampler_name: "DPM++ 2M Karras".to_string(),
            restore_faces: true,
            override_settings,
        }
    }
}

#[derive(Deserialize)]
struct SdModel {
    title: String,
}

#[derive(Deserialize)]
struct Txt2ImgResponse {
    #[serde(default)]
    images: Vec<String>,
}

pub fn png_data_url(image_b64: &str) -> Result<String> {
    let trimmed = image_b64.trim();
    STANDARD
        .decode(trimmed.as_bytes())
        .map_err(|e| ServiceError::MalformedResponse(format!("invalid image payload: {}", e)))?;
    Ok(format!("data:image/png;base64,{}", trimmed))
}

#[derive(Clone)]
pub struct ImageGenClient {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl ImageGenClient {
    pub fn new(client: reqwest::Client, base_url: &str, request_timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout,
        }
    }
}

#[async_trait]
impl ImageGenerator for ImageGenClient {
    async fn list_models(&self, timeout: Duration) -> Result<Vec<String>> {
        let url = format!("{}/sdapi/v1/sd-models", self.base_url);
        let response = self.client.get(&url).timeout(timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let models: Vec<SdModel> = response.json().await?;
        Ok(models.into_iter().map(|m| m.title).collect())
    }

    async fn txt2img(&self, request: &Txt2ImgRequest) -> Result<String> {
        let url = format!("{}/sdapi/v1/txt2img", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: Txt2ImgResponse = response.json().await?;
        let first = body
            .images
            .first()
            .ok_or_else(|| ServiceError::MalformedResponse("no images returned".to_string()))?;
        png_data_url(first)
    }
}
