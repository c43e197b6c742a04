use super::{Result, ServiceError, TextGenerator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub system: String,
    pub stream: bool,
}

impl GenerateRequest {
    pub fn new(model: &str, prompt: &str, system: &str) -> Self {
        Self {
            model: model.to_string(),
            prompt: prompt.to_string(),
            system: system.to_string(),
            stream: false,
        }
    }
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Clone)]
pub struct TextGenClient {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl TextGenClient {
    pub fn new(client: reqwest::Client, base_url: &str, request_timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout,
        }
    }
}

#[async_trait]
impl TextGenerator for TextGenClient {
    async fn list_models(&self, timeout: Duration) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).timeout(timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let tags: TagsResponse = response.json().await?;
        debug!("Text-gen service lists {} models", tags.models.len());
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
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

        let body: GenerateResponse = response.json().await?;
        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_request_is_non_streaming() {
        let request = GenerateRequest::new("llama3", "hi", "be nice");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3");
        assert_eq!(json["system"], "be nice");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn tags_tolerate_missing_model_list() {
        let tags: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(tags.models.is_empty());
    }

    #[tokio::test]
    async fn unreachable_service_reports_network_error() {
        let client = TextGenClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/",
            Duration::from_secs(1),
        );
        let err = client
            .list_models(Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.is_unreachable());
    }
}
