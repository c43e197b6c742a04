use super::{GenerateRequest, ImageGenerator, Result, ServiceError, TextGenerator, Txt2ImgRequest};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const FAKE_IMAGE: &str = "data:image/png;base64,aGVsbG8=";

/// Answers every completion with `reply`, or fails like a dead service when `None`.
pub struct FakeText {
    reply: Option<&'static str>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl FakeText {
    pub fn new(reply: Option<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeText {
    async fn list_models(&self, _timeout: Duration) -> Result<Vec<String>> {
        match self.reply {
            Some(_) => Ok(vec!["llama3".to_string()]),
            None => Err(ServiceError::Network("connection refused".to_string())),
        }
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Network("connection refused".to_string()))
    }
}

pub struct FakeImage {
    succeed: bool,
    prompts: Mutex<Vec<String>>,
}

impl FakeImage {
    pub fn new(succeed: bool) -> Arc<Self> {
        Arc::new(Self {
            succeed,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for FakeImage {
    async fn list_models(&self, _timeout: Duration) -> Result<Vec<String>> {
        if self.succeed {
            Ok(vec!["dreamshaper_8".to_string()])
        } else {
            Err(ServiceError::Timeout)
        }
    }

    async fn txt2img(&self, request: &Txt2ImgRequest) -> Result<String> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        if self.succeed {
            Ok(FAKE_IMAGE.to_string())
        } else {
            Err(ServiceError::Api {
                status: 500,
                message: "out of memory".to_string(),
            })
        }
    }
}
