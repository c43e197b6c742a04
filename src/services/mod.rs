//! Clients for the two optional local model services.
//!
//! Both are reached through traits so the status probe and the responder can run
//! against in-process fakes.

use async_trait::async_trait;
use std::time::Duration;

mod error;
mod image_gen;
mod text_gen;

#[cfg(test)]
pub mod testing;

pub use error::{Result, ServiceError};
pub use image_gen::{ImageGenClient, Txt2ImgRequest};
pub use text_gen::{GenerateRequest, TextGenClient};

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Names of the models the service has pulled.
    async fn list_models(&self, timeout: Duration) -> Result<Vec<String>>;

    /// Non-streaming completion; returns the raw `response` string.
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Checkpoint titles known to the service.
    async fn list_models(&self, timeout: Duration) -> Result<Vec<String>>;

    /// Generates one image and returns it as a PNG data URL.
    async fn txt2img(&self, request: &Txt2ImgRequest) -> Result<String>;
}
