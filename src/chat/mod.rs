mod persona;
mod reply;

pub use persona::{build_persona, default_photo_prompt};
pub use reply::{ChatReply, CompletionReply, IMAGE_MARKER, is_photo_request};

use crate::models::{ModelSettings, Profile};
use crate::services::{GenerateRequest, ImageGenerator, TextGenerator, Txt2ImgRequest};
use std::sync::Arc;
use tracing::{debug, warn};

pub const APOLOGY: &str = "Sorry, I'm having trouble responding right now. Please try again in a moment.";

/// Turns a user message into a `ChatReply` using the live services.
#[derive(Clone)]
pub struct Responder {
    text_gen: Arc<dyn TextGenerator>,
    image_gen: Arc<dyn ImageGenerator>,
}

impl Responder {
    pub fn new(text_gen: Arc<dyn TextGenerator>, image_gen: Arc<dyn ImageGenerator>) -> Self {
        Self {
            text_gen,
            image_gen,
        }
    }

    pub async fn complete(&self, message: &str, models: &ModelSettings) -> ChatReply {
        self.complete_as(message, None, models).await
    }

    /// Never fails: a failed completion becomes [`APOLOGY`], a failed image leaves the
    /// reply text-only.
    pub async fn complete_as(
        &self,
        message: &str,
        persona: Option<&Profile>,
        models: &ModelSettings,
    ) -> ChatReply {
        let system = build_persona(persona);
        let request = GenerateRequest::new(&models.llm_model, message, &system);

        let raw = match self.text_gen.generate(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Text generation failed: {}", e);
                return ChatReply::text(APOLOGY);
            }
        };

        match CompletionReply::parse(&raw) {
            CompletionReply::TextWithImage { text, image_prompt } => {
                debug!("Completion asked for an image: {}", image_prompt);
                let image = self.generate_image(&image_prompt, models).await;
                ChatReply { text, image }
            }
            CompletionReply::Text { text } if is_photo_request(message) => {
                let image = self
                    .generate_image(&default_photo_prompt(persona), models)
                    .await;
                ChatReply { text, image }
            }
            CompletionReply::Text { text } => ChatReply::text(text),
        }
    }

    async fn generate_image(&self, prompt: &str, models: &ModelSettings) -> Option<String> {
        let request = Txt2ImgRequest::portrait(prompt, &models.stable_diffusion_model);
        match self.image_gen.txt2img(&request).await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Image generation failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{FAKE_IMAGE, FakeImage, FakeText};

    #[tokio::test]
    async fn failed_completion_becomes_apology() {
        let image = FakeImage::new(true);
        let responder = Responder::new(FakeText::new(None), image.clone());
        let reply = responder
            .complete("send me a selfie", &ModelSettings::default())
            .await;
        assert_eq!(reply, ChatReply::text(APOLOGY));
        assert!(image.prompts().is_empty());
    }

    #[tokio::test]
    async fn marker_triggers_image_with_prompt_after_marker() {
        let image = FakeImage::new(true);
        let responder = Responder::new(
            FakeText::new(Some("Here you go! IMAGE_REQUEST: me hiking at golden hour")),
            image.clone(),
        );
        let reply = responder.complete("hi", &ModelSettings::default()).await;
        assert_eq!(reply.text, "Here you go!");
        assert_eq!(reply.image.as_deref(), Some(FAKE_IMAGE));
        assert_eq!(image.prompts(), vec!["me hiking at golden hour"]);
    }

    #[tokio::test]
    async fn photo_request_without_marker_tries_one_default_image() {
        let image = FakeImage::new(false);
        let responder = Responder::new(FakeText::new(Some("Haha, maybe!")), image.clone());
        let reply = responder
            .complete("can you send me a photo?", &ModelSettings::default())
            .await;
        assert_eq!(reply, ChatReply::text("Haha, maybe!"));
        let prompts = image.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("selfie"));
    }

    #[tokio::test]
    async fn plain_message_makes_no_image_call() {
        let image = FakeImage::new(true);
        let text = FakeText::new(Some("  Pretty good, you?  "));
        let responder = Responder::new(text.clone(), image.clone());
        let models = ModelSettings {
            llm_model: "mistral".to_string(),
            ..ModelSettings::default()
        };
        let reply = responder.complete("how's your week?", &models).await;
        assert_eq!(reply, ChatReply::text("Pretty good, you?"));
        assert!(image.prompts().is_empty());

        let requests = text.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "mistral");
        assert!(!requests[0].stream);
        assert!(requests[0].system.contains(IMAGE_MARKER));
    }
}
