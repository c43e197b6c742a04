use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const IMAGE_MARKER: &str = "IMAGE_REQUEST:";

static PHOTO_REQUEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(send|show|share|see|take|snap)\b.*\b(photo|pic|picture|selfie|image)s?\b|\bwhat do you look like\b",
    )
    .expect("valid photo request regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ChatReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }
}

/// A completion after the free-text marker has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CompletionReply {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    TextWithImage {
        text: String,
        image_prompt: String,
    },
}

impl CompletionReply {
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(IMAGE_MARKER) {
            Some((text, prompt)) if !prompt.trim().is_empty() => CompletionReply::TextWithImage {
                text: text.trim().to_string(),
                image_prompt: prompt.trim().to_string(),
            },
            Some((text, _)) => CompletionReply::Text {
                text: text.trim().to_string(),
            },
            None => CompletionReply::Text {
                text: raw.trim().to_string(),
            },
        }
    }
}

pub fn is_photo_request(message: &str) -> bool {
    PHOTO_REQUEST.is_match(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_splits_text_from_image_prompt() {
        let reply = CompletionReply::parse(
            "Sure, here's me at the beach! IMAGE_REQUEST: woman smiling on a beach at sunset",
        );
        assert_eq!(
            reply,
            CompletionReply::TextWithImage {
                text: "Sure, here's me at the beach!".to_string(),
                image_prompt: "woman smiling on a beach at sunset".to_string(),
            }
        );
    }

    #[test]
    fn dangling_marker_degrades_to_text() {
        let reply = CompletionReply::parse("Maybe later IMAGE_REQUEST:   ");
        assert_eq!(
            reply,
            CompletionReply::Text {
                text: "Maybe later".to_string()
            }
        );
    }

    #[test]
    fn tagged_json_shape() {
        let json = serde_json::to_value(CompletionReply::parse("hi IMAGE_REQUEST: a cat")).unwrap();
        assert_eq!(json["kind"], "textWithImage");
        assert_eq!(json["imagePrompt"], "a cat");
    }

    #[test]
    fn photo_heuristic() {
        assert!(is_photo_request("Can you send me a pic?"));
        assert!(is_photo_request("show me some PHOTOS of your trip"));
        assert!(is_photo_request("so what do you look like"));
        assert!(!is_photo_request("I love photography"));
        assert!(!is_photo_request("how was your weekend?"));
    }
}
