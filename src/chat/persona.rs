use super::IMAGE_MARKER;
use crate::models::Profile;
use std::fmt::Write;

const PERSONA_BEHAVIOR: &str = "# Behavior\n\
                                - Reply like a real person texting on a dating app: warm, playful, curious.\n\
                                - Keep replies short, one to three sentences.\n\
                                - Ask a question back now and then to keep the conversation going.\n\
                                - Never mention being an AI, a model, or a simulation.\n\n";

const PERSONA_PHOTOS: &str = "# Photos\n\
                              If the other person asks for a photo, or sharing one fits the moment, \
                              end your reply with a new line of the form\n";

pub const DEFAULT_APPEARANCE: &str = "friendly person in their late twenties";

pub fn build_persona(profile: Option<&Profile>) -> String {
    let mut persona = String::with_capacity(1024);
    match profile {
        Some(p) => {
            let _ = write!(
                persona,
                "You are {}, a {}-year-old from {} chatting with a new match.\n\
                 About you: {}\n",
                p.name, p.age, p.location, p.bio
            );
            if !p.interests.is_empty() {
                let _ = writeln!(persona, "Your interests: {}.", p.interests.join(", "));
            }
            persona.push('\n');
        }
        None => persona.push_str(
            "You are a friendly, flirty person chatting with a new match on a dating app.\n\n",
        ),
    }
    persona.push_str(PERSONA_BEHAVIOR);
    persona.push_str(PERSONA_PHOTOS);
    let _ = write!(
        persona,
        "{marker} <short description of the photo>\n\
         Describe only what the photo shows. Otherwise never write {marker}\n",
        marker = IMAGE_MARKER
    );
    persona
}

/// Prompt for the photo sent when the model did not ask for one itself.
pub fn default_photo_prompt(profile: Option<&Profile>) -> String {
    let subject = match profile {
        Some(p) => format!("{}-year-old {}", p.age, p.gender.photo_keyword()),
        None => DEFAULT_APPEARANCE.to_string(),
    };
    format!(
        "casual smartphone selfie of a {}, smiling, natural light, candid, photorealistic",
        subject
    )
}
