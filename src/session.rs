use crate::chat::{ChatReply, Responder, is_photo_request};
use crate::config::Config;
use crate::fallback;
use crate::models::{
    Conversation, DatingPreferences, Gender, Match, Message, ModelSettings, Profile, Sender, new_id,
};
use crate::status::{ServiceStatus, SharedStatus};
use crate::storage::{Storage, StorageKey};
use anyhow::{Context, Result, bail};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

const DISCOVER_ATTEMPTS_PER_PROFILE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileState {
    Absent,
    Created(Profile),
}

/// Step-by-step profile creation. Blank bio and photo are filled in procedurally.
#[derive(Debug, Clone, Default)]
pub struct ProfileSetup {
    name: String,
    age: u8,
    gender: Option<Gender>,
    location: String,
    bio: String,
    interests: Vec<String>,
    image_url: String,
}

impl ProfileSetup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn basics(mut self, name: &str, age: u8, gender: Gender, location: &str) -> Self {
        self.name = name.trim().to_string();
        self.age = age;
        self.gender = Some(gender);
        self.location = location.trim().to_string();
        self
    }

    pub fn bio(mut self, bio: &str) -> Self {
        self.bio = bio.trim().to_string();
        self
    }

    pub fn interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests.clear();
        for interest in interests {
            let interest: String = interest.into();
            let interest = interest.trim().to_string();
            if !interest.is_empty() && !self.interests.contains(&interest) {
                self.interests.push(interest);
            }
        }
        self
    }

    pub fn photo(mut self, url: &str) -> Self {
        self.image_url = url.trim().to_string();
        self
    }

    pub fn finish(self) -> Result<Profile> {
        let Some(gender) = self.gender else {
            bail!("Profile basics are missing");
        };
        if self.name.is_empty() {
            bail!("Name is required");
        }
        if self.age < 18 {
            bail!("You must be at least 18 to create a profile");
        }
        if self.interests.is_empty() {
            bail!("Pick at least one interest");
        }

        let bio = if self.bio.is_empty() {
            fallback::random_bio(&self.interests)
        } else {
            self.bio
        };
        let image_url = if self.image_url.is_empty() {
            fallback::random_photo_url(gender)
        } else {
            self.image_url
        };

        Ok(Profile {
            id: new_id(),
            name: self.name,
            age: self.age,
            gender,
            location: self.location,
            bio,
            image_url,
            interests: self.interests,
        })
    }
}

/// Loads persisted model choices, falling back to the configured defaults.
pub fn load_model_settings(storage: &Storage, config: &Config) -> Result<ModelSettings> {
    Ok(storage
        .load_optional(StorageKey::ModelSettings)?
        .unwrap_or_else(|| ModelSettings::from_config(config)))
}

pub struct DatingSession {
    storage: Storage,
    responder: Responder,
    status: SharedStatus,
    models: Arc<RwLock<ModelSettings>>,
    demo_forced: bool,
}

impl DatingSession {
    pub fn new(
        config: &Config,
        storage: Storage,
        responder: Responder,
        status: SharedStatus,
        models: Arc<RwLock<ModelSettings>>,
    ) -> Self {
        Self {
            storage,
            responder,
            status,
            models,
            demo_forced: config.demo_mode,
        }
    }

    pub async fn status(&self) -> ServiceStatus {
        self.status.read().await.clone()
    }

    /// Forced demo mode sticks until turned off; otherwise demo mode follows the LLM probe.
    pub async fn demo_mode(&self) -> bool {
        self.demo_forced || !self.status.read().await.llm_available
    }

    pub fn set_demo_forced(&mut self, forced: bool) {
        self.demo_forced = forced;
        info!("Demo mode {}", if forced { "forced on" } else { "automatic" });
    }

    pub fn demo_forced(&self) -> bool {
        self.demo_forced
    }

    pub fn profile_state(&self) -> Result<ProfileState> {
        Ok(match self.storage.load_optional(StorageKey::Profile)? {
            Some(profile) => ProfileState::Created(profile),
            None => ProfileState::Absent,
        })
    }

    pub fn create_profile(&self, profile: &Profile) -> Result<()> {
        self.storage.save(StorageKey::Profile, profile)?;
        info!("Created profile for {}", profile.name);
        Ok(())
    }

    pub fn update_profile(&self, profile: &Profile) -> Result<()> {
        if !self.storage.exists(StorageKey::Profile) {
            bail!("No profile to update; finish setup first");
        }
        self.storage.save(StorageKey::Profile, profile)
    }

    /// Back to the setup wizard; matches and conversations are kept.
    pub fn delete_profile(&self) -> Result<()> {
        self.storage.remove(StorageKey::Profile)?;
        info!("Deleted profile");
        Ok(())
    }

    pub fn preferences(&self) -> Result<DatingPreferences> {
        self.storage.load(StorageKey::Preferences)
    }

    pub fn save_preferences(&self, preferences: &DatingPreferences) -> Result<()> {
        if preferences.min_age > preferences.max_age {
            bail!(
                "Minimum age {} is above maximum age {}",
                preferences.min_age,
                preferences.max_age
            );
        }
        self.storage.save(StorageKey::Preferences, preferences)
    }

    /// Candidate profiles matching the saved preferences. May return fewer than `count`
    /// when the preferences exclude most generated profiles.
    pub fn discover(&self, count: usize) -> Result<Vec<Profile>> {
        let preferences = self.preferences()?;
        Ok(std::iter::repeat_with(fallback::random_profile)
            .take(count.saturating_mul(DISCOVER_ATTEMPTS_PER_PROFILE))
            .filter(|p| preferences.accepts(p))
            .take(count)
            .collect())
    }

    pub fn matches(&self) -> Result<Vec<Match>> {
        self.storage.load(StorageKey::Matches)
    }

    pub fn conversations(&self) -> Result<Vec<Conversation>> {
        self.storage.load(StorageKey::Conversations)
    }

    pub fn conversation(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self.conversations()?.into_iter().find(|c| c.id == id))
    }

    /// Tap to like: every like is a match and opens a conversation.
    pub fn like(&self, profile: Profile) -> Result<Conversation> {
        let matched = Match {
            id: new_id(),
            profile,
            matched_at: Utc::now(),
        };
        let mut conversation = Conversation::open(&matched);
        conversation.push(Message::new(Sender::Match, fallback::random_opener(), None));

        let mut matches = self.matches()?;
        matches.push(matched.clone());
        self.storage.save(StorageKey::Matches, &matches)?;

        let mut conversations = self.conversations()?;
        conversations.push(conversation.clone());
        self.storage.save(StorageKey::Conversations, &conversations)?;

        info!("Matched with {}", matched.profile.name);
        Ok(conversation)
    }

    pub fn unmatch(&self, match_id: &str) -> Result<bool> {
        let mut matches = self.matches()?;
        let before = matches.len();
        matches.retain(|m| m.id != match_id);
        if matches.len() == before {
            return Ok(false);
        }
        self.storage.save(StorageKey::Matches, &matches)?;

        let mut conversations = self.conversations()?;
        conversations.retain(|c| c.match_id != match_id);
        self.storage.save(StorageKey::Conversations, &conversations)?;
        Ok(true)
    }

    pub fn delete_conversation(&self, id: &str) -> Result<bool> {
        let mut conversations = self.conversations()?;
        let before = conversations.len();
        conversations.retain(|c| c.id != id);
        if conversations.len() == before {
            return Ok(false);
        }
        self.storage.save(StorageKey::Conversations, &conversations)?;
        Ok(true)
    }

    /// Appends the user's message, gets a reply from the live services or the demo
    /// generator, appends that too and returns it.
    pub async fn send_message(&self, conversation_id: &str, text: &str) -> Result<Message> {
        let text = text.trim();
        if text.is_empty() {
            bail!("Message is empty");
        }

        let mut conversations = self.conversations()?;
        let index = conversations
            .iter()
            .position(|c| c.id == conversation_id)
            .with_context(|| format!("Conversation {} not found", conversation_id))?;
        conversations[index].push(Message::new(Sender::User, text, None));
        self.storage.save(StorageKey::Conversations, &conversations)?;

        let persona = self.match_profile(&conversations[index].match_id)?;
        let reply = if self.demo_mode().await {
            Self::demo_reply(text, persona.as_ref())
        } else {
            let models = self.models.read().await.clone();
            self.responder
                .complete_as(text, persona.as_ref(), &models)
                .await
        };

        let message = conversations[index]
            .push(Message::new(Sender::Match, reply.text, reply.image))
            .clone();
        self.storage.save(StorageKey::Conversations, &conversations)?;
        Ok(message)
    }

    fn demo_reply(text: &str, persona: Option<&Profile>) -> ChatReply {
        let mut reply = fallback::random_reply();
        if is_photo_request(text) {
            let gender = persona.map_or(Gender::Woman, |p| p.gender);
            reply.image = Some(fallback::random_photo_url(gender));
        }
        reply
    }

    fn match_profile(&self, match_id: &str) -> Result<Option<Profile>> {
        Ok(self
            .matches()?
            .into_iter()
            .find(|m| m.id == match_id)
            .map(|m| m.profile))
    }

    pub async fn model_settings(&self) -> ModelSettings {
        self.models.read().await.clone()
    }

    pub async fn select_models(&self, settings: ModelSettings) -> Result<()> {
        self.storage.save(StorageKey::ModelSettings, &settings)?;
        info!(
            "Using models {} / {}",
            settings.llm_model, settings.stable_diffusion_model
        );
        *self.models.write().await = settings;
        Ok(())
    }
}
