use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Woman,
    Man,
}

impl Gender {
    pub fn photo_keyword(self) -> &'static str {
        match self {
            Gender::Woman => "woman",
            Gender::Man => "man",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub location: String,
    pub bio: String,
    pub image_url: String,
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestedIn {
    Woman,
    Man,
    Everyone,
}

impl InterestedIn {
    pub fn accepts(self, gender: Gender) -> bool {
        match self {
            InterestedIn::Everyone => true,
            InterestedIn::Woman => gender == Gender::Woman,
            InterestedIn::Man => gender == Gender::Man,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatingPreferences {
    pub min_age: u8,
    pub max_age: u8,
    pub max_distance_km: u32,
    pub interested_in: InterestedIn,
}

impl Default for DatingPreferences {
    fn default() -> Self {
        Self {
            min_age: 23,
            max_age: 38,
            max_distance_km: 50,
            interested_in: InterestedIn::Everyone,
        }
    }
}

impl DatingPreferences {
    pub fn accepts(&self, profile: &Profile) -> bool {
        (self.min_age..=self.max_age).contains(&profile.age)
            && self.interested_in.accepts(profile.gender)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub profile: Profile,
    pub matched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Match,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>, image: Option<String>) -> Self {
        Self {
            id: new_id(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
            image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub match_id: String,
    pub match_name: String,
    pub match_image: String,
    pub last_active: DateTime<Utc>,
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn open(matched: &Match) -> Self {
        Self {
            id: new_id(),
            match_id: matched.id.clone(),
            match_name: matched.profile.name.clone(),
            match_image: matched.profile.image_url.clone(),
            last_active: matched.matched_at,
            messages: Vec::new(),
        }
    }

    /// Messages are append-only; a timestamp older than the last message is
    /// bumped forward so the history stays chronological.
    pub fn push(&mut self, mut message: Message) -> &Message {
        if let Some(last) = self.messages.last()
            && message.timestamp < last.timestamp
        {
            message.timestamp = last.timestamp;
        }
        self.last_active = message.timestamp;
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSettings {
    pub llm_model: String,
    pub stable_diffusion_model: String,
}

impl ModelSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            llm_model: config.default_llm_model.clone(),
            stable_diffusion_model: config.default_sd_model.clone(),
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_match() -> Match {
        Match {
            id: new_id(),
            profile: Profile {
                id: new_id(),
                name: "Maya".to_string(),
                age: 29,
                gender: Gender::Woman,
                location: "Lisbon".to_string(),
                bio: "Coffee first.".to_string(),
                image_url: "https://example.test/maya.jpg".to_string(),
                interests: vec!["Hiking".to_string(), "Jazz".to_string()],
            },
            matched_at: Utc::now(),
        }
    }

    #[test]
    fn push_keeps_history_chronological() {
        let mut conversation = Conversation::open(&sample_match());
        let first = Message::new(Sender::User, "hey", None);
        let first_ts = first.timestamp;
        conversation.push(first);

        let mut late = Message::new(Sender::Match, "hi!", None);
        late.timestamp = first_ts - Duration::seconds(10);
        conversation.push(late);

        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[1].timestamp, first_ts);
        assert_eq!(conversation.last_active, first_ts);
    }

    #[test]
    fn preferences_filter_on_age_and_gender() {
        let matched = sample_match();
        let mut prefs = DatingPreferences::default();
        assert!(prefs.accepts(&matched.profile));

        prefs.interested_in = InterestedIn::Man;
        assert!(!prefs.accepts(&matched.profile));

        prefs.interested_in = InterestedIn::Woman;
        prefs.max_age = 28;
        assert!(!prefs.accepts(&matched.profile));
    }

    #[test]
    fn message_json_uses_camel_case_and_omits_missing_image() {
        let message = Message::new(Sender::Match, "hello", None);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["sender"], "match");
        assert!(json.get("image").is_none());
        assert!(json.get("timestamp").is_some());
    }
}
