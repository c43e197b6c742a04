use crate::models::{Gender, ModelSettings, Profile, Sender};
use crate::session::{DatingSession, ProfileSetup, ProfileState};
use crate::status::{ServiceStatus, StatusMonitor};
use crate::utils::{describe_image, preview};
use anyhow::{Context, Result, bail};
use std::fmt::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

const HELP: &str = "Commands:\n\
                    \x20 setup <name> <age> <woman|man> <location>   start your profile\n\
                    \x20 bio <text>                                  set bio (during setup or after)\n\
                    \x20 interests <a, b, c>                         finish setup with your interests\n\
                    \x20 profile | reset                             show or delete your profile\n\
                    \x20 discover [n]                                show new people\n\
                    \x20 like <n>                                    like person n from discover\n\
                    \x20 matches | chats                             list matches or conversations\n\
                    \x20 open <n> | delete <n>                       open or delete conversation n\n\
                    \x20 unmatch <n>                                 remove match n and its conversation\n\
                    \x20 status | probe                              show or refresh service status\n\
                    \x20 demo on|off                                 force demo mode or go automatic\n\
                    \x20 models [llm] [sd]                           show or choose models\n\
                    \x20 quit\n\
                    Anything else is sent to the open conversation.";

const MAX_DISCOVER: usize = 20;

pub struct Console {
    session: DatingSession,
    monitor: Arc<StatusMonitor>,
    candidates: Vec<Profile>,
    open: Option<String>,
    setup: Option<ProfileSetup>,
}

impl Console {
    pub fn new(session: DatingSession, monitor: Arc<StatusMonitor>) -> Self {
        Self {
            session,
            monitor,
            candidates: Vec::new(),
            open: None,
            setup: None,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        println!("{}", self.greeting()?);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match self.handle(&line).await {
                Ok(Some(out)) if !out.is_empty() => println!("{}", out),
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(e) => {
                    error!("Command failed: {:#}", e);
                    println!("Something went wrong: {}", e);
                }
            }
        }
        Ok(())
    }

    fn greeting(&self) -> Result<String> {
        Ok(match self.session.profile_state()? {
            ProfileState::Absent => format!(
                "Welcome! Create your profile to start.\n\
                 e.g. setup Alex 29 woman Brooklyn, NY\n\n{}",
                HELP
            ),
            ProfileState::Created(p) => format!("Welcome back, {}! Type 'help' for commands.", p.name),
        })
    }

    /// Runs one command line. `Ok(None)` means quit.
    pub async fn handle(&mut self, line: &str) -> Result<Option<String>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Some(String::new()));
        }
        let (command, args) = line.split_once(' ').unwrap_or((line, ""));
        let args = args.trim();

        let out = match command {
            "quit" | "exit" => return Ok(None),
            "help" => HELP.to_string(),
            "setup" => self.start_setup(args)?,
            "bio" => self.set_bio(args)?,
            "interests" => self.finish_setup(args)?,
            "reset" => {
                self.session.delete_profile()?;
                self.setup = None;
                "Profile deleted. Use 'setup' to start again.".to_string()
            }
            "profile" => match self.session.profile_state()? {
                ProfileState::Absent => "No profile yet. Use 'setup'.".to_string(),
                ProfileState::Created(p) => format_profile(&p),
            },
            "discover" => self.discover(args)?,
            "like" => self.like(args)?,
            "matches" => self.list_matches()?,
            "chats" => self.list_chats()?,
            "open" => self.open_chat(args)?,
            "delete" => self.delete_chat(args)?,
            "unmatch" => self.unmatch(args)?,
            "status" => format_status(&self.session.status().await, self.session.demo_mode().await),
            "probe" => {
                let status = self.monitor.refresh().await;
                format_status(&status, self.session.demo_mode().await)
            }
            "demo" => self.demo(args)?,
            "models" => self.models(args).await?,
            _ => self.say(line).await?,
        };
        Ok(Some(out))
    }

    fn start_setup(&mut self, args: &str) -> Result<String> {
        let mut parts = args.splitn(4, ' ');
        let (Some(name), Some(age), Some(gender), Some(location)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            bail!("usage: setup <name> <age> <woman|man> <location>");
        };
        let age: u8 = age.parse().context("age must be a number")?;
        let gender = parse_gender(gender)?;
        self.setup = Some(ProfileSetup::new().basics(name, age, gender, location));
        Ok("Nice! Optionally add a 'bio', then finish with 'interests a, b, c'.".to_string())
    }

    fn set_bio(&mut self, args: &str) -> Result<String> {
        if let Some(setup) = self.setup.take() {
            self.setup = Some(setup.bio(args));
            return Ok("Bio saved.".to_string());
        }
        match self.session.profile_state()? {
            ProfileState::Created(profile) => {
                self.session.update_profile(&Profile {
                    bio: args.to_string(),
                    ..profile
                })?;
                Ok("Bio updated.".to_string())
            }
            ProfileState::Absent => bail!("Start with 'setup' first"),
        }
    }

    fn finish_setup(&mut self, args: &str) -> Result<String> {
        let setup = self.setup.take().context("Start with 'setup' first")?;
        let pending = setup.clone();
        match setup.interests(args.split(',')).finish() {
            Ok(profile) => {
                self.session.create_profile(&profile)?;
                Ok(format!("Profile created!\n{}", format_profile(&profile)))
            }
            Err(e) => {
                self.setup = Some(pending);
                Err(e)
            }
        }
    }

    fn require_profile(&self) -> Result<()> {
        match self.session.profile_state()? {
            ProfileState::Created(_) => Ok(()),
            ProfileState::Absent => bail!("Create your profile first with 'setup'"),
        }
    }

    fn discover(&mut self, args: &str) -> Result<String> {
        self.require_profile()?;
        let count: usize = if args.is_empty() {
            5
        } else {
            args.parse().context("expected a number")?
        };
        let count = count.min(MAX_DISCOVER);
        self.candidates = self.session.discover(count)?;
        if self.candidates.is_empty() {
            return Ok("Nobody new matches your preferences right now.".to_string());
        }
        let mut out = String::new();
        for (i, p) in self.candidates.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {}, {} ({}): {}",
                i + 1,
                p.name,
                p.age,
                p.location,
                preview(&p.bio, 80)
            );
        }
        Ok(out.trim_end().to_string())
    }

    fn like(&mut self, args: &str) -> Result<String> {
        self.require_profile()?;
        let index = parse_index(args, self.candidates.len())?;
        let profile = self.candidates.remove(index);
        let conversation = self.session.like(profile)?;
        let opener = conversation
            .messages
            .first()
            .map(|m| m.text.clone())
            .unwrap_or_default();
        let name = conversation.match_name.clone();
        self.open = Some(conversation.id);
        Ok(format!("It's a match with {}! 💘\n{}: {}", name, name, opener))
    }

    fn list_matches(&self) -> Result<String> {
        let matches = self.session.matches()?;
        if matches.is_empty() {
            return Ok("No matches yet.".to_string());
        }
        let mut out = String::new();
        for (i, m) in matches.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {}, {} (matched {})",
                i + 1,
                m.profile.name,
                m.profile.age,
                m.matched_at.format("%Y-%m-%d %H:%M")
            );
        }
        Ok(out.trim_end().to_string())
    }

    fn list_chats(&self) -> Result<String> {
        let conversations = self.session.conversations()?;
        if conversations.is_empty() {
            return Ok("No conversations yet.".to_string());
        }
        let mut out = String::new();
        for (i, c) in conversations.iter().enumerate() {
            let last = c.messages.last().map(|m| m.text.as_str()).unwrap_or("");
            let _ = writeln!(out, "{}. {}: {}", i + 1, c.match_name, preview(last, 60));
        }
        Ok(out.trim_end().to_string())
    }

    fn open_chat(&mut self, args: &str) -> Result<String> {
        let conversations = self.session.conversations()?;
        let conversation = &conversations[parse_index(args, conversations.len())?];
        self.open = Some(conversation.id.clone());

        let mut out = format!("Chatting with {}\n", conversation.match_name);
        for m in &conversation.messages {
            let who = match m.sender {
                Sender::User => "You",
                Sender::Match => conversation.match_name.as_str(),
            };
            let _ = writeln!(out, "{}: {}", who, m.text);
            if let Some(image) = &m.image {
                let _ = writeln!(out, "  {}", describe_image(image));
            }
        }
        Ok(out.trim_end().to_string())
    }

    fn delete_chat(&mut self, args: &str) -> Result<String> {
        let conversations = self.session.conversations()?;
        let id = conversations[parse_index(args, conversations.len())?].id.clone();
        self.session.delete_conversation(&id)?;
        if self.open.as_deref() == Some(id.as_str()) {
            self.open = None;
        }
        Ok("Conversation deleted.".to_string())
    }

    fn unmatch(&mut self, args: &str) -> Result<String> {
        let matches = self.session.matches()?;
        let matched = &matches[parse_index(args, matches.len())?];
        self.session.unmatch(&matched.id)?;
        self.open = None;
        Ok(format!("Unmatched {}.", matched.profile.name))
    }

    fn demo(&mut self, args: &str) -> Result<String> {
        match args {
            "on" => self.session.set_demo_forced(true),
            "off" => self.session.set_demo_forced(false),
            _ => bail!("usage: demo on|off"),
        }
        Ok(format!(
            "Demo mode {}.",
            if self.session.demo_forced() { "forced on" } else { "automatic" }
        ))
    }

    async fn models(&self, args: &str) -> Result<String> {
        let current = self.session.model_settings().await;
        if args.is_empty() {
            let status = self.session.status().await;
            return Ok(format!(
                "LLM: {} (available: {})\nImage: {} (available: {})",
                current.llm_model,
                list_or_none(&status.available_models.llm),
                current.stable_diffusion_model,
                list_or_none(&status.available_models.stable_diffusion),
            ));
        }
        let mut parts = args.split_whitespace();
        let settings = ModelSettings {
            llm_model: parts.next().map_or(current.llm_model, str::to_string),
            stable_diffusion_model: parts
                .next()
                .map_or(current.stable_diffusion_model, str::to_string),
        };
        self.session.select_models(settings.clone()).await?;
        Ok(format!(
            "Models set to {} / {}.",
            settings.llm_model, settings.stable_diffusion_model
        ))
    }

    async fn say(&self, text: &str) -> Result<String> {
        let id = self
            .open
            .as_deref()
            .context("No conversation open. Use 'chats' and 'open <n>', or 'help'.")?;
        let conversation = self.session.conversation(id)?.context("Conversation is gone")?;
        let reply = self.session.send_message(id, text).await?;

        let mut out = format!("{}: {}", conversation.match_name, reply.text);
        if let Some(image) = &reply.image {
            let _ = write!(out, "\n  {}", describe_image(image));
        }
        Ok(out)
    }
}

fn parse_gender(value: &str) -> Result<Gender> {
    match value.to_lowercase().as_str() {
        "woman" | "w" | "female" | "f" => Ok(Gender::Woman),
        "man" | "m" | "male" => Ok(Gender::Man),
        other => bail!("unknown gender '{}', use woman or man", other),
    }
}

/// 1-based index from the user into a 0-based one.
fn parse_index(args: &str, len: usize) -> Result<usize> {
    let n: usize = args.parse().context("expected a number")?;
    if n == 0 || n > len {
        bail!("pick a number between 1 and {}", len);
    }
    Ok(n - 1)
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn format_profile(p: &Profile) -> String {
    format!(
        "{}, {} ({})\n{}\nInterests: {}\nPhoto: {}",
        p.name,
        p.age,
        p.location,
        p.bio,
        p.interests.join(", "),
        p.image_url
    )
}

fn format_status(status: &ServiceStatus, demo: bool) -> String {
    let mut out = format!(
        "Text generation: {}\nImage generation: {}\nDemo mode: {}",
        if status.llm_available {
            format!("up ({})", status.llm_model)
        } else {
            "down".to_string()
        },
        if status.stable_diffusion_available { "up" } else { "down" },
        if demo { "on" } else { "off" },
    );
    if let Some(error) = &status.error {
        let _ = write!(out, "\n{}", error);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Responder;
    use crate::config::Config;
    use crate::services::testing::{FakeImage, FakeText};
    use crate::status::{SharedStatus, StatusProbe};
    use crate::storage::Storage;
    use std::time::Duration;
    use tokio::sync::RwLock;

    fn console(dir: &std::path::Path) -> Console {
        let config = Config::default();
        let text = FakeText::new(None);
        let image = FakeImage::new(false);
        let status: SharedStatus = Arc::new(RwLock::new(ServiceStatus::default()));
        let models = Arc::new(RwLock::new(ModelSettings::default()));
        let probe = Arc::new(StatusProbe::new(&config, text.clone(), image.clone()));
        let monitor = Arc::new(StatusMonitor::new(
            probe,
            status.clone(),
            models.clone(),
            Duration::from_secs(30),
        ));
        let session = DatingSession::new(
            &config,
            Storage::open(dir).unwrap(),
            Responder::new(text, image),
            status,
            models,
        );
        Console::new(session, monitor)
    }

    async fn run(console: &mut Console, line: &str) -> String {
        console.handle(line).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn setup_discover_like_and_chat_in_demo_mode() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = console(dir.path());

        assert!(console.handle("discover").await.is_err());
        run(&mut console, "setup Alex 29 woman Brooklyn, NY").await;
        assert!(console.handle("interests  ,  ").await.is_err());
        let created = run(&mut console, "interests Hiking, Coffee").await;
        assert!(created.starts_with("Profile created!\nAlex, 29 (Brooklyn, NY)"));

        let listed = run(&mut console, "discover 3").await;
        assert_eq!(listed.lines().count(), 3);
        let capped = run(&mut console, "discover 1000000000000000000").await;
        assert_eq!(capped.lines().count(), MAX_DISCOVER);
        let err = console.handle("discover lots").await.unwrap_err();
        assert_eq!(err.to_string(), "expected a number");
        run(&mut console, "discover 3").await;
        let matched = run(&mut console, "like 1").await;
        assert!(matched.starts_with("It's a match with"));

        let reply = run(&mut console, "hey there").await;
        assert!(!reply.is_empty());
        let chat = run(&mut console, "open 1").await;
        assert!(chat.contains("You: hey there"));

        assert_eq!(run(&mut console, "unmatch 1").await.lines().count(), 1);
        assert_eq!(run(&mut console, "chats").await, "No conversations yet.");
        run(&mut console, "reset").await;
        assert!(console.handle("discover").await.is_err());
        assert!(console.handle("quit").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn probe_reports_services_down() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = console(dir.path());
        let out = run(&mut console, "probe").await;
        assert!(out.contains("Text generation: down"));
        assert!(out.contains("Demo mode: on"));
        assert!(out.contains("are not available"));
    }

    #[test]
    fn indexes_are_one_based_and_bounded() {
        assert_eq!(parse_index("1", 3).unwrap(), 0);
        assert!(parse_index("0", 3).is_err());
        assert!(parse_index("4", 3).is_err());
        assert!(parse_index("x", 3).is_err());
    }
}
