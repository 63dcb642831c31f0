//! Run context loaded from the workflow environment.
//!
//! Everything the notifier needs is read here exactly once, validated, and
//! frozen into a [`RunContext`]. Message building never touches the process
//! environment.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

use crate::event::EventPayload;
use crate::status::JobStatus;

pub const ENV_EVENT_PATH: &str = "GITHUB_EVENT_PATH";
pub const ENV_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const ENV_WORKFLOW: &str = "GITHUB_WORKFLOW";
pub const ENV_ACTOR: &str = "GITHUB_ACTOR";
pub const ENV_EVENT_NAME: &str = "GITHUB_EVENT_NAME";
pub const ENV_ACTION: &str = "GITHUB_ACTION";
pub const ENV_WEBHOOK: &str = "DISCORD_WEBHOOK";
pub const ENV_JOB_STATUS: &str = "GITHUB_JOB_STATUS";
pub const ENV_RUN_ID: &str = "GITHUB_RUN_ID";

pub const ENV_REF_NAME: &str = "GITHUB_REF_NAME";
pub const ENV_USERNAME: &str = "DISCORD_USERNAME";
pub const ENV_AVATAR: &str = "DISCORD_AVATAR";
pub const ENV_ADDITIONAL_DESCRIPTION: &str = "ADDITIONAL_DESCRIPTION";

pub const ENV_TOGGLE_DISCORD: &str = "INPUT_DISCORD";
pub const ENV_TOGGLE_LINE: &str = "INPUT_LINE";

/// Checked in this order; the first absent one is reported.
pub const REQUIRED_VARS: [&str; 9] = [
    ENV_EVENT_PATH,
    ENV_REPOSITORY,
    ENV_WORKFLOW,
    ENV_ACTOR,
    ENV_EVENT_NAME,
    ENV_ACTION,
    ENV_WEBHOOK,
    ENV_JOB_STATUS,
    ENV_RUN_ID,
];

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Env var {0} is not defined. Maybe try to set it if you are running the script manually.")]
    MissingVar(&'static str),

    #[error("Reading event document {}", .path.display())]
    ReadEvent {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parsing event document {}", .path.display())]
    ParseEvent {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Channel switches passed in as action inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggles {
    pub discord: bool,
    /// Read for compatibility only. No LINE channel exists.
    pub line: bool,
}

pub struct RunContext {
    pub job_status: JobStatus,
    pub workflow: String,
    pub repository: String,
    pub actor: String,
    pub event_name: String,
    pub action: String,
    pub run_id: String,
    pub ref_name: Option<String>,
    pub webhook_url: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub additional_description: Option<String>,
    pub event: EventPayload,
    /// The event document as read, kept for diagnostics.
    pub raw_event: serde_json::Value,
    pub toggles: Toggles,
}

impl RunContext {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ContextError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ContextError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        for key in REQUIRED_VARS {
            if get(key).is_none() {
                return Err(ContextError::MissingVar(key));
            }
        }
        let require = |key: &'static str| get(key).ok_or(ContextError::MissingVar(key));

        let event_path = PathBuf::from(require(ENV_EVENT_PATH)?);
        let (event, raw_event) = read_event(event_path)?;

        let toggles = Toggles {
            discord: parse_toggle(ENV_TOGGLE_DISCORD, get(ENV_TOGGLE_DISCORD), true),
            line: parse_toggle(ENV_TOGGLE_LINE, get(ENV_TOGGLE_LINE), false),
        };

        Ok(Self {
            job_status: JobStatus::parse(&require(ENV_JOB_STATUS)?),
            workflow: require(ENV_WORKFLOW)?,
            repository: require(ENV_REPOSITORY)?,
            actor: require(ENV_ACTOR)?,
            event_name: require(ENV_EVENT_NAME)?,
            action: require(ENV_ACTION)?,
            run_id: require(ENV_RUN_ID)?,
            ref_name: get(ENV_REF_NAME),
            webhook_url: require(ENV_WEBHOOK)?,
            username: get(ENV_USERNAME),
            avatar_url: get(ENV_AVATAR),
            additional_description: get(ENV_ADDITIONAL_DESCRIPTION),
            event,
            raw_event,
            toggles,
        })
    }

    /// Browse URL of the repository, taken from the event document.
    pub fn repository_url(&self) -> &str {
        &self.event.repository.html_url
    }
}

// The webhook URL embeds a secret token.
impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("job_status", &self.job_status)
            .field("workflow", &self.workflow)
            .field("repository", &self.repository)
            .field("actor", &self.actor)
            .field("event_name", &self.event_name)
            .field("action", &self.action)
            .field("run_id", &self.run_id)
            .field("ref_name", &self.ref_name)
            .field("webhook_url", &"<redacted>")
            .field("username", &self.username)
            .field("avatar_url", &self.avatar_url)
            .field("additional_description", &self.additional_description)
            .field("toggles", &self.toggles)
            .finish_non_exhaustive()
    }
}

fn read_event(path: PathBuf) -> Result<(EventPayload, serde_json::Value), ContextError> {
    let contents = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(source) => return Err(ContextError::ReadEvent { path, source }),
    };
    let parsed = serde_json::from_str::<serde_json::Value>(&contents).and_then(|raw| {
        let event: EventPayload = serde_json::from_value(raw.clone())?;
        Ok((event, raw))
    });
    match parsed {
        Ok(pair) => {
            debug!(path = %path.display(), "Loaded event document");
            Ok(pair)
        }
        Err(source) => Err(ContextError::ParseEvent { path, source }),
    }
}

fn parse_toggle(name: &str, value: Option<String>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        _ => {
            warn!(input = name, value = %value, default, "Unrecognised toggle value, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn event_file(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    fn base_env(event_path: &str) -> HashMap<String, String> {
        [
            (ENV_EVENT_PATH, event_path),
            (ENV_REPOSITORY, "org/repo"),
            (ENV_WORKFLOW, "CI"),
            (ENV_ACTOR, "octocat"),
            (ENV_EVENT_NAME, "push"),
            (ENV_ACTION, "notify"),
            (ENV_WEBHOOK, "https://hooks.example.com/abc"),
            (ENV_JOB_STATUS, "success"),
            (ENV_RUN_ID, "42"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn load(env: &HashMap<String, String>) -> Result<RunContext, ContextError> {
        RunContext::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn loads_required_and_optional_values() {
        let file = event_file(r#"{"repository":{"html_url":"https://example.com/org/repo"}}"#);
        let mut env = base_env(file.path().to_str().unwrap());
        env.insert(ENV_REF_NAME.into(), "main".into());
        env.insert(ENV_USERNAME.into(), "Bot".into());

        let ctx = load(&env).unwrap();
        assert_eq!(ctx.job_status, JobStatus::Success);
        assert_eq!(ctx.workflow, "CI");
        assert_eq!(ctx.run_id, "42");
        assert_eq!(ctx.ref_name.as_deref(), Some("main"));
        assert_eq!(ctx.username.as_deref(), Some("Bot"));
        assert_eq!(ctx.avatar_url, None);
        assert_eq!(ctx.additional_description, None);
        assert_eq!(ctx.repository_url(), "https://example.com/org/repo");
        assert_eq!(ctx.toggles, Toggles { discord: true, line: false });
    }

    #[test]
    fn each_missing_required_var_is_named() {
        let file = event_file(r#"{"repository":{"html_url":"u"}}"#);
        for key in REQUIRED_VARS {
            let mut env = base_env(file.path().to_str().unwrap());
            env.remove(key);
            assert_matches!(load(&env), Err(ContextError::MissingVar(k)) if k == key);
        }
    }

    #[test]
    fn empty_required_var_counts_as_missing() {
        let file = event_file(r#"{"repository":{"html_url":"u"}}"#);
        let mut env = base_env(file.path().to_str().unwrap());
        env.insert(ENV_RUN_ID.into(), String::new());
        let err = load(&env).unwrap_err();
        assert!(err.to_string().contains("GITHUB_RUN_ID"));
    }

    #[test]
    fn unreadable_event_file_errors() {
        let env = base_env("/nonexistent/event.json");
        assert_matches!(load(&env), Err(ContextError::ReadEvent { .. }));
    }

    #[test]
    fn event_without_repository_errors() {
        let file = event_file(r#"{"sender":{"login":"octocat"}}"#);
        let env = base_env(file.path().to_str().unwrap());
        assert_matches!(load(&env), Err(ContextError::ParseEvent { .. }));
    }

    #[test]
    fn toggles_parse_common_spellings() {
        let file = event_file(r#"{"repository":{"html_url":"u"}}"#);
        let mut env = base_env(file.path().to_str().unwrap());
        env.insert(ENV_TOGGLE_DISCORD.into(), "False".into());
        env.insert(ENV_TOGGLE_LINE.into(), "yes".into());
        let ctx = load(&env).unwrap();
        assert_eq!(ctx.toggles, Toggles { discord: false, line: true });

        env.insert(ENV_TOGGLE_DISCORD.into(), "maybe".into());
        let ctx = load(&env).unwrap();
        assert!(ctx.toggles.discord);
    }

    #[test]
    fn debug_output_hides_webhook() {
        let file = event_file(r#"{"repository":{"html_url":"u"}}"#);
        let env = base_env(file.path().to_str().unwrap());
        let ctx = load(&env).unwrap();
        let rendered = format!("{ctx:?}");
        assert!(!rendered.contains("hooks.example.com"));
        assert!(rendered.contains("<redacted>"));
    }
}
