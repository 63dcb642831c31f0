//! Builds the webhook message for a run.
//!
//! [`build_message`] is pure: it only reads the [`RunContext`] handed to it,
//! so every formatting rule here is covered by plain unit tests.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::context::RunContext;
use crate::event::EventPayload;

pub const DEFAULT_USERNAME: &str = "Deploy Notification";
pub const DEFAULT_AVATAR_URL: &str =
    "https://github.githubassets.com/images/modules/logos_page/GitHub-Mark.png";

/// Commits listed individually; the header still reports the full count.
pub const MAX_LISTED_COMMITS: usize = 5;

/// Body of a Discord-compatible webhook request. Always carries exactly one
/// embed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub username: String,
    pub avatar_url: String,
    embeds: [Embed; 1],
}

impl WebhookPayload {
    pub fn new(username: String, avatar_url: String, embed: Embed) -> Self {
        Self {
            username,
            avatar_url,
            embeds: [embed],
        }
    }

    pub fn embed(&self) -> &Embed {
        &self.embeds[0]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub author: EmbedAuthor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    pub title: String,
    pub url: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// A ready-to-send notification and where it goes.
#[derive(Clone)]
pub struct NotificationMessage {
    pub destination_url: String,
    pub payload: WebhookPayload,
}

impl NotificationMessage {
    fn embed(&self) -> &Embed {
        self.payload.embed()
    }

    pub fn title(&self) -> &str {
        &self.embed().title
    }

    pub fn color(&self) -> Option<u32> {
        self.embed().color
    }

    pub fn author(&self) -> &EmbedAuthor {
        &self.embed().author
    }

    pub fn link(&self) -> &str {
        &self.embed().url
    }

    pub fn body(&self) -> &str {
        &self.embed().description
    }
}

impl fmt::Debug for NotificationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationMessage")
            .field("destination_url", &"<redacted>")
            .field("payload", &self.payload)
            .finish()
    }
}

/// Parse `raw` as JSON, falling back to `T::default()` when it is absent or
/// does not parse. Parse failures are logged and otherwise swallowed.
pub fn parse_json_or_default<T>(raw: Option<&str>) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = raw else {
        return T::default();
    };
    serde_json::from_str(raw).unwrap_or_else(|err| {
        warn!(error = %err, "Could not parse ADDITIONAL_DESCRIPTION, ignoring it");
        T::default()
    })
}

pub fn build_message(ctx: &RunContext) -> NotificationMessage {
    let extra: Map<String, Value> = parse_json_or_default(ctx.additional_description.as_deref());

    let mut fields = Map::new();
    fields.insert(
        "Repository".into(),
        Value::String(format!("[{}]({})", ctx.repository, ctx.repository_url())),
    );
    fields.insert("Workflow".into(), Value::String(ctx.workflow.clone()));
    if let Some(ref_name) = &ctx.ref_name {
        fields.insert("Branch".into(), Value::String(ref_name.clone()));
    }
    // Existing keys keep their position and take the new value.
    for (key, value) in extra {
        fields.insert(key, value);
    }

    let author = match &ctx.event.sender {
        Some(sender) => EmbedAuthor {
            name: sender
                .login
                .clone()
                .filter(|login| !login.is_empty())
                .unwrap_or_else(|| ctx.actor.clone()),
            url: sender.html_url.clone(),
            icon_url: sender.avatar_url.clone(),
        },
        None => EmbedAuthor {
            name: ctx.actor.clone(),
            url: None,
            icon_url: None,
        },
    };

    let embed = Embed {
        author,
        color: ctx.job_status.color(),
        title: ctx.job_status.title(),
        url: format!(
            "{}/actions/runs/{}",
            ctx.repository_url().trim_end_matches('/'),
            ctx.run_id
        ),
        description: render_description(&fields, &ctx.event),
    };

    NotificationMessage {
        destination_url: ctx.webhook_url.clone(),
        payload: WebhookPayload::new(
            ctx.username.clone().unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            ctx.avatar_url
                .clone()
                .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()),
            embed,
        ),
    }
}

fn render_description(fields: &Map<String, Value>, event: &EventPayload) -> String {
    let mut out = String::new();
    for (key, value) in fields {
        out.push_str(&format!("**{key}**: {}\n\n", display_value(value)));
    }

    let commits = event.commits();
    if commits.is_empty() {
        return out;
    }

    let count = format!("{} new commits", commits.len());
    match &event.compare {
        Some(compare) => out.push_str(&format!("**Commit**: [{count}]({compare})\n")),
        None => out.push_str(&format!("**Commit**: {count}\n")),
    }
    for commit in commits.iter().take(MAX_LISTED_COMMITS) {
        out.push_str(&format!(
            "- [`{}`]({}) {}",
            commit.short_id(),
            commit.url,
            commit.message
        ));
        if let Some(who) = commit.contributor() {
            out.push_str(&format!(" - {who}"));
        }
        out.push('\n');
    }
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
