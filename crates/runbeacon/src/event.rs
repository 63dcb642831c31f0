//! Typed view over the workflow event document.
//!
//! Only the handful of fields used to build a notification are modelled;
//! everything else in the document is ignored.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Deserialize)]
pub struct EventPayload {
    pub repository: Repository,
    #[serde(default)]
    pub sender: Option<Sender>,
    #[serde(default)]
    pub commits: Option<Vec<Commit>>,
    #[serde(default)]
    pub compare: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub html_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sender {
    pub login: Option<String>,
    pub html_url: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Commit {
    #[serde(deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub url: String,
    pub author: Option<Person>,
    pub committer: Option<Person>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Person {
    pub username: Option<String>,
}

/// Reads an explicit `null` the same as a missing string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl EventPayload {
    pub fn commits(&self) -> &[Commit] {
        self.commits.as_deref().unwrap_or_default()
    }
}

impl Commit {
    /// First seven characters of the commit id.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(7) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    /// Author handle, falling back to the committer handle.
    pub fn contributor(&self) -> Option<&str> {
        self.author
            .as_ref()
            .and_then(|p| p.username.as_deref())
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.committer
                    .as_ref()
                    .and_then(|p| p.username.as_deref())
                    .filter(|s| !s.is_empty())
            })
    }
}
