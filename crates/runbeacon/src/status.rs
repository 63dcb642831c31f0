use std::fmt;

/// Outcome of the job that triggered the notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Success,
    Failure,
    Cancelled,
    /// Any status the notifier has no dedicated wording for.
    Unknown(String),
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "success" => Self::Success,
            "failure" => Self::Failure,
            "cancelled" => Self::Cancelled,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Self::Success => "Action is successful.".to_string(),
            Self::Failure => "Action has failed.".to_string(),
            Self::Cancelled => "Action is cancelled.".to_string(),
            Self::Unknown(raw) => format!("Action is {raw}."),
        }
    }

    /// Embed colour as a decimal RGB value; unknown statuses get none.
    pub const fn color(&self) -> Option<u32> {
        match self {
            Self::Success => Some(5_162_540),  // green
            Self::Failure => Some(16_711_680), // red
            Self::Cancelled => Some(8_421_504), // grey
            Self::Unknown(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
