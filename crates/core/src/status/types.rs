use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of one batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Queued,
    Processing,
    Done,
    Error,
}

impl ItemStatus {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    /// Returns true if moving to `next` is a legal transition.
    pub fn can_transition_to(&self, next: ItemStatus) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Processing)
                | (Self::Processing, Self::Done)
                | (Self::Processing, Self::Error)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

/// Payload delivered on a domain's status channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Position of the item in the submitted batch.
    pub index: usize,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusEvent {
    pub fn processing(index: usize) -> Self {
        Self {
            index,
            status: ItemStatus::Processing,
            message: None,
        }
    }

    pub fn done(index: usize) -> Self {
        Self {
            index,
            status: ItemStatus::Done,
            message: None,
        }
    }

    pub fn error(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            status: ItemStatus::Error,
            message: Some(message.into()),
        }
    }
}

/// A status event plus the channel it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEnvelope {
    /// e.g. `archive:status`.
    pub channel: String,
    pub timestamp: DateTime<Utc>,
    pub event: StatusEvent,
}
