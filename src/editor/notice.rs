use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::PipeforgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// set for error notices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<PipeforgeError>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            error: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
            error: None,
        }
    }

    pub fn error(error: &PipeforgeError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: error.user_message(),
            error: Some(error.clone()),
        }
    }
}

/// Fans notices out to every subscriber.
///
/// Notices are fire and forget. A slow subscriber loses the oldest ones once
/// `capacity` are pending.
pub struct NoticeChannel {
    sender: broadcast::Sender<Notice>,
}

impl NoticeChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns whether at least one subscriber received `notice`.
    pub fn publish(
        &self,
        notice: Notice,
    ) -> bool {
        self.sender.send(notice).is_ok()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }
}
