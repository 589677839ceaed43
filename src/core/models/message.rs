use serde::{Deserialize, Serialize};

/// JSON envelope accepted by Slack-compatible incoming webhooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub color: String,
    pub username: String,
    pub icon_emoji: String,
}
