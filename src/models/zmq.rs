use serde::{Deserialize, Serialize};

/// Payload published to the emailer service for every outbound notification.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ZmqEmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Name of the registry template the message was rendered from.
    pub template: String,
}
