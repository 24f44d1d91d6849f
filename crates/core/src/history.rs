use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Messages shown on the page
pub const DEFAULT_MAX_MESSAGES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// In-memory transcript of one session.
///
/// Only the last `max_messages` entries are visible. Storage is trimmed to
/// twice that after every assistant reply.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    messages: Vec<Message>,
    max_messages: usize,
}

impl ChatHistory {
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_messages: max_messages.max(1),
        }
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::new(Role::User, content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::new(Role::Assistant, content));
        self.trim();
    }

    fn trim(&mut self) {
        let cap = self.max_messages * 2;
        if self.messages.len() > cap {
            let excess = self.messages.len() - cap;
            self.messages.drain(..excess);
        }
    }

    /// The tail of the transcript that gets displayed
    pub fn visible(&self) -> &[Message] {
        let start = self.messages.len().saturating_sub(self.max_messages);
        &self.messages[start..]
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}
