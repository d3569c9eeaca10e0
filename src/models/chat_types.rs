use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Per-session chat state. Owned by exactly one chatbot.
#[derive(Debug, Default, Clone)]
pub struct ConversationContext {
    pub current_breed: Option<String>,
    pub current_image: Option<PathBuf>,
    pub history: Vec<Turn>,
}

impl ConversationContext {
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(Turn {
            role,
            content: content.into(),
        });
    }
}
