use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a conversation, assigned by the store starting at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub u64);

/// Identifier of a message, unique per store and monotonically increasing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ConversationId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u64> for MessageId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A named, participant-tagged container for an ordered message log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub name: String,
    /// Insertion-ordered, duplicate free
    pub participants: Vec<String>,
}

impl Conversation {
    pub fn new(id: ConversationId, name: impl Into<String>, participants: Vec<String>) -> Self {
        let mut conversation = Self {
            id,
            name: name.into(),
            participants: Vec::with_capacity(participants.len()),
        };
        for participant in participants {
            conversation.add_participant(participant);
        }
        conversation
    }

    /// Add a participant, returning false if they were already present
    pub fn add_participant(&mut self, user_name: impl Into<String>) -> bool {
        let user_name = user_name.into();
        if self.has_participant(&user_name) {
            return false;
        }
        self.participants.push(user_name);
        true
    }

    pub fn has_participant(&self, user_name: &str) -> bool {
        self.participants.iter().any(|p| p == user_name)
    }

    /// Label used by conversation selectors, e.g. `General Chat (#1)`
    pub fn display_label(&self) -> String {
        format!("{} (#{})", self.name, self.id)
    }
}

impl fmt::Display for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ID: {})", self.name, self.id)
    }
}

/// An immutable chat message with optional text and image content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_name: String,
    pub text: Option<String>,
    pub image_data: Option<Bytes>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn has_image(&self) -> bool {
        self.image_data.is_some()
    }

    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|text| !text.is_empty())
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Message {}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.sender_name,
            self.text.as_deref().unwrap_or_default()
        )?;
        if self.has_image() {
            write!(f, " [IMAGE]")?;
        }
        Ok(())
    }
}
