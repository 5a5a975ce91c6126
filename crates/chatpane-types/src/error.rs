use thiserror::Error;

use crate::model::ConversationId;

/// Why a byte sequence could not be turned into an image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("image data is empty")]
    Empty,
    #[error("unsupported image format: {0}")]
    Unsupported(String),
    #[error("corrupt image data: {0}")]
    Corrupt(String),
}

/// Errors surfaced by panels, the coordinator and the conversation store.
///
/// Every variant is non-fatal: callers report it to the user and carry on.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("failed to load image: {0}")]
    ImageDecode(#[from] DecodeError),

    #[error("please enter a message or attach an image")]
    EmptySend,

    #[error("please select a conversation first")]
    NoConversationSelected,

    #[error("please enter your name")]
    MissingSenderName,

    #[error("conversation {0} does not exist")]
    UnknownConversation(ConversationId),

    #[error("failed to read attachment: {0}")]
    Io(#[from] std::io::Error),
}

impl ChatError {
    /// Short title used when the error is shown as a notice
    pub fn title(&self) -> &'static str {
        match self {
            ChatError::ImageDecode(_) | ChatError::Io(_) => "Error",
            ChatError::EmptySend => "Empty Message",
            ChatError::NoConversationSelected => "No Conversation",
            ChatError::MissingSenderName => "No Name",
            ChatError::UnknownConversation(_) => "Unknown Conversation",
        }
    }
}
