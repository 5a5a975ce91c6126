pub mod config;
pub mod config_manager;
pub mod error;
pub mod events;
pub mod model;

pub use config::{
    Config, DEFAULT_MAX_MESSAGE_LENGTH, DEFAULT_TEXT_WIDTH_PX, DEFAULT_WRAP_COLUMNS, ImageBounds,
};
pub use error::{ChatError, DecodeError};
pub use events::ChatEvent;
pub use model::{Conversation, ConversationId, Message, MessageId};
