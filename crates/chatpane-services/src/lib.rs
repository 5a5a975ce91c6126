pub mod chat_service;
pub mod conversation_store;
pub mod repository;

pub use chat_service::ChatService;
pub use conversation_store::{ConversationStore, MessageListener};
pub use repository::{
    ConversationRepository, InMemoryConversationRepository, InMemoryMessageRepository,
    MessageRepository, NewMessage,
};

// Re-export model types for convenience
pub use chatpane_types::{ChatError, Conversation, ConversationId, Message, MessageId};
