use crate::model::{Conversation, ConversationId, Message};

/// Events broadcast through the event hub
#[derive(Clone, Debug)]
pub enum ChatEvent {
    /// A message was appended to a conversation log
    MessageCreated(Message),
    /// A new conversation was created
    ConversationCreated(Conversation),
    /// The shared conversation selection changed
    SelectionChanged {
        conversation_id: Option<ConversationId>,
    },
}

impl ChatEvent {
    /// Conversation this event belongs to, if any
    pub fn conversation_id(&self) -> Option<ConversationId> {
        match self {
            ChatEvent::MessageCreated(message) => Some(message.conversation_id),
            ChatEvent::ConversationCreated(conversation) => Some(conversation.id),
            ChatEvent::SelectionChanged { conversation_id } => *conversation_id,
        }
    }
}
