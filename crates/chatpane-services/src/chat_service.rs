//! Chat Service - conversation store backed by repositories
//!
//! This service owns conversations and message logs and publishes new
//! messages through the event hub once they are appended.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chatpane_event_bus::EventHub;
use chatpane_types::{ChatError, Conversation, ConversationId, DEFAULT_MAX_MESSAGE_LENGTH, Message};

use crate::conversation_store::ConversationStore;
use crate::repository::{
    ConversationRepository, InMemoryConversationRepository, InMemoryMessageRepository,
    MessageRepository, NewMessage,
};

/// Conversation store used by the demo
pub struct ChatService {
    event_hub: EventHub,
    conversations: Arc<dyn ConversationRepository>,
    messages: Arc<dyn MessageRepository>,
    max_message_length: usize,
    /// Serializes writers so the event queue order equals the log order
    write_lock: Mutex<()>,
}

impl ChatService {
    /// Create a service with in-memory repositories
    pub fn new(event_hub: EventHub) -> Self {
        Self::with_repositories(
            event_hub,
            Arc::new(InMemoryConversationRepository::new()),
            Arc::new(InMemoryMessageRepository::new()),
        )
    }

    pub fn with_repositories(
        event_hub: EventHub,
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            event_hub,
            conversations,
            messages,
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_max_message_length(mut self, max_message_length: usize) -> Self {
        self.max_message_length = max_message_length;
        self
    }

    pub fn message_count(&self, conversation_id: ConversationId) -> usize {
        self.messages.count(conversation_id)
    }

    fn truncate(&self, text: String) -> String {
        match text.char_indices().nth(self.max_message_length) {
            Some((cut, _)) => {
                log::debug!(
                    "Truncating message text to {} characters",
                    self.max_message_length
                );
                text[..cut].to_string()
            }
            None => text,
        }
    }
}

impl ConversationStore for ChatService {
    fn create_conversation(&self, name: &str, participants: Vec<String>) -> Conversation {
        let conversation = {
            let _writer = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
            let conversation = self.conversations.create(name, participants);
            self.messages.init_conversation(conversation.id);
            self.event_hub
                .enqueue(chatpane_types::ChatEvent::ConversationCreated(conversation.clone()));
            conversation
        };
        self.event_hub.flush();

        log::info!("Created conversation {}", conversation);
        conversation
    }

    fn all_conversations(&self) -> Vec<Conversation> {
        self.conversations.find_all()
    }

    fn conversation(&self, id: ConversationId) -> Option<Conversation> {
        self.conversations.find_by_id(id)
    }

    fn conversations_for_user(&self, user_name: &str) -> Vec<Conversation> {
        self.conversations.find_by_participant(user_name)
    }

    fn messages(&self, conversation_id: ConversationId) -> Vec<Message> {
        self.messages.find_by_conversation_id(conversation_id)
    }

    /// Append a message and notify listeners
    ///
    /// This method performs the following steps:
    /// 1. Verify the conversation exists
    /// 2. Truncate overly long text and register the sender as a participant
    /// 3. Append to the log and queue the notification, under the write lock
    /// 4. Deliver queued notifications if called on the UI thread
    fn send_message(
        &self,
        conversation_id: ConversationId,
        sender_name: &str,
        text: Option<String>,
        image_data: Option<Bytes>,
    ) -> Result<Message, ChatError> {
        let message = {
            let _writer = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

            let conversation = self
                .conversations
                .find_by_id(conversation_id)
                .ok_or(ChatError::UnknownConversation(conversation_id))?;

            if !conversation.has_participant(sender_name) {
                self.conversations
                    .add_participant(conversation_id, sender_name);
            }

            let message = self.messages.create(NewMessage {
                conversation_id,
                sender_name: sender_name.to_string(),
                text: text.map(|text| self.truncate(text)),
                image_data,
            });
            self.event_hub.enqueue_message(message.clone());
            message
        };

        let delivered = self.event_hub.flush();
        log::debug!(
            "Message #{} appended to conversation {} ({} notifications delivered inline)",
            message.id,
            conversation_id,
            delivered
        );
        Ok(message)
    }

    fn add_participant(&self, conversation_id: ConversationId, user_name: &str) -> bool {
        self.conversations.add_participant(conversation_id, user_name)
    }

    fn event_hub(&self) -> &EventHub {
        &self.event_hub
    }
}
