//! Conversation and message repositories
//!
//! The in-memory implementations back the demo. Ids start at 1 and are handed
//! out monotonically.

use std::collections::HashMap;
use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicU64, Ordering},
};

use bytes::Bytes;
use chatpane_types::{Conversation, ConversationId, Message, MessageId};
use chrono::Utc;

pub trait ConversationRepository: Send + Sync {
    fn create(&self, name: &str, participants: Vec<String>) -> Conversation;
    fn find_by_id(&self, id: ConversationId) -> Option<Conversation>;
    /// All conversations in creation order
    fn find_all(&self) -> Vec<Conversation>;
    fn find_by_participant(&self, user_name: &str) -> Vec<Conversation>;
    fn add_participant(&self, id: ConversationId, user_name: &str) -> bool;
}

/// Fields of a message before the repository assigns id and timestamp
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub sender_name: String,
    pub text: Option<String>,
    pub image_data: Option<Bytes>,
}

pub trait MessageRepository: Send + Sync {
    /// Prepare an empty log for a freshly created conversation
    fn init_conversation(&self, _id: ConversationId) {}
    fn create(&self, message: NewMessage) -> Message;
    /// Messages of a conversation in append order
    fn find_by_conversation_id(&self, id: ConversationId) -> Vec<Message>;

    fn count(&self, id: ConversationId) -> usize {
        self.find_by_conversation_id(id).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

pub struct InMemoryConversationRepository {
    conversations: Mutex<Vec<Conversation>>,
    next_id: AtomicU64,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self {
            conversations: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryConversationRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationRepository for InMemoryConversationRepository {
    fn create(&self, name: &str, participants: Vec<String>) -> Conversation {
        let id = ConversationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let conversation = Conversation::new(id, name, participants);
        lock(&self.conversations).push(conversation.clone());
        conversation
    }

    fn find_by_id(&self, id: ConversationId) -> Option<Conversation> {
        lock(&self.conversations)
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    fn find_all(&self) -> Vec<Conversation> {
        lock(&self.conversations).clone()
    }

    fn find_by_participant(&self, user_name: &str) -> Vec<Conversation> {
        lock(&self.conversations)
            .iter()
            .filter(|c| c.has_participant(user_name))
            .cloned()
            .collect()
    }

    fn add_participant(&self, id: ConversationId, user_name: &str) -> bool {
        match lock(&self.conversations).iter_mut().find(|c| c.id == id) {
            Some(conversation) => {
                conversation.add_participant(user_name);
                true
            }
            None => false,
        }
    }
}

pub struct InMemoryMessageRepository {
    messages: Mutex<HashMap<ConversationId, Vec<Message>>>,
    next_id: AtomicU64,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryMessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageRepository for InMemoryMessageRepository {
    fn init_conversation(&self, id: ConversationId) {
        lock(&self.messages).entry(id).or_default();
    }

    fn create(&self, message: NewMessage) -> Message {
        let mut messages = lock(&self.messages);
        let message = Message {
            id: MessageId(self.next_id.fetch_add(1, Ordering::Relaxed)),
            conversation_id: message.conversation_id,
            sender_name: message.sender_name,
            text: message.text,
            image_data: message.image_data,
            timestamp: Utc::now(),
        };
        messages
            .entry(message.conversation_id)
            .or_default()
            .push(message.clone());
        message
    }

    fn find_by_conversation_id(&self, id: ConversationId) -> Vec<Message> {
        lock(&self.messages).get(&id).cloned().unwrap_or_default()
    }

    fn count(&self, id: ConversationId) -> usize {
        lock(&self.messages).get(&id).map_or(0, Vec::len)
    }
}
