use bytes::Bytes;
use chatpane_event_bus::{EventHub, HandlerResult, Subscription, SubscriptionId};
use chatpane_types::{ChatError, Conversation, ConversationId, Message};

pub type MessageListener = Box<dyn Fn(&Message) -> HandlerResult + Send + Sync>;

/// Owner of conversations and their message logs.
///
/// `send_message` appends before it notifies: when a listener runs, the
/// message is already visible through `messages`. Listeners run on the event
/// hub's UI context, in append order.
pub trait ConversationStore: Send + Sync {
    fn create_conversation(&self, name: &str, participants: Vec<String>) -> Conversation;

    /// All conversations in creation order
    fn all_conversations(&self) -> Vec<Conversation>;

    fn conversation(&self, id: ConversationId) -> Option<Conversation>;

    fn conversations_for_user(&self, user_name: &str) -> Vec<Conversation>;

    /// Messages of a conversation in chronological order
    fn messages(&self, conversation_id: ConversationId) -> Vec<Message>;

    fn send_message(
        &self,
        conversation_id: ConversationId,
        sender_name: &str,
        text: Option<String>,
        image_data: Option<Bytes>,
    ) -> Result<Message, ChatError>;

    fn add_participant(&self, conversation_id: ConversationId, user_name: &str) -> bool;

    fn event_hub(&self) -> &EventHub;

    /// Register a listener for every new message. Dropping the returned
    /// subscription removes the listener.
    fn add_message_listener(&self, listener: MessageListener) -> Subscription {
        let hub = self.event_hub();
        hub.guard(hub.subscribe_messages(move |message| listener(message)))
    }

    fn remove_message_listener(&self, id: SubscriptionId) -> bool {
        self.event_hub().unsubscribe(id)
    }
}
