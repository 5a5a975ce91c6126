pub mod core;
pub mod dispatcher;
pub mod hub;

pub use core::{
    EventBus, EventBusContainer, EventBusStats, HandlerResult, Subscription, SubscriptionId,
};
pub use dispatcher::UiContext;
pub use hub::EventHub;

// Re-export types for convenience
pub use chatpane_types::{ChatEvent, Conversation, ConversationId, Message};
