use crate::core::{EventBusContainer, EventBusStats, HandlerResult, Subscription, SubscriptionId};
use crate::dispatcher::UiContext;
use chatpane_types::{ChatEvent, Conversation, ConversationId, Message};

/// Application-wide notification channel.
///
/// Every delivery is marshalled onto the hub's [`UiContext`]: `enqueue` may be
/// called from any thread, subscribers only ever run on the UI thread, one
/// event at a time, in enqueue order.
#[derive(Clone)]
pub struct EventHub {
    bus: EventBusContainer<ChatEvent>,
    ui: UiContext,
}

impl EventHub {
    /// Create a hub whose UI context is owned by the calling thread
    pub fn new() -> Self {
        Self::with_ui_context(UiContext::for_current_thread())
    }

    pub fn with_ui_context(ui: UiContext) -> Self {
        Self {
            bus: EventBusContainer::new(),
            ui,
        }
    }

    pub fn ui_context(&self) -> &UiContext {
        &self.ui
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChatEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.bus.subscribe(callback)
    }

    pub fn subscribe_with_filter<F, P>(&self, callback: F, filter: P) -> SubscriptionId
    where
        F: Fn(&ChatEvent) -> HandlerResult + Send + Sync + 'static,
        P: Fn(&ChatEvent) -> bool + Send + Sync + 'static,
    {
        self.bus.subscribe_with_filter(callback, filter)
    }

    pub fn subscribe_once<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnOnce(&ChatEvent) + Send + 'static,
    {
        self.bus.subscribe_once(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Guard that unsubscribes `id` when dropped
    pub fn guard(&self, id: SubscriptionId) -> Subscription {
        self.bus.guard(id)
    }

    /// Queue an event for delivery on the UI context without running it
    pub fn enqueue(&self, event: ChatEvent) {
        let bus = self.bus.clone();
        self.ui.invoke_later(move || bus.publish(event));
    }

    /// Deliver queued events if called on the UI thread. Returns the number of tasks run.
    pub fn flush(&self) -> usize {
        self.ui.flush()
    }

    /// Enqueue and, when already on the UI thread, deliver immediately
    pub fn publish(&self, event: ChatEvent) {
        self.enqueue(event);
        self.flush();
    }

    pub fn stats(&self) -> EventBusStats {
        self.bus.stats()
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    pub fn clear(&self) {
        self.bus.clear();
    }

    pub fn subscribe_messages<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Message) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe_with_filter(
            move |event| match event {
                ChatEvent::MessageCreated(message) => callback(message),
                _ => Ok(()),
            },
            |event| matches!(event, ChatEvent::MessageCreated(_)),
        )
    }

    pub fn subscribe_messages_for_conversation<F>(
        &self,
        conversation_id: ConversationId,
        callback: F,
    ) -> SubscriptionId
    where
        F: Fn(&Message) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe_with_filter(
            move |event| match event {
                ChatEvent::MessageCreated(message) => callback(message),
                _ => Ok(()),
            },
            move |event| {
                matches!(
                    event,
                    ChatEvent::MessageCreated(message) if message.conversation_id == conversation_id
                )
            },
        )
    }

    pub fn subscribe_conversations<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Conversation) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe_with_filter(
            move |event| match event {
                ChatEvent::ConversationCreated(conversation) => callback(conversation),
                _ => Ok(()),
            },
            |event| matches!(event, ChatEvent::ConversationCreated(_)),
        )
    }

    pub fn subscribe_selection_changes<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Option<ConversationId>) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe_with_filter(
            move |event| match event {
                ChatEvent::SelectionChanged { conversation_id } => callback(*conversation_id),
                _ => Ok(()),
            },
            |event| matches!(event, ChatEvent::SelectionChanged { .. }),
        )
    }

    pub fn enqueue_message(&self, message: Message) {
        self.enqueue(ChatEvent::MessageCreated(message));
    }

    pub fn publish_message(&self, message: Message) {
        self.publish(ChatEvent::MessageCreated(message));
    }

    pub fn publish_conversation_created(&self, conversation: Conversation) {
        self.publish(ChatEvent::ConversationCreated(conversation));
    }

    pub fn publish_selection_changed(&self, conversation_id: Option<ConversationId>) {
        self.publish(ChatEvent::SelectionChanged { conversation_id });
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
