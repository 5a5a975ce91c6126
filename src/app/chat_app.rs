use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chatpane_event_bus::{EventHub, Subscription, UiContext};
use chatpane_services::{ChatService, ConversationStore};
use chatpane_types::{ChatError, Config, Conversation, ConversationId, Message};

use super::sample_data::seed_sample_data;
use super::selection::ConversationSelectionCoordinator;
use crate::panels::{HistoryPanel, SenderPanel};
use crate::rendering::MessageRenderer;

/// Which of the two sender panels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Two sender panels and a shared history panel bound to one store.
///
/// Cheap to share: all panel state sits behind its own lock, so an
/// `Arc<ChatApp>` can be captured by UI tasks.
pub struct ChatApp {
    config: Config,
    store: Arc<ChatService>,
    left: Arc<Mutex<SenderPanel>>,
    right: Arc<Mutex<SenderPanel>>,
    history: Arc<Mutex<HistoryPanel>>,
    coordinator: ConversationSelectionCoordinator,
    _history_subscription: Subscription,
}

impl ChatApp {
    /// Build the application on the calling thread, which becomes the UI thread
    pub fn new(config: Config) -> Result<Self, ChatError> {
        Self::with_event_hub(config, EventHub::new())
    }

    pub fn with_event_hub(config: Config, event_hub: EventHub) -> Result<Self, ChatError> {
        let store = Arc::new(
            ChatService::new(event_hub).with_max_message_length(config.max_message_length),
        );
        let shared: Arc<dyn ConversationStore> = store.clone();

        let left = Arc::new(Mutex::new(SenderPanel::new(
            "Left Panel",
            config.left_user.clone(),
            shared.clone(),
            config.preview,
        )));
        let right = Arc::new(Mutex::new(SenderPanel::new(
            "Right Panel",
            config.right_user.clone(),
            shared.clone(),
            config.preview,
        )));
        let history = Arc::new(Mutex::new(HistoryPanel::new(
            shared.clone(),
            MessageRenderer::from_config(&config),
        )));
        let history_subscription = HistoryPanel::subscribe(&history, store.event_hub());

        let coordinator = ConversationSelectionCoordinator::new(shared);
        coordinator.register(left.clone());
        coordinator.register(right.clone());
        coordinator.register(history.clone());

        let app = Self {
            config,
            store,
            left,
            right,
            history,
            coordinator,
            _history_subscription: history_subscription,
        };

        if app.config.seed_sample_data {
            seed_sample_data(app.store.as_ref())?;
            app.select_first()?;
        }

        log::info!(
            "Chat application ready with {} conversations",
            app.store.all_conversations().len()
        );
        Ok(app)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<ChatService> {
        &self.store
    }

    pub fn event_hub(&self) -> &EventHub {
        self.store.event_hub()
    }

    pub fn ui_context(&self) -> &UiContext {
        self.event_hub().ui_context()
    }

    pub fn sender(&self, side: Side) -> &Arc<Mutex<SenderPanel>> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn history(&self) -> &Arc<Mutex<HistoryPanel>> {
        &self.history
    }

    pub fn coordinator(&self) -> &ConversationSelectionCoordinator {
        &self.coordinator
    }

    pub fn current_conversation(&self) -> Option<ConversationId> {
        self.coordinator.current()
    }

    /// Selector labels in creation order, e.g. `General Chat (#1)`
    pub fn conversation_labels(&self) -> Vec<String> {
        self.store
            .all_conversations()
            .iter()
            .map(Conversation::display_label)
            .collect()
    }

    pub fn select(&self, conversation_id: Option<ConversationId>) -> Result<(), ChatError> {
        self.coordinator.select(conversation_id)
    }

    /// Select the oldest conversation, if any
    pub fn select_first(&self) -> Result<(), ChatError> {
        match self.store.all_conversations().first() {
            Some(first) => self.select(Some(first.id)),
            None => Ok(()),
        }
    }

    /// Re-read the conversation list and keep the current selection
    pub fn refresh_conversations(&self) -> Result<Vec<String>, ChatError> {
        self.coordinator.refresh_selection()?;
        Ok(self.conversation_labels())
    }

    /// Create a conversation and select it
    pub fn create_conversation(
        &self,
        name: &str,
        participants: Vec<String>,
    ) -> Result<Conversation, ChatError> {
        let conversation = self.store.create_conversation(name, participants);
        self.select(Some(conversation.id))?;
        Ok(conversation)
    }

    /// Send `text` plus any staged image from one sender panel
    pub fn send(&self, side: Side, text: &str) -> Result<Message, ChatError> {
        let mut panel = lock(self.sender(side));
        panel.set_input(text);
        panel.send()
    }

    /// Stage an image file on one sender panel, returning its label
    pub fn attach_file(&self, side: Side, path: &Path) -> Result<String, ChatError> {
        let mut panel = lock(self.sender(side));
        let staged = panel.attach_file(path)?;
        Ok(format!(
            "{} ({}x{} preview)",
            staged.label, staged.preview.width, staged.preview.height
        ))
    }

    pub fn detach(&self, side: Side) {
        lock(self.sender(side)).clear_attachment();
    }

    pub fn set_user_name(&self, side: Side, user_name: &str) {
        lock(self.sender(side)).set_user_name(user_name);
    }

    pub fn history_text(&self) -> String {
        lock(&self.history).to_plain_text()
    }
}

pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
