//! Conversation selection coordination
//!
//! Every panel follows one application-wide selection. Selecting a
//! conversation updates all registered views before `select` returns and then
//! announces the change on the event hub.

use std::sync::{Arc, Mutex, MutexGuard};

use chatpane_services::ConversationStore;
use chatpane_types::{ChatError, ConversationId};

use crate::panels::ConversationView;

pub type SharedView = Arc<Mutex<dyn ConversationView>>;

struct SelectionState {
    current: Option<ConversationId>,
    views: Vec<SharedView>,
}

pub struct ConversationSelectionCoordinator {
    store: Arc<dyn ConversationStore>,
    state: Mutex<SelectionState>,
}

impl ConversationSelectionCoordinator {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self {
            store,
            state: Mutex::new(SelectionState {
                current: None,
                views: Vec::new(),
            }),
        }
    }

    /// Register a view; it is immediately pointed at the current selection
    pub fn register(&self, view: SharedView) {
        let current = {
            let mut state = self.lock();
            state.views.push(view.clone());
            state.current
        };
        lock_view(&view).set_conversation(current);
    }

    pub fn view_count(&self) -> usize {
        self.lock().views.len()
    }

    pub fn current(&self) -> Option<ConversationId> {
        self.lock().current
    }

    /// Point every view at `conversation_id`.
    ///
    /// An unknown id is rejected without touching any view.
    pub fn select(&self, conversation_id: Option<ConversationId>) -> Result<(), ChatError> {
        if let Some(id) = conversation_id {
            if self.store.conversation(id).is_none() {
                log::warn!("[Selection] Unknown conversation {}", id);
                return Err(ChatError::UnknownConversation(id));
            }
        }

        let views = {
            let mut state = self.lock();
            state.current = conversation_id;
            state.views.clone()
        };
        for view in &views {
            lock_view(view).set_conversation(conversation_id);
        }

        match conversation_id {
            Some(id) => log::info!("[Selection] Selected conversation {}", id),
            None => log::info!("[Selection] Selection cleared"),
        }
        self.store
            .event_hub()
            .publish_selection_changed(conversation_id);
        Ok(())
    }

    /// Re-apply the current selection, rebuilding every view
    pub fn refresh_selection(&self) -> Result<(), ChatError> {
        let current = self.current();
        self.select(current)
    }

    fn lock(&self) -> MutexGuard<'_, SelectionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn lock_view(view: &SharedView) -> MutexGuard<'_, dyn ConversationView + 'static> {
    view.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::{HistoryPanel, SenderPanel};
    use crate::rendering::MessageRenderer;
    use chatpane_event_bus::EventHub;
    use chatpane_services::ChatService;
    use chatpane_types::ImageBounds;

    struct Recorder(Vec<Option<ConversationId>>);

    impl ConversationView for Recorder {
        fn set_conversation(&mut self, conversation_id: Option<ConversationId>) {
            self.0.push(conversation_id);
        }

        fn conversation(&self) -> Option<ConversationId> {
            self.0.last().copied().flatten()
        }
    }

    fn store() -> Arc<ChatService> {
        Arc::new(ChatService::new(EventHub::new()))
    }

    #[test]
    fn test_select_updates_every_view_before_returning() {
        let store = store();
        let general = store.create_conversation("General Chat", Vec::new());
        let coordinator = ConversationSelectionCoordinator::new(store.clone());

        let left = Arc::new(Mutex::new(SenderPanel::new(
            "Left",
            "Alice",
            store.clone(),
            ImageBounds::preview(),
        )));
        let right = Arc::new(Mutex::new(SenderPanel::new(
            "Right",
            "Bob",
            store.clone(),
            ImageBounds::preview(),
        )));
        let history = Arc::new(Mutex::new(HistoryPanel::new(
            store.clone(),
            MessageRenderer::default(),
        )));
        coordinator.register(left.clone());
        coordinator.register(right.clone());
        coordinator.register(history.clone());

        coordinator.select(Some(general.id)).unwrap();

        assert_eq!(coordinator.current(), Some(general.id));
        assert_eq!(left.lock().unwrap().conversation(), Some(general.id));
        assert_eq!(right.lock().unwrap().conversation(), Some(general.id));
        assert_eq!(history.lock().unwrap().conversation(), Some(general.id));
    }

    #[test]
    fn test_unknown_id_touches_no_view() {
        let store = store();
        let coordinator = ConversationSelectionCoordinator::new(store.clone());
        let recorder = Arc::new(Mutex::new(Recorder(Vec::new())));
        coordinator.register(recorder.clone());

        let result = coordinator.select(Some(ConversationId(99)));
        assert!(matches!(
            result,
            Err(ChatError::UnknownConversation(ConversationId(99)))
        ));
        // Only the registration call
        assert_eq!(recorder.lock().unwrap().0, vec![None]);
        assert_eq!(coordinator.current(), None);
    }

    #[test]
    fn test_selection_change_is_published_after_views_update() {
        let store = store();
        let general = store.create_conversation("General Chat", Vec::new());
        let coordinator = Arc::new(ConversationSelectionCoordinator::new(store.clone()));
        let recorder = Arc::new(Mutex::new(Recorder(Vec::new())));
        coordinator.register(recorder.clone());

        let observed = Arc::new(Mutex::new(Vec::new()));
        let observed_clone = observed.clone();
        let recorder_clone = recorder.clone();
        let _subscription = store.event_hub().guard(store.event_hub().subscribe_selection_changes(
            move |conversation_id| {
                let view = recorder_clone.lock().unwrap().conversation();
                observed_clone.lock().unwrap().push((conversation_id, view));
                Ok(())
            },
        ));

        coordinator.select(Some(general.id)).unwrap();
        coordinator.select(None).unwrap();

        assert_eq!(
            *observed.lock().unwrap(),
            vec![(Some(general.id), Some(general.id)), (None, None)]
        );
    }

    #[test]
    fn test_refresh_selection_rebuilds_history() {
        let store = store();
        let general = store.create_conversation("General Chat", Vec::new());
        let coordinator = ConversationSelectionCoordinator::new(store.clone());
        let history = Arc::new(Mutex::new(HistoryPanel::new(
            store.clone(),
            MessageRenderer::default(),
        )));
        coordinator.register(history.clone());
        coordinator.select(Some(general.id)).unwrap();

        // Not subscribed, so only a rebuild picks the message up
        store
            .send_message(general.id, "Alice", Some("hello".into()), None)
            .unwrap();
        assert!(history.lock().unwrap().blocks().is_empty());

        coordinator.refresh_selection().unwrap();
        assert_eq!(history.lock().unwrap().blocks().len(), 1);
    }
}
