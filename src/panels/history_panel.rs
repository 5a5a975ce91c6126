use std::sync::{Arc, Mutex};

use chatpane_event_bus::{EventHub, Subscription};
use chatpane_services::ConversationStore;
use chatpane_types::{ConversationId, Message};

use super::ConversationView;
use crate::rendering::{MessageRenderer, RenderedBlock};

pub const NO_CONVERSATION_TITLE: &str = "No conversation selected";

/// Shared view of the selected conversation's message log
pub struct HistoryPanel {
    selection: Option<ConversationId>,
    title: String,
    blocks: Vec<RenderedBlock>,
    renderer: MessageRenderer,
    store: Arc<dyn ConversationStore>,
}

impl HistoryPanel {
    pub fn new(store: Arc<dyn ConversationStore>, renderer: MessageRenderer) -> Self {
        Self {
            selection: None,
            title: NO_CONVERSATION_TITLE.to_string(),
            blocks: Vec::new(),
            renderer,
            store,
        }
    }

    /// Append newly created messages of the selected conversation.
    ///
    /// Holds only a weak reference to the panel; the returned subscription
    /// stops delivery when dropped.
    pub fn subscribe(panel: &Arc<Mutex<Self>>, event_hub: &EventHub) -> Subscription {
        let weak_panel = Arc::downgrade(panel);
        let id = event_hub.subscribe_messages(move |message| {
            let Some(panel) = weak_panel.upgrade() else {
                log::trace!("History panel dropped, ignoring message #{}", message.id);
                return Ok(());
            };
            // Recover from a panic in an earlier render
            let mut panel = panel.lock().unwrap_or_else(|e| e.into_inner());
            panel.on_message(message);
            Ok(())
        });
        event_hub.guard(id)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn blocks(&self) -> &[RenderedBlock] {
        &self.blocks
    }

    /// Discard all blocks and render the selected conversation from scratch
    pub fn reload(&mut self) {
        self.blocks.clear();
        self.refresh_title();

        if let Some(conversation_id) = self.selection {
            let messages = self.store.messages(conversation_id);
            self.blocks = self.renderer.render_all(&messages);
            log::debug!(
                "History reloaded: {} messages in conversation {}",
                self.blocks.len(),
                conversation_id
            );
        }
    }

    /// Append `message` if it belongs to the selected conversation.
    /// Returns whether it was appended.
    ///
    /// Messages already covered by the last rebuild are skipped; ids grow
    /// monotonically within a store.
    pub fn on_message(&mut self, message: &Message) -> bool {
        if self.selection != Some(message.conversation_id) {
            return false;
        }
        if self
            .blocks
            .last()
            .is_some_and(|last| message.id <= last.message_id)
        {
            log::trace!("Message #{} already rendered", message.id);
            return false;
        }
        self.blocks.push(self.renderer.render(message));
        // The sender may have just joined the conversation
        self.refresh_title();
        true
    }

    /// Title followed by every block, as printed by the shell
    pub fn to_plain_text(&self) -> String {
        let mut out = format!("== {} ==", self.title);
        for block in &self.blocks {
            out.push('\n');
            out.push_str(&block.to_plain_text());
        }
        out
    }

    fn refresh_title(&mut self) {
        self.title = match self.selection.and_then(|id| self.store.conversation(id)) {
            Some(conversation) => format!(
                "{} - Participants: [{}]",
                conversation.name,
                conversation.participants.join(", ")
            ),
            None => NO_CONVERSATION_TITLE.to_string(),
        };
    }
}

impl ConversationView for HistoryPanel {
    fn set_conversation(&mut self, conversation_id: Option<ConversationId>) {
        self.selection = conversation_id;
        self.reload();
    }

    fn conversation(&self) -> Option<ConversationId> {
        self.selection
    }
}
