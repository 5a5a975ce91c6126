//! Panel state, independent of any widget toolkit

mod attachment;
mod history_panel;
mod sender_panel;

pub use attachment::{AttachmentStaging, StagedAttachment};
pub use history_panel::{HistoryPanel, NO_CONVERSATION_TITLE};
pub use sender_panel::SenderPanel;

use chatpane_types::ConversationId;

/// A panel that follows the application-wide conversation selection
pub trait ConversationView: Send {
    /// Point the view at `conversation_id`, or at nothing
    fn set_conversation(&mut self, conversation_id: Option<ConversationId>);

    fn conversation(&self) -> Option<ConversationId>;
}
