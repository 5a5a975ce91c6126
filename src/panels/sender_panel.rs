use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chatpane_services::ConversationStore;
use chatpane_types::{ChatError, ConversationId, ImageBounds, Message};

use super::ConversationView;
use super::attachment::{AttachmentStaging, StagedAttachment};

/// Compose area of one participant: user name, text input and staged image
pub struct SenderPanel {
    title: String,
    user_name: String,
    input: String,
    staging: AttachmentStaging,
    selection: Option<ConversationId>,
    store: Arc<dyn ConversationStore>,
}

impl SenderPanel {
    pub fn new(
        title: impl Into<String>,
        user_name: impl Into<String>,
        store: Arc<dyn ConversationStore>,
        preview: ImageBounds,
    ) -> Self {
        Self {
            title: title.into(),
            user_name: user_name.into(),
            input: String::new(),
            staging: AttachmentStaging::new(preview),
            selection: None,
            store,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn set_user_name(&mut self, user_name: impl Into<String>) {
        self.user_name = user_name.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn staging(&self) -> &AttachmentStaging {
        &self.staging
    }

    pub fn attach_bytes(
        &mut self,
        bytes: Bytes,
        label: impl Into<String>,
    ) -> Result<&StagedAttachment, ChatError> {
        self.staging.attach(bytes, label)
    }

    /// Read an image file and stage it
    pub fn attach_file(&mut self, path: &Path) -> Result<&StagedAttachment, ChatError> {
        let bytes = std::fs::read(path)?;
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.staging.attach(Bytes::from(bytes), label)
    }

    pub fn clear_attachment(&mut self) {
        self.staging.clear();
    }

    /// Send the current input and staged image to the selected conversation.
    ///
    /// On success the input and the staging area are cleared. A rejected send
    /// leaves both untouched.
    pub fn send(&mut self) -> Result<Message, ChatError> {
        let conversation_id = self.selection.ok_or(ChatError::NoConversationSelected)?;

        let user_name = self.user_name.trim();
        if user_name.is_empty() {
            return Err(ChatError::MissingSenderName);
        }

        let text = self.input.trim();
        let image_data = self.staging.staged_bytes();
        if text.is_empty() && image_data.is_none() {
            log::warn!("[{}] Rejected empty message", self.title);
            return Err(ChatError::EmptySend);
        }

        let text = (!text.is_empty()).then(|| text.to_string());
        let message = self
            .store
            .send_message(conversation_id, user_name, text, image_data)?;

        log::info!(
            "[{}] {} sent message #{} to conversation {}",
            self.title,
            message.sender_name,
            message.id,
            conversation_id
        );
        self.input.clear();
        self.staging.clear();
        Ok(message)
    }
}

impl ConversationView for SenderPanel {
    fn set_conversation(&mut self, conversation_id: Option<ConversationId>) {
        self.selection = conversation_id;
    }

    fn conversation(&self) -> Option<ConversationId> {
        self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatpane_event_bus::EventHub;
    use chatpane_services::ChatService;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png() -> Bytes {
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(8, 8))
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        Bytes::from(bytes.into_inner())
    }

    fn panel() -> (SenderPanel, Arc<ChatService>, ConversationId) {
        let store = Arc::new(ChatService::new(EventHub::new()));
        let conversation = store.create_conversation("General Chat", vec!["Alice".into()]);
        let mut panel = SenderPanel::new("Left", "Alice", store.clone(), ImageBounds::preview());
        panel.set_conversation(Some(conversation.id));
        (panel, store, conversation.id)
    }

    #[test]
    fn test_send_clears_input_and_attachment() {
        let (mut panel, store, id) = panel();
        panel.set_input("  hello  ");
        panel.attach_bytes(png(), "dot.png").unwrap();

        let message = panel.send().unwrap();
        assert_eq!(message.text.as_deref(), Some("hello"));
        assert!(message.has_image());
        assert_eq!(panel.input(), "");
        assert!(!panel.staging().is_staged());
        assert_eq!(store.message_count(id), 1);
    }

    #[test]
    fn test_image_only_send() {
        let (mut panel, _store, _) = panel();
        panel.attach_bytes(png(), "dot.png").unwrap();

        let message = panel.send().unwrap();
        assert!(message.text.is_none());
        assert!(message.has_image());
    }

    #[test]
    fn test_empty_send_is_rejected_and_keeps_state() {
        let (mut panel, store, id) = panel();
        panel.set_input("   ");

        assert!(matches!(panel.send(), Err(ChatError::EmptySend)));
        assert_eq!(panel.input(), "   ");
        assert_eq!(store.message_count(id), 0);
    }

    #[test]
    fn test_send_without_selection() {
        let (mut panel, store, id) = panel();
        panel.set_conversation(None);
        panel.set_input("hello");
        panel.attach_bytes(png(), "dot.png").unwrap();

        assert!(matches!(panel.send(), Err(ChatError::NoConversationSelected)));
        assert_eq!(panel.input(), "hello");
        assert!(panel.staging().is_staged());
        assert_eq!(store.message_count(id), 0);
    }

    #[test]
    fn test_blank_user_name_is_rejected() {
        let (mut panel, _store, _) = panel();
        panel.set_user_name(" ");
        panel.set_input("hello");

        assert!(matches!(panel.send(), Err(ChatError::MissingSenderName)));
    }

    #[test]
    fn test_attach_missing_file() {
        let (mut panel, _store, _) = panel();
        let missing = std::env::temp_dir().join("chatpane-missing-attachment.png");

        assert!(matches!(panel.attach_file(&missing), Err(ChatError::Io(_))));
        assert!(!panel.staging().is_staged());
    }
}
