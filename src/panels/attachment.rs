use bytes::Bytes;
use chatpane_types::{ChatError, ImageBounds};

use crate::rendering::{ImageScaler, Thumbnail, decode_image};

/// An image waiting to be sent with the next message
#[derive(Debug, Clone)]
pub struct StagedAttachment {
    pub bytes: Bytes,
    pub preview: Thumbnail,
    /// File name or other label shown next to the preview
    pub label: String,
}

/// Per sender panel staging area: empty, or holding exactly one image
#[derive(Debug, Clone)]
pub struct AttachmentStaging {
    staged: Option<StagedAttachment>,
    scaler: ImageScaler,
}

impl AttachmentStaging {
    pub fn new(preview: ImageBounds) -> Self {
        Self {
            staged: None,
            scaler: ImageScaler::new(preview),
        }
    }

    /// Stage `bytes`, replacing any staged image.
    ///
    /// The bytes must decode as an image. On failure the staging area is left
    /// empty and the decode error is returned.
    pub fn attach(
        &mut self,
        bytes: Bytes,
        label: impl Into<String>,
    ) -> Result<&StagedAttachment, ChatError> {
        self.staged = None;

        let image = decode_image(&bytes)?;
        let preview = Thumbnail::from_image(&image, &self.scaler);
        let label = label.into();
        log::debug!(
            "Staged attachment {} ({} bytes, preview {}x{})",
            label,
            bytes.len(),
            preview.width,
            preview.height
        );

        Ok(&*self.staged.insert(StagedAttachment {
            bytes,
            preview,
            label,
        }))
    }

    pub fn clear(&mut self) {
        self.staged = None;
    }

    pub fn is_staged(&self) -> bool {
        self.staged.is_some()
    }

    pub fn staged(&self) -> Option<&StagedAttachment> {
        self.staged.as_ref()
    }

    /// Bytes to bundle with the outgoing message
    pub fn staged_bytes(&self) -> Option<Bytes> {
        self.staged.as_ref().map(|staged| staged.bytes.clone())
    }
}

impl Default for AttachmentStaging {
    fn default() -> Self {
        Self::new(ImageBounds::preview())
    }
}
