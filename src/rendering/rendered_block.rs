use std::fmt::Write as _;
use std::sync::Arc;

use chatpane_types::MessageId;
use image::DynamicImage;

use super::image_scaler::ImageScaler;

/// Display form of a single message, rebuilt on every render
#[derive(Debug, Clone)]
pub struct RenderedBlock {
    pub message_id: MessageId,
    /// `#<id> [HH:MM:SS] <sender>:`
    pub header: String,
    pub body: Option<TextBody>,
    pub attachment: Option<RenderedAttachment>,
}

/// Sanitized message text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBody {
    /// HTML-escaped text with line breaks as `<br>`
    pub markup: String,
    /// Text wrapped at the configured column width
    pub lines: Vec<String>,
    /// Fixed display width of the body
    pub width_px: u32,
}

impl TextBody {
    /// Markup wrapped in a fixed-width html document
    pub fn to_html(&self) -> String {
        format!(
            "<html><body style='width: {}px'>{}</body></html>",
            self.width_px, self.markup
        )
    }
}

#[derive(Debug, Clone)]
pub enum RenderedAttachment {
    Thumbnail(Thumbnail),
    /// Placeholder shown when the image bytes could not be decoded
    Error(String),
}

/// A decoded image scaled into display bounds
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub image: Arc<DynamicImage>,
    pub width: u32,
    pub height: u32,
    pub source_width: u32,
    pub source_height: u32,
}

impl Thumbnail {
    pub fn from_image(image: &DynamicImage, scaler: &ImageScaler) -> Self {
        let scaled = scaler.scale(image);
        Self {
            width: scaled.width(),
            height: scaled.height(),
            source_width: image.width(),
            source_height: image.height(),
            image: Arc::new(scaled.into_owned()),
        }
    }

    pub fn was_scaled(&self) -> bool {
        (self.width, self.height) != (self.source_width, self.source_height)
    }

    /// Short textual description, e.g. `[image 300x200 (scaled from 1200x800)]`
    pub fn describe(&self) -> String {
        if self.was_scaled() {
            format!(
                "[image {}x{} (scaled from {}x{})]",
                self.width, self.height, self.source_width, self.source_height
            )
        } else {
            format!("[image {}x{}]", self.width, self.height)
        }
    }
}

impl RenderedBlock {
    /// Terminal representation: the header followed by indented body lines
    pub fn to_plain_text(&self) -> String {
        let mut out = self.header.clone();
        if let Some(body) = &self.body {
            for line in &body.lines {
                let _ = write!(out, "\n  {}", line);
            }
        }
        match &self.attachment {
            Some(RenderedAttachment::Thumbnail(thumbnail)) => {
                let _ = write!(out, "\n  {}", thumbnail.describe());
            }
            Some(RenderedAttachment::Error(placeholder)) => {
                let _ = write!(out, "\n  {}", placeholder);
            }
            None => {}
        }
        out
    }

    pub fn has_image_error(&self) -> bool {
        matches!(self.attachment, Some(RenderedAttachment::Error(_)))
    }
}
