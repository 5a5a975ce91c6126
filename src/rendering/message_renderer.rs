//! Message rendering
//!
//! A rendered message is a header line, an optional sanitized text body and an
//! optional image thumbnail. Rendering never fails: undecodable image bytes
//! produce a placeholder instead of a thumbnail.

use chatpane_types::{Config, DEFAULT_TEXT_WIDTH_PX, DEFAULT_WRAP_COLUMNS, ImageBounds, Message};
use chrono::Local;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::decode::decode_image;
use super::image_scaler::ImageScaler;
use super::rendered_block::{RenderedAttachment, RenderedBlock, TextBody, Thumbnail};

pub const IMAGE_ERROR_PLACEHOLDER: &str = "[Failed to load image]";

#[derive(Debug, Clone)]
pub struct MessageRenderer {
    scaler: ImageScaler,
    wrap_columns: usize,
    text_width_px: u32,
}

impl MessageRenderer {
    pub fn new(thumbnail: ImageBounds, wrap_columns: usize, text_width_px: u32) -> Self {
        Self {
            scaler: ImageScaler::new(thumbnail),
            wrap_columns,
            text_width_px,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.thumbnail, config.wrap_columns, config.text_width_px)
    }

    pub fn render(&self, message: &Message) -> RenderedBlock {
        let body = message
            .text
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(|text| TextBody {
                markup: escape_html(text),
                lines: wrap_text(text, self.wrap_columns),
                width_px: self.text_width_px,
            });

        let attachment = message.image_data.as_ref().map(|bytes| {
            match decode_image(bytes) {
                Ok(image) => RenderedAttachment::Thumbnail(Thumbnail::from_image(&image, &self.scaler)),
                Err(e) => {
                    log::warn!("Failed to render image of message #{}: {}", message.id, e);
                    RenderedAttachment::Error(IMAGE_ERROR_PLACEHOLDER.to_string())
                }
            }
        });

        RenderedBlock {
            message_id: message.id,
            header: format_header(message),
            body,
            attachment,
        }
    }

    /// Render messages in the order given
    pub fn render_all(&self, messages: &[Message]) -> Vec<RenderedBlock> {
        messages.iter().map(|message| self.render(message)).collect()
    }
}

impl Default for MessageRenderer {
    fn default() -> Self {
        Self::new(
            ImageBounds::thumbnail(),
            DEFAULT_WRAP_COLUMNS,
            DEFAULT_TEXT_WIDTH_PX,
        )
    }
}

/// `#<id> [HH:MM:SS] <sender>:` with the timestamp in local time
pub fn format_header(message: &Message) -> String {
    format!(
        "#{} [{}] {}:",
        message.id,
        message.timestamp.with_timezone(&Local).format("%H:%M:%S"),
        message.sender_name
    )
}

/// Escape `&`, `<` and `>` and turn line breaks into `<br>`
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

/// Greedy word wrap at `columns` display columns.
///
/// Explicit line breaks are kept, runs of whitespace collapse to a single
/// space and words wider than a line are split. `columns == 0` disables
/// wrapping.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    if columns == 0 {
        return normalized.split('\n').map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    for paragraph in normalized.split('\n') {
        let mut current = String::new();
        let mut width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.width();

            if word_width > columns {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                width = 0;
                for ch in word.chars() {
                    let ch_width = ch.width().unwrap_or(0);
                    if width + ch_width > columns && !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                        width = 0;
                    }
                    current.push(ch);
                    width += ch_width;
                }
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
                width = word_width;
            } else if width + 1 + word_width <= columns {
                current.push(' ');
                current.push_str(word);
                width += 1 + word_width;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
                width = word_width;
            }
        }

        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chatpane_types::{ConversationId, MessageId};
    use chrono::Utc;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn message(id: u64, text: Option<&str>, image_data: Option<Vec<u8>>) -> Message {
        Message {
            id: MessageId(id),
            conversation_id: ConversationId(1),
            sender_name: "Alice".to_string(),
            text: text.map(str::to_string),
            image_data: image_data.map(Bytes::from),
            timestamp: Utc::now(),
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_header_format() {
        let header = format_header(&message(7, Some("hi"), None));
        assert!(header.starts_with("#7 ["));
        assert!(header.ends_with("] Alice:"));
        // "#7 [" + "HH:MM:SS" + "] Alice:"
        assert_eq!(header.len(), 4 + 8 + 8);
    }

    #[test]
    fn test_escape_order() {
        assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
        assert_eq!(escape_html("one\ntwo\r\nthree"), "one<br>two<br>three");
    }

    #[test]
    fn test_wrap_greedy() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]);
        assert!(lines.iter().all(|line| line.width() <= 10));
    }

    #[test]
    fn test_wrap_splits_long_words_and_keeps_breaks() {
        assert_eq!(wrap_text("abcdefghij xy", 4), vec!["abcd", "efgh", "ij", "xy"]);
        assert_eq!(wrap_text("first\n\nsecond", 40), vec!["first", "", "second"]);
    }

    #[test]
    fn test_wrap_counts_display_columns() {
        // Each CJK character occupies two columns
        assert_eq!(wrap_text("漢字漢字", 4), vec!["漢字", "漢字"]);
    }

    #[test]
    fn test_text_body() {
        let renderer = MessageRenderer::default();
        let block = renderer.render(&message(1, Some("Hello everyone!"), None));

        let body = block.body.unwrap();
        assert_eq!(body.markup, "Hello everyone!");
        assert_eq!(body.lines, vec!["Hello everyone!"]);
        assert_eq!(body.width_px, 250);
        assert!(body.to_html().contains("width: 250px"));
        assert!(block.attachment.is_none());
    }

    #[test]
    fn test_empty_text_has_no_body() {
        let renderer = MessageRenderer::default();
        assert!(renderer.render(&message(1, Some(""), None)).body.is_none());
        assert!(renderer.render(&message(2, None, None)).body.is_none());
    }

    #[test]
    fn test_image_is_scaled_into_thumbnail() {
        let renderer = MessageRenderer::default();
        let block = renderer.render(&message(3, None, Some(png(1200, 800))));

        match block.attachment {
            Some(RenderedAttachment::Thumbnail(thumbnail)) => {
                assert_eq!((thumbnail.width, thumbnail.height), (300, 200));
                assert_eq!((thumbnail.source_width, thumbnail.source_height), (1200, 800));
                assert_eq!(thumbnail.image.width(), 300);
            }
            other => panic!("expected thumbnail, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_image_degrades_to_placeholder() {
        let renderer = MessageRenderer::default();
        for bytes in [Vec::new(), b"garbage".to_vec(), png(4, 4)[..20].to_vec()] {
            let block = renderer.render(&message(4, Some("caption"), Some(bytes)));
            assert!(block.header.starts_with("#4 ["));
            assert!(block.body.is_some());
            assert!(block.has_image_error());
            assert!(block.to_plain_text().ends_with(IMAGE_ERROR_PLACEHOLDER));
        }
    }

    #[test]
    fn test_render_all_keeps_order() {
        let renderer = MessageRenderer::default();
        let messages = vec![
            message(3, Some("c"), None),
            message(1, Some("a"), None),
            message(2, Some("b"), None),
        ];
        let ids: Vec<_> = renderer
            .render_all(&messages)
            .iter()
            .map(|block| block.message_id.0)
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
