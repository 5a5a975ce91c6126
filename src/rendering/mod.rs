//! Message rendering pipeline
//!
//! Turns store messages into [`RenderedBlock`]s: header formatting, text
//! sanitization and wrapping, and image decoding with thumbnail scaling.

mod decode;
mod image_scaler;
mod message_renderer;
mod rendered_block;

pub use decode::{DecodeResult, decode_image};
pub use image_scaler::{ImageScaler, thumbnail_dimensions};
pub use message_renderer::{
    IMAGE_ERROR_PLACEHOLDER, MessageRenderer, escape_html, format_header, wrap_text,
};
pub use rendered_block::{RenderedAttachment, RenderedBlock, TextBody, Thumbnail};
