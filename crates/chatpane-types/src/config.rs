use serde::{Deserialize, Serialize};

pub const DEFAULT_WRAP_COLUMNS: usize = 40;
pub const DEFAULT_TEXT_WIDTH_PX: u32 = 250;
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 10_000;

/// Maximum box an image is scaled down into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImageBounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl ImageBounds {
    pub const fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// Bounds for thumbnails in the conversation history
    pub const fn thumbnail() -> Self {
        Self::new(300, 200)
    }

    /// Bounds for the attachment preview in a sender panel
    pub const fn preview() -> Self {
        Self::new(80, 50)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default user name of the left sender panel
    #[serde(default = "default_left_user")]
    pub left_user: String,
    /// Default user name of the right sender panel
    #[serde(default = "default_right_user")]
    pub right_user: String,
    #[serde(default = "ImageBounds::thumbnail")]
    pub thumbnail: ImageBounds,
    #[serde(default = "ImageBounds::preview")]
    pub preview: ImageBounds,
    /// Display columns message bodies are wrapped at
    #[serde(default = "default_wrap_columns")]
    pub wrap_columns: usize,
    /// Fixed pixel width of the message body markup
    #[serde(default = "default_text_width_px")]
    pub text_width_px: u32,
    /// Longer message text is truncated by the store (in characters)
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// Create the "General Chat" and "Random" conversations on startup
    #[serde(default = "default_true")]
    pub seed_sample_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            left_user: default_left_user(),
            right_user: default_right_user(),
            thumbnail: ImageBounds::thumbnail(),
            preview: ImageBounds::preview(),
            wrap_columns: DEFAULT_WRAP_COLUMNS,
            text_width_px: DEFAULT_TEXT_WIDTH_PX,
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            seed_sample_data: true,
        }
    }
}

fn default_left_user() -> String {
    "Alice".to_string()
}

fn default_right_user() -> String {
    "Bob".to_string()
}

fn default_wrap_columns() -> usize {
    DEFAULT_WRAP_COLUMNS
}

fn default_text_width_px() -> u32 {
    DEFAULT_TEXT_WIDTH_PX
}

fn default_max_message_length() -> usize {
    DEFAULT_MAX_MESSAGE_LENGTH
}

fn default_true() -> bool {
    true
}
