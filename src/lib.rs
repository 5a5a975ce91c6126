pub mod app;
pub mod panels;
pub mod rendering;

pub use app::{ChatApp, ConversationSelectionCoordinator, Side, seed_sample_data};
pub use chatpane_event_bus::{EventHub, Subscription, UiContext};
pub use chatpane_services::{ChatService, ConversationStore};
pub use chatpane_types::{
    ChatError, Config, Conversation, ConversationId, DecodeError, ImageBounds, Message, MessageId,
    config_manager,
};
pub use panels::{AttachmentStaging, ConversationView, HistoryPanel, SenderPanel};
pub use rendering::{ImageScaler, MessageRenderer, RenderedAttachment, RenderedBlock};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Install the global log subscriber. `RUST_LOG` overrides the default level.
///
/// Output goes to stderr so it does not mix with the shell transcript.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    let result = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
