mod chat_app;
mod sample_data;
mod selection;
pub mod shell;

pub use chat_app::{ChatApp, Side};
pub use sample_data::seed_sample_data;
pub use selection::{ConversationSelectionCoordinator, SharedView};
