use chatpane_services::ConversationStore;
use chatpane_types::{ChatError, Conversation};

/// Create "General Chat" with two greetings and an empty "Random"
pub fn seed_sample_data(store: &dyn ConversationStore) -> Result<Vec<Conversation>, ChatError> {
    let general = store.create_conversation(
        "General Chat",
        vec!["Alice".to_string(), "Bob".to_string(), "Charlie".to_string()],
    );
    let random = store.create_conversation("Random", Vec::new());

    store.send_message(general.id, "Alice", Some("Hello everyone!".to_string()), None)?;
    store.send_message(general.id, "Charlie", Some("Hi all!".to_string()), None)?;

    log::info!("Seeded sample conversations");
    Ok(vec![general, random])
}
