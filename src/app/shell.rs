//! Line-oriented front end
//!
//! Each input line is parsed into a [`Command`] and executed against a
//! [`ChatApp`] on the UI context. New messages of the selected conversation
//! are echoed as they arrive.

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use anyhow::{Context as _, anyhow, bail};
use chatpane_event_bus::Subscription;
use chatpane_services::ConversationStore;
use chatpane_types::{ChatError, ConversationId};

use super::chat_app::{ChatApp, Side, lock};

pub const HELP: &str = "\
Commands:
  left: <text>               send from the left panel
  right: <text>              send from the right panel
  /select <id>|none          select a conversation
  /new <name>[: a, b]        create and select a conversation
  /name left|right <name>    change a sender name
  /attach left|right <path>  stage an image file
  /detach left|right         drop the staged image
  /list                      list conversations
  /show                      print the selected conversation
  /help                      show this help
  /quit                      exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(Side, String),
    Select(Option<ConversationId>),
    New {
        name: String,
        participants: Vec<String>,
    },
    Name(Side, String),
    Attach(Side, PathBuf),
    Detach(Side),
    List,
    Show,
    Help,
    Quit,
}

/// What the caller should do after a command ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(Option<String>),
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> anyhow::Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Some(text) = line.strip_prefix("left:") {
        return Ok(Some(Command::Send(Side::Left, text.trim().to_string())));
    }
    if let Some(text) = line.strip_prefix("right:") {
        return Ok(Some(Command::Send(Side::Right, text.trim().to_string())));
    }

    let Some(rest) = line.strip_prefix('/') else {
        bail!("expected `left: <text>`, `right: <text>` or a /command");
    };
    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "select" => Command::Select(parse_selection(args)?),
        "new" => {
            let (name, participants) = match args.split_once(':') {
                Some((name, participants)) => (name.trim(), split_names(participants)),
                None => (args, Vec::new()),
            };
            if name.is_empty() {
                bail!("usage: /new <name>[: participant, ...]");
            }
            Command::New {
                name: name.to_string(),
                participants,
            }
        }
        "name" => {
            let (side, user_name) = parse_side_and_arg(args, "/name left|right <name>")?;
            Command::Name(side, user_name.to_string())
        }
        "attach" => {
            let (side, path) = parse_side_and_arg(args, "/attach left|right <path>")?;
            Command::Attach(side, PathBuf::from(path))
        }
        "detach" => Command::Detach(parse_side(args)?),
        "list" => Command::List,
        "show" => Command::Show,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command /{}", other),
    };
    Ok(Some(command))
}

/// Run `command`, turning errors into user-facing notices
pub fn execute(app: &ChatApp, command: Command) -> Outcome {
    let result = match command {
        Command::Quit => return Outcome::Quit,
        Command::Help => Ok(Some(HELP.to_string())),
        Command::Send(side, text) => app
            .send(side, &text)
            .map(|message| {
                log::debug!("Shell sent message #{} from {} panel", message.id, side);
                None
            }),
        Command::Select(conversation_id) => app
            .select(conversation_id)
            .map(|_| Some(app.history_text())),
        Command::New { name, participants } => app
            .create_conversation(&name, participants)
            .map(|conversation| Some(format!("Conversation '{}' created.", conversation.name))),
        Command::Name(side, user_name) => {
            app.set_user_name(side, &user_name);
            Ok(Some(format!("{} panel now sends as {}", side, user_name)))
        }
        Command::Attach(side, path) => app
            .attach_file(side, &path)
            .map(|label| Some(format!("Attached {} to the {} panel", label, side))),
        Command::Detach(side) => {
            app.detach(side);
            Ok(Some(format!("Cleared the {} panel attachment", side)))
        }
        Command::List => app.refresh_conversations().map(|labels| {
            let current = app.current_conversation();
            let lines: Vec<String> = app
                .store()
                .all_conversations()
                .iter()
                .zip(labels)
                .map(|(conversation, label)| {
                    let marker = if Some(conversation.id) == current { "*" } else { " " };
                    format!("{} {}", marker, label)
                })
                .collect();
            Some(lines.join("\n"))
        }),
        Command::Show => Ok(Some(app.history_text())),
    };

    match result {
        Ok(output) => Outcome::Continue(output),
        Err(e) => Outcome::Continue(Some(format_error(&e))),
    }
}

/// Parse and execute one line
pub fn handle_line(app: &ChatApp, line: &str) -> Outcome {
    match parse_command(line) {
        Ok(Some(command)) => execute(app, command),
        Ok(None) => Outcome::Continue(None),
        Err(e) => Outcome::Continue(Some(format!("Error: {}", e))),
    }
}

pub fn format_error(error: &ChatError) -> String {
    format!("{}: {}", error.title(), error)
}

/// Echo every new message of the selected conversation through `output`
pub fn subscribe_printer<F>(app: &Arc<ChatApp>, output: F) -> Subscription
where
    F: Fn(String) + Send + Sync + 'static,
{
    let weak_app: Weak<ChatApp> = Arc::downgrade(app);
    let hub = app.event_hub();
    let id = hub.subscribe_messages(move |message| {
        let app = weak_app
            .upgrade()
            .ok_or_else(|| anyhow!("application dropped"))?;
        let history = lock(app.history());
        if let Some(block) = history
            .blocks()
            .iter()
            .rev()
            .find(|block| block.message_id == message.id)
        {
            output(block.to_plain_text());
        }
        Ok(())
    });
    hub.guard(id)
}

fn parse_selection(args: &str) -> anyhow::Result<Option<ConversationId>> {
    if args.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let id = args
        .trim_start_matches('#')
        .parse::<u64>()
        .with_context(|| format!("invalid conversation id '{}'", args))?;
    Ok(Some(ConversationId(id)))
}

fn parse_side(arg: &str) -> anyhow::Result<Side> {
    match arg {
        "left" => Ok(Side::Left),
        "right" => Ok(Side::Right),
        other => bail!("expected left or right, got '{}'", other),
    }
}

fn parse_side_and_arg<'a>(args: &'a str, usage: &str) -> anyhow::Result<(Side, &'a str)> {
    let (side, rest) = args
        .split_once(char::is_whitespace)
        .ok_or_else(|| anyhow!("usage: {}", usage))?;
    let rest = rest.trim();
    if rest.is_empty() {
        bail!("usage: {}", usage);
    }
    Ok((parse_side(side)?, rest))
}

fn split_names(names: &str) -> Vec<String> {
    names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
