use std::io::BufRead as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use chatpane::app::shell::{self, Outcome};
use chatpane::{ChatApp, config_manager};

fn main() -> anyhow::Result<()> {
    chatpane::init_logging();

    // Parse config path from command line arguments
    let config_path = parse_config_path();
    let config = config_manager::load_config_or_default(&config_path);
    tracing::info!(path = %config_path.display(), "Config loaded");

    // The main thread owns the UI context; every panel update runs here
    let app = Arc::new(ChatApp::new(config).context("failed to build the chat application")?);
    let ui = app.ui_context().clone();
    let _printer = shell::subscribe_printer(&app, |text| println!("{}", text));

    println!("{}", shell::HELP);
    println!();
    println!("{}", app.history_text());

    let reader_app = app.clone();
    let reader_ui = ui.clone();
    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || read_commands(reader_app, reader_ui))
        .context("failed to spawn the input thread")?;

    ui.run()
}

/// Forward every input line to the UI context until EOF or `/quit`
fn read_commands(app: Arc<ChatApp>, ui: chatpane::UiContext) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                break;
            }
        };
        if ui.is_shutdown() {
            return;
        }

        let app = app.clone();
        let task_ui = ui.clone();
        ui.invoke_later(move || match shell::handle_line(&app, &line) {
            Outcome::Continue(Some(output)) => println!("{}", output),
            Outcome::Continue(None) => {}
            Outcome::Quit => task_ui.shutdown(),
        });
    }

    // EOF: let queued commands finish, then stop the loop
    let stopper = ui.clone();
    ui.invoke_later(move || stopper.shutdown());
}

fn parse_config_path() -> PathBuf {
    let mut args = std::env::args().skip(1);
    let mut explicit = None;

    // Check if user specified a custom config path via --config flag
    while let Some(flag) = args.next() {
        if flag == "--config" {
            explicit = args.next().map(PathBuf::from);
            break;
        }
    }

    config_manager::resolve_config_path(explicit)
}
