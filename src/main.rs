use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

mod agent;
mod app;
mod config;
mod handler;
mod logging;
mod theme;
mod tui;
mod ui;

use agent::AgentClient;
use app::App;
use config::{AgentSettings, Config, Overrides, ThemeSlot};
use theme::ThemeStore;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Terminal chat client for a hosted conversational agent", version)]
struct Cli {
    /// Agent endpoint URL (overrides PARLEY_ENDPOINT and the config file)
    #[arg(long)]
    endpoint: Option<String>,

    /// API key sent in the x-api-key header (overrides PARLEY_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Opaque user id forwarded with every message
    #[arg(long)]
    user_id: Option<String>,

    /// Opaque agent id forwarded with every message
    #[arg(long)]
    agent_id: Option<String>,

    /// Opaque session id forwarded with every message
    #[arg(long)]
    session_id: Option<String>,

    /// Append diagnostics to this file (filtered by RUST_LOG, default "info")
    #[arg(long)]
    log: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log.as_deref())?;

    let config = Config::load().unwrap_or_else(|_| Config::default());
    let settings = AgentSettings::resolve(
        &config,
        Overrides {
            endpoint: cli.endpoint,
            api_key: cli.api_key,
            user_id: cli.user_id,
            agent_id: cli.agent_id,
            session_id: cli.session_id,
        },
    )?;

    let agent = AgentClient::new(settings);
    let theme = ThemeStore::new(Box::new(ThemeSlot::at_default()));
    let mut app = App::new(agent, theme);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut events, &mut app).await;
    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event);
        }

        poll_agent_reply(app).await;
    }

    Ok(())
}

/// Apply the resolve/fail transition once the in-flight call has finished.
/// Every failure, task panics included, becomes a regular chat message.
async fn poll_agent_reply(app: &mut App) {
    let finished = app
        .in_flight
        .as_ref()
        .map(|task| task.is_finished())
        .unwrap_or(false);
    if !finished {
        return;
    }

    let Some(task) = app.in_flight.take() else {
        return;
    };

    match task.await {
        Ok(Ok(reply)) => app.finish_send(reply),
        Ok(Err(err)) => {
            tracing::warn!("agent call failed: {:#}", err);
            app.fail_send();
        }
        Err(err) => {
            tracing::warn!("agent task aborted: {}", err);
            app.fail_send();
        }
    }
}
