use anyhow::Result;

mod app;
mod chat;
mod completion;
mod config;
mod content;
mod handler;
mod logging;
mod rain;
mod section;
mod tui;
mod ui;

use app::App;
use config::Config;
use tui::{AppEvent, EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let loaded = Config::load();
    let config = loaded.as_ref().cloned().unwrap_or_default().with_env();

    // Logging is best effort; the app runs without it
    let log_file = logging::init(config.log_level()).ok();
    if let Err(e) = &loaded {
        tracing::warn!(error = %e, "ignoring unreadable config, using defaults");
    }
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = ?log_file,
        key_source = config.key_source().unwrap_or("none"),
        model = %config.chat().map(|c| c.model).unwrap_or_default(),
        "starting portfolio"
    );

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let (width, height) = crossterm::terminal::size()?;
    let mut app = App::new(&config, width, height);
    let mut events = EventHandler::new(config.frame_interval(), config.reveal_interval());

    let result = run(&mut terminal, &mut app, &mut events).await;

    app.shutdown();
    drop(events);
    tui::restore()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "exited with error");
    }
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    terminal.draw(|frame| ui::render(app, frame))?;

    while !app.should_quit {
        let Some(event) = events.next().await else {
            break;
        };

        // Reveal ticks only change the screen while a reply is typing out
        let redraw = event != AppEvent::Reveal || app.chat.is_revealing();
        handler::handle_event(app, event).await?;

        if redraw {
            terminal.draw(|frame| ui::render(app, frame))?;
        }
    }

    Ok(())
}
