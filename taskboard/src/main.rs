//! `taskboard` — terminal Kanban board for the Taskboard REST API.
//!
//! Shows one board (a project's tasks or your personal tasks) as three
//! columns. Cards move by mouse drag or `H`/`L`; the move shows at once
//! and is confirmed or rolled back by re-fetching the board once the
//! backend answers.
//!
//! ```bash
//! # Offline demo board
//! cargo run --bin taskboard -- --offline
//!
//! # A project board
//! cargo run --bin taskboard -- --base-url http://localhost:8000/api/ \
//!     --username alice --project 3
//!
//! # Or via environment variables
//! TASKBOARD_URL=http://localhost:8000/api/ TASKBOARD_TOKEN=... cargo run
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_appender::non_blocking::WorkerGuard;

use taskboard::api::memory::InMemoryBackend;
use taskboard::api::{ApiClient, ApiError, BoardScope, TaskBackend};
use taskboard::app::App;
use taskboard::board::{BoardLayout, Notice};
use taskboard::config::{CliArgs, ClientConfig};
use taskboard::net::{self, NetCommand};
use taskboard::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(offline = config.is_offline(), scope = %config.scope(), "taskboard starting");

    // Connect before taking over the terminal so login errors stay readable.
    let client = if config.is_offline() {
        None
    } else {
        match connect(&config).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::error!(error = %e, "could not connect to API");
                eprintln!("Could not connect to the API ({e}); showing the offline demo board.");
                None
            }
        }
    };

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app.
    let result = match client {
        Some(client) => {
            run_app(&mut terminal, Arc::new(client), &config, config.scope(), None).await
        }
        None => {
            let notice = (!config.is_offline())
                .then(|| Notice::error("API unreachable: offline demo board"));
            run_app(
                &mut terminal,
                Arc::new(InMemoryBackend::demo()),
                &config,
                BoardScope::Personal,
                notice,
            )
            .await
        }
    };

    // Restore terminal.
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    tracing::info!("taskboard exiting");
    result
}

/// Builds the API client and authenticates it.
///
/// A configured token is used as is; otherwise username and password,
/// when both are set, are exchanged for one.
async fn connect(config: &ClientConfig) -> Result<ApiClient, ApiError> {
    let base_url = config
        .base_url
        .as_deref()
        .ok_or_else(|| ApiError::InvalidRequest("no API base URL configured".to_string()))?;
    let client = ApiClient::new(base_url, config.request_timeout)?;

    if let Some(token) = &config.token {
        client.set_token(Some(token.clone()));
    } else if let (Some(username), Some(password)) = (&config.username, &config.password) {
        client.login(username, password).await?;
    } else {
        tracing::warn!("no token or credentials configured, requests are anonymous");
    }
    Ok(client)
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskboard.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_env("TASKBOARD_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
async fn run_app<B>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    backend: Arc<B>,
    config: &ClientConfig,
    scope: BoardScope,
    startup_notice: Option<Notice>,
) -> io::Result<()>
where
    B: TaskBackend + 'static,
{
    let mut app = App::new(scope)
        .with_drag_activation(config.drag_activation_distance)
        .with_notice_timeout(config.notice_timeout);
    if let Some(notice) = startup_notice {
        app.show_notice(notice);
    }

    let (cmd_tx, mut evt_rx) = net::spawn_net(backend, config.net_config(scope));
    app.send_command(&cmd_tx, NetCommand::Refresh);

    loop {
        // Step 1: Draw, keeping the regions for hit testing.
        let mut layout = BoardLayout::default();
        terminal.draw(|frame| layout = ui::draw(frame, &app))?;
        app.set_layout(layout);

        // Step 2: Drain worker events (non-blocking).
        app.drain_net_events(&mut evt_rx, &cmd_tx);

        // Step 3: Expire notices and retry a deferred refresh.
        app.tick(Instant::now());
        app.retry_refresh(&cmd_tx);

        // Step 4: Poll for terminal input events.
        if event::poll(config.poll_timeout)? {
            let command = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key_event(key),
                Event::Mouse(mouse) => app.handle_mouse_event(mouse),
                _ => None,
            };
            if let Some(command) = command {
                app.send_command(&cmd_tx, command);
            }
        }

        if app.should_quit {
            let _ = cmd_tx.try_send(NetCommand::Shutdown);
            return Ok(());
        }
    }
}
