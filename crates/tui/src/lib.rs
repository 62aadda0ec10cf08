//! Terminal display host: connects to the plugin server over WebSocket and
//! shows the selected plugin in the terminal.

mod app;
pub mod connection;
pub mod error;
mod state;
pub mod surface;
mod ui;

use {
    connection::{Backoff, ConnectionEvent, ConnectionManager},
    marquee_config::MarqueeConfig,
    marquee_display::{Display, HostAddress, LogSurface},
    std::sync::Arc,
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

pub use {app::App, error::Error, surface::TerminalSurface};

fn spawn_connection(
    config: &MarqueeConfig,
    host: &HostAddress,
) -> (Arc<ConnectionManager>, mpsc::UnboundedReceiver<ConnectionEvent>) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let backoff = Backoff::new(
        config.connection.initial_backoff(),
        config.connection.max_backoff(),
    );
    let connection = ConnectionManager::spawn(host.channel_url(), backoff, event_tx);
    (Arc::new(connection), event_rx)
}

/// Entry point for the interactive terminal display.
pub async fn run_tui(config: &MarqueeConfig, host: HostAddress) -> Result<(), Error> {
    let (connection, connection_rx) = spawn_connection(config, &host);
    let display = Display::new(
        TerminalSurface::new(config.ui.inbox_capacity),
        connection,
        host,
    );

    // Enable focus-change reporting so we can redraw on tab-switch.
    crossterm::execute!(std::io::stdout(), crossterm::event::EnableFocusChange)?;

    let terminal = ratatui::init();
    let result = App::new(display, config.ui.tick())
        .run(terminal, connection_rx)
        .await;
    ratatui::restore();

    let _ = crossterm::execute!(std::io::stdout(), crossterm::event::DisableFocusChange);

    result
}

/// Run the display without a terminal UI, logging every surface operation.
/// Returns on Ctrl+C.
pub async fn run_headless(config: &MarqueeConfig, host: HostAddress) -> Result<(), Error> {
    let (connection, mut connection_rx) = spawn_connection(config, &host);
    let mut display = Display::new(LogSurface::default(), connection, host);

    loop {
        tokio::select! {
            event = connection_rx.recv() => {
                match event {
                    Some(ConnectionEvent::Connected) => display.on_open(),
                    Some(ConnectionEvent::Frame(text)) => {
                        let dispatch = display.handle_frame(&text);
                        debug!(?dispatch, "frame handled");
                    },
                    Some(ConnectionEvent::Disconnected) => info!("disconnected from plugin server"),
                    Some(ConnectionEvent::Reconnecting(delay)) => {
                        debug!(delay_ms = delay.as_millis(), "waiting to reconnect");
                    },
                    Some(ConnectionEvent::Error(e)) => warn!(error = %e, "connection error"),
                    None => return Ok(()),
                }
            },
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("interrupted, shutting down");
                return Ok(());
            },
        }
    }
}
