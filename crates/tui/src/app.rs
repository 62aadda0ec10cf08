use {
    crate::{
        Error,
        connection::ConnectionEvent,
        state::{AppState, ConnectionDisplay, InputMode, NoticeLevel},
        surface::TerminalSurface,
        ui::{self, theme::Theme},
    },
    crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyModifiers},
    futures::StreamExt,
    marquee_display::{Dispatch, Display, RenderOutcome},
    ratatui::DefaultTerminal,
    std::time::Duration,
    tokio::sync::mpsc,
    tracing::{debug, info},
    tui_textarea::TextArea,
};

/// Events that drive the application state machine.
#[derive(Debug)]
pub enum AppEvent {
    /// Terminal key press.
    Key(KeyEvent),
    /// Terminal resize or focus regained: forces a full redraw.
    Redraw,
    /// Periodic tick for the connecting indicator.
    Tick,
    /// Connection lifecycle event or inbound frame.
    Connection(ConnectionEvent),
}

/// Top-level application: the display core plus terminal UI state.
pub struct App {
    state: AppState,
    display: Display<TerminalSurface>,
    command: TextArea<'static>,
    should_quit: bool,
    tick: Duration,
    ticks: u64,
    theme: Theme,
}

impl App {
    pub fn new(display: Display<TerminalSurface>, tick: Duration) -> Self {
        let state = AppState::new(display.host().host());
        Self {
            state,
            display,
            command: command_line(),
            should_quit: false,
            tick,
            ticks: 0,
            theme: Theme::default(),
        }
    }

    /// Main event loop: reads terminal and connection events, dispatches,
    /// and re-renders when something changed.
    pub async fn run(
        mut self,
        mut terminal: DefaultTerminal,
        mut connection_rx: mpsc::UnboundedReceiver<ConnectionEvent>,
    ) -> Result<(), Error> {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

        // Terminal event reader
        let term_tx = event_tx.clone();
        tokio::spawn(async move {
            let mut reader = EventStream::new();
            while let Some(Ok(event)) = reader.next().await {
                let app_event = match event {
                    Event::Key(key) => AppEvent::Key(key),
                    Event::Resize(..) | Event::FocusGained => AppEvent::Redraw,
                    _ => continue,
                };
                if term_tx.send(app_event).is_err() {
                    break;
                }
            }
        });

        let tick_tx = event_tx.clone();
        let period = self.tick;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if tick_tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        // Forward connection events into the main loop
        let conn_fwd_tx = event_tx;
        tokio::spawn(async move {
            while let Some(event) = connection_rx.recv().await {
                if conn_fwd_tx.send(AppEvent::Connection(event)).is_err() {
                    break;
                }
            }
        });

        while !self.should_quit {
            if self.state.dirty {
                terminal.draw(|frame| {
                    ui::draw(
                        frame,
                        &self.state,
                        &self.display,
                        &mut self.command,
                        self.ticks,
                        &self.theme,
                    );
                })?;
                self.state.dirty = false;
            }

            match event_rx.recv().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }

        info!("display closed");
        Ok(())
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Redraw => {
                self.state.dirty = true;
            },
            AppEvent::Tick => {
                self.ticks = self.ticks.wrapping_add(1);
                if self.state.connection == ConnectionDisplay::Connecting {
                    self.state.dirty = true;
                }
            },
            AppEvent::Connection(event) => self.handle_connection_event(event),
        }
    }

    fn handle_connection_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Connected => {
                self.state.connection = ConnectionDisplay::Connected;
                self.display.on_open();
                self.state.notify(NoticeLevel::Info, "connected, loading plugins");
            },
            ConnectionEvent::Disconnected => {
                self.state.connection = ConnectionDisplay::Disconnected;
                self.state.dirty = true;
            },
            ConnectionEvent::Reconnecting(delay) => {
                self.state.connection = ConnectionDisplay::Connecting;
                self.state.notify(
                    NoticeLevel::Info,
                    format!("reconnecting in {}s", delay.as_secs_f32()),
                );
            },
            ConnectionEvent::Error(msg) => {
                self.state.connection = ConnectionDisplay::Disconnected;
                self.state
                    .notify(NoticeLevel::Error, format!("connection error: {msg}"));
            },
            ConnectionEvent::Frame(text) => self.handle_frame(&text),
        }
    }

    fn handle_frame(&mut self, text: &str) {
        match self.display.handle_frame(text) {
            Dispatch::Applied { rejected, .. } => {
                for e in rejected {
                    self.state.notify(NoticeLevel::Warn, e.to_string());
                }
                self.state.dirty = true;
            },
            Dispatch::Rejected(e) => self.state.notify(NoticeLevel::Warn, e.to_string()),
            Dispatch::Delivered => self.state.dirty = true,
            Dispatch::UpstreamError => {
                self.state
                    .notify(NoticeLevel::Error, "plugin server reported an error");
            },
            Dispatch::Unrecognized(kind) => {
                self.state
                    .notify(NoticeLevel::Warn, format!("unrecognized message `{kind}`"));
            },
            Dispatch::Dropped | Dispatch::Ignored | Dispatch::Undecodable => {},
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.state.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Command => self.handle_command_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), _) => {
                self.should_quit = true;
            },
            (KeyCode::Tab | KeyCode::Char('n'), _) => self.cycle(),
            (KeyCode::Char(':'), _) => {
                self.state.input_mode = InputMode::Command;
                self.command = command_line();
                self.state.dirty = true;
            },
            _ => {},
        }
    }

    fn handle_command_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                self.state.input_mode = InputMode::Normal;
                self.command = command_line();
            },
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.state.input_mode = InputMode::Normal;
                self.command = command_line();
            },
            (KeyCode::Enter, _) => {
                let cmd = self.command.lines().join(" ");
                self.command = command_line();
                self.state.input_mode = InputMode::Normal;
                self.execute_command(&cmd);
            },
            _ => {
                self.command.input(key);
            },
        }
        self.state.dirty = true;
    }

    fn execute_command(&mut self, cmd: &str) {
        let cmd = cmd.trim();
        let (name, arg) = match cmd.split_once(' ') {
            Some((name, arg)) => (name, arg.trim()),
            None => (cmd, ""),
        };
        debug!(command = name, "executing command");

        match name {
            "" => {},
            "q" | "quit" => self.should_quit = true,
            "n" | "next" => self.cycle(),
            "select" if arg.is_empty() => {
                self.state.notify(NoticeLevel::Warn, "usage: :select <plugin>");
            },
            "select" => match self.display.select(arg) {
                Ok(_) => self.state.dirty = true,
                Err(e) => self.state.notify(NoticeLevel::Warn, e.to_string()),
            },
            "send" => self.send(arg),
            other => {
                self.state
                    .notify(NoticeLevel::Warn, format!("unknown command: {other}"));
            },
        }
    }

    fn cycle(&mut self) {
        if self.display.cycle() == RenderOutcome::Empty {
            self.state.notify(NoticeLevel::Info, "no plugins to show");
        }
        self.state.dirty = true;
    }

    /// Send a message as the rendered plugin. Arguments that are not JSON are
    /// sent as a string.
    fn send(&mut self, arg: &str) {
        let mesg = serde_json::from_str(arg)
            .unwrap_or_else(|_| serde_json::Value::String(arg.to_owned()));
        if self.display.surface().send(mesg) {
            self.state.notify(NoticeLevel::Info, "message sent");
        } else {
            self.state
                .notify(NoticeLevel::Warn, "the rendered plugin has no messaging link");
        }
    }
}

fn command_line() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text("next | select <plugin> | send <json> | quit");
    textarea
}
