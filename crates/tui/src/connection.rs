use {
    crate::Error,
    futures::{SinkExt, StreamExt},
    marquee_display::Outbox,
    marquee_protocol::Envelope,
    std::time::Duration,
    tokio::sync::mpsc,
    tokio_tungstenite::{connect_async, tungstenite::Message},
    tracing::{debug, error, info, warn},
};

/// Events sent from the connection task to the main loop.
#[derive(Debug)]
pub enum ConnectionEvent {
    Connected,
    Disconnected,
    /// A new attempt starts after the given backoff delay.
    Reconnecting(Duration),
    Error(String),
    Frame(String),
}

/// Exponential reconnect delay, doubled after every failed attempt and reset
/// once a connection is established.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        let initial = initial.min(max);
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Manages the WebSocket connection to the plugin server, reconnecting with
/// exponential backoff.
///
/// Inbound text frames are forwarded as [`ConnectionEvent::Frame`]; outbound
/// envelopes go through the [`Outbox`] impl.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Send JSON text frames to the WebSocket writer task.
    write_tx: mpsc::UnboundedSender<String>,
}

impl ConnectionManager {
    /// Spawn the connection task. Returns immediately.
    pub fn spawn(
        url: String,
        backoff: Backoff,
        event_tx: mpsc::UnboundedSender<ConnectionEvent>,
    ) -> Self {
        let (write_tx, write_rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(connection_loop(url, backoff, event_tx, write_rx));

        Self { write_tx }
    }

    /// Serialize and queue an envelope for the writer task.
    pub fn send_envelope(&self, envelope: &Envelope) -> Result<(), Error> {
        let json = envelope.to_json()?;
        // A closed channel means the connection loop has exited.
        let _ = self.write_tx.send(json);
        Ok(())
    }
}

impl Outbox for ConnectionManager {
    fn send(&self, envelope: Envelope) {
        if let Err(e) = self.send_envelope(&envelope) {
            warn!(kind = %envelope.kind, error = %e, "failed to queue envelope");
        }
    }
}

/// Main connection loop with auto-reconnect.
async fn connection_loop(
    url: String,
    mut backoff: Backoff,
    event_tx: mpsc::UnboundedSender<ConnectionEvent>,
    mut write_rx: mpsc::UnboundedReceiver<String>,
) {
    loop {
        info!(url = %url, "connecting to plugin server");

        match connect_and_run(&url, &mut backoff, &event_tx, &mut write_rx).await {
            Ok(Closed::ByServer) => {
                debug!("connection closed by server");
            },
            Ok(Closed::ByApp) => {
                debug!("outbound channel closed, stopping connection task");
                return;
            },
            Err(e) => {
                error!(error = %e, "connection error");
                let _ = event_tx.send(ConnectionEvent::Error(e.to_string()));
            },
        }

        if event_tx.send(ConnectionEvent::Disconnected).is_err() {
            return;
        }

        let delay = backoff.next_delay();
        info!(delay_ms = delay.as_millis(), "reconnecting after delay");
        if event_tx.send(ConnectionEvent::Reconnecting(delay)).is_err() {
            return;
        }
        tokio::time::sleep(delay).await;
    }
}

enum Closed {
    ByServer,
    ByApp,
}

/// Single connection attempt: connect, then forward frames both ways.
async fn connect_and_run(
    url: &str,
    backoff: &mut Backoff,
    event_tx: &mpsc::UnboundedSender<ConnectionEvent>,
    write_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<Closed, Error> {
    let (ws_stream, _response) = connect_async(url).await?;
    let (mut ws_sink, mut ws_reader) = ws_stream.split();

    info!(url = %url, "connected to plugin server");
    backoff.reset();
    let _ = event_tx.send(ConnectionEvent::Connected);

    loop {
        tokio::select! {
            msg = ws_reader.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let _ = event_tx.send(ConnectionEvent::Frame(text.to_string()));
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        return Ok(Closed::ByServer);
                    },
                    Some(Ok(Message::Ping(data))) => {
                        ws_sink.send(Message::Pong(data)).await?;
                    },
                    Some(Ok(_)) => {},
                    Some(Err(e)) => {
                        return Err(Error::WebSocket(e));
                    },
                }
            },
            json = write_rx.recv() => {
                match json {
                    Some(text) => {
                        ws_sink.send(Message::Text(text.into())).await?;
                    },
                    None => {
                        let _ = ws_sink.send(Message::Close(None)).await;
                        return Ok(Closed::ByApp);
                    },
                }
            },
        }
    }
}
