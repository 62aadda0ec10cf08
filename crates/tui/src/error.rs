/// Errors specific to the terminal display host.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] marquee_protocol::Error),
}
