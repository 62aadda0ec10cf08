//! Config schema for the display host.
use {
    serde::{Deserialize, Serialize},
    std::time::Duration,
};

/// Plugin server address used when nothing else is configured.
pub const DEFAULT_HOST: &str = "localhost:3012";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarqueeConfig {
    pub display: DisplayConfig,
    pub connection: ConnectionConfig,
    pub ui: UiConfig,
}

impl MarqueeConfig {
    /// Render the config as pretty TOML.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Where the plugin server lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// `host[:port]` of the plugin server. Used for the channel URL
    /// (`ws://<host>`) and to absolutize plugin script paths (`http://<host>`).
    pub host: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
        }
    }
}

/// Reconnect behaviour of the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// First reconnect delay. Defaults to 1000 ms.
    pub initial_backoff_ms: u64,
    /// Upper bound for the exponential backoff. Defaults to 5000 ms.
    pub max_backoff_ms: u64,
}

impl ConnectionConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms.max(1))
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms.max(self.initial_backoff_ms).max(1))
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 1_000,
            max_backoff_ms: 5_000,
        }
    }
}

/// Terminal UI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Redraw tick. Defaults to 250 ms.
    pub tick_ms: u64,
    /// Messages kept per rendered plugin inbox.
    pub inbox_capacity: usize,
}

impl UiConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(10))
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: 250,
            inbox_capacity: 50,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_server() {
        let cfg = MarqueeConfig::default();
        assert_eq!(cfg.display.host, "localhost:3012");
        assert_eq!(cfg.connection.initial_backoff(), Duration::from_secs(1));
        assert_eq!(cfg.connection.max_backoff(), Duration::from_secs(5));
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let cfg: MarqueeConfig = toml::from_str(
            r#"
            [display]
            host = "10.0.0.7:8080"

            [ui]
            inbox_capacity = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.display.host, "10.0.0.7:8080");
        assert_eq!(cfg.ui.inbox_capacity, 5);
        assert_eq!(cfg.ui.tick_ms, 250);
        assert_eq!(cfg.connection, ConnectionConfig::default());
    }

    #[test]
    fn max_backoff_never_below_initial() {
        let cfg = ConnectionConfig {
            initial_backoff_ms: 3_000,
            max_backoff_ms: 100,
        };
        assert_eq!(cfg.max_backoff(), Duration::from_secs(3));
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = MarqueeConfig::default();
        let text = cfg.to_toml().unwrap();
        let back: MarqueeConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }
}
