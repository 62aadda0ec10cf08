use thiserror::Error;

/// Errors raised by the display core.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid plugin server host `{host}`: {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no enabled plugin named `{0}`")]
    UnknownPlugin(String),
}

/// A plugin descriptor that cannot enter the registry.
///
/// Rejection is per descriptor: the rest of a batch is still applied.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("malformed plugin descriptor{}: {source}", plugin_suffix(.plugin))]
    Malformed {
        plugin: Option<String>,
        #[source]
        source: serde_json::Error,
    },

    #[error("plugin `{plugin}` has no `enabled` config entry")]
    MissingEnabled { plugin: String },

    #[error("plugin `{plugin}`: `enabled` config does not hold a boolean")]
    EnabledNotBoolean { plugin: String },

    #[error("plugin `{plugin}` declares config `{config}` more than once")]
    DuplicateConfig { plugin: String, config: String },

    #[error(
        "plugin `{plugin}`: config `{config}` is declared `{declared}` but holds a {found}"
    )]
    TypeMismatch {
        plugin: String,
        config: String,
        declared: String,
        found: &'static str,
    },

    #[error("plugin `{plugin}`: cannot resolve script url `{url}`: {source}")]
    ScriptUrl {
        plugin: String,
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl DescriptorError {
    /// Name of the offending plugin, when it could be read.
    pub fn plugin(&self) -> Option<&str> {
        match self {
            Self::Malformed { plugin, .. } => plugin.as_deref(),
            Self::MissingEnabled { plugin }
            | Self::EnabledNotBoolean { plugin }
            | Self::DuplicateConfig { plugin, .. }
            | Self::TypeMismatch { plugin, .. }
            | Self::ScriptUrl { plugin, .. } => Some(plugin),
        }
    }
}

fn plugin_suffix(plugin: &Option<String>) -> String {
    plugin
        .as_deref()
        .map(|name| format!(" `{name}`"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;
