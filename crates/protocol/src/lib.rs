//! Display channel protocol definitions.
//!
//! All communication uses JSON text frames over WebSocket, each one an
//! envelope of the shape `{"type": <kind>, "data": <payload>}`.
//!
//! Inbound (server → display): `listPlugins`, `addPlugin`, `configPlugin`,
//! `removePlugin`, `pluginMessage`, `error`, `broadcast`.
//! Outbound (display → server): `listPlugins` (no data), `pluginMessage`.

use {
    serde::{Deserialize, Deserializer, Serialize},
    serde_json::Value,
};

// ── Constants ────────────────────────────────────────────────────────────────

/// Name of the config entry that carries a plugin's enabled flag.
pub const ENABLED_CONFIG: &str = "enabled";

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed frame: {0}")]
    Frame(#[source] serde_json::Error),

    #[error("invalid `{kind}` payload: {source}")]
    Payload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

// ── Message types ────────────────────────────────────────────────────────────

/// Envelope discriminator. Unknown kinds are preserved so they can be logged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    ListPlugins,
    AddPlugin,
    ConfigPlugin,
    RemovePlugin,
    PluginMessage,
    Error,
    Broadcast,
    Unknown(String),
}

impl MessageType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ListPlugins => "listPlugins",
            Self::AddPlugin => "addPlugin",
            Self::ConfigPlugin => "configPlugin",
            Self::RemovePlugin => "removePlugin",
            Self::PluginMessage => "pluginMessage",
            Self::Error => "error",
            Self::Broadcast => "broadcast",
            Self::Unknown(other) => other,
        }
    }
}

impl From<String> for MessageType {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "listPlugins" => Self::ListPlugins,
            "addPlugin" => Self::AddPlugin,
            "configPlugin" => Self::ConfigPlugin,
            "removePlugin" => Self::RemovePlugin,
            "pluginMessage" => Self::PluginMessage,
            "error" => Self::Error,
            "broadcast" => Self::Broadcast,
            _ => Self::Unknown(kind),
        }
    }
}

impl From<MessageType> for String {
    fn from(kind: MessageType) -> Self {
        match kind {
            MessageType::Unknown(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Envelope ─────────────────────────────────────────────────────────────────

/// A single protocol frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl Envelope {
    pub fn new(kind: MessageType, data: Value) -> Self {
        Self { kind, data }
    }

    /// Request for the authoritative plugin set, sent once per connection.
    pub fn list_plugins() -> Self {
        Self::new(MessageType::ListPlugins, Value::Null)
    }

    /// Message sent on behalf of a rendered plugin instance.
    pub fn plugin_message(name: impl Into<String>, mesg: Value) -> Self {
        let data = serde_json::json!({ "name": name.into(), "mesg": mesg });
        Self::new(MessageType::PluginMessage, data)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Frame)
    }
}

// ── Payloads ─────────────────────────────────────────────────────────────────

/// Payload of `removePlugin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovePlugin {
    pub name: String,
}

/// Payload of `pluginMessage` in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginMessage {
    pub name: String,
    #[serde(default)]
    pub mesg: Value,
}

/// Location of a plugin script: a URL path on the server or inline source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,
}

/// A config entry exactly as it appears on the wire.
///
/// `value` distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(Value::Null)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    #[serde(default)]
    pub default: Value,
}

/// A plugin descriptor exactly as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    pub name: String,
    pub version: String,
    /// Informational only; the `enabled` config entry is authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub configs: Vec<ConfigEntry>,
    pub script: ScriptSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_script: Option<ScriptSource>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

// ── Inbound events ───────────────────────────────────────────────────────────

/// A decoded inbound envelope.
///
/// Plugin descriptors stay as raw JSON so that each one can be validated
/// (and rejected) on its own.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    ListPlugins(Vec<Value>),
    AddPlugin(Value),
    ConfigPlugin(Value),
    RemovePlugin(RemovePlugin),
    PluginMessage(PluginMessage),
    Error(Value),
    Broadcast(Value),
    Unknown { kind: String, data: Value },
}

impl InboundEvent {
    /// Parse a text frame into an event.
    pub fn parse(text: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(text).map_err(Error::Frame)?;
        Self::try_from(envelope)
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::ListPlugins(_) => "listPlugins",
            Self::AddPlugin(_) => "addPlugin",
            Self::ConfigPlugin(_) => "configPlugin",
            Self::RemovePlugin(_) => "removePlugin",
            Self::PluginMessage(_) => "pluginMessage",
            Self::Error(_) => "error",
            Self::Broadcast(_) => "broadcast",
            Self::Unknown { kind, .. } => kind,
        }
    }
}

impl TryFrom<Envelope> for InboundEvent {
    type Error = Error;

    fn try_from(envelope: Envelope) -> Result<Self> {
        let Envelope { kind, data } = envelope;
        let event = match kind {
            MessageType::ListPlugins => Self::ListPlugins(payload("listPlugins", data)?),
            MessageType::AddPlugin => Self::AddPlugin(data),
            MessageType::ConfigPlugin => Self::ConfigPlugin(data),
            MessageType::RemovePlugin => Self::RemovePlugin(payload("removePlugin", data)?),
            MessageType::PluginMessage => Self::PluginMessage(payload("pluginMessage", data)?),
            MessageType::Error => Self::Error(data),
            MessageType::Broadcast => Self::Broadcast(data),
            MessageType::Unknown(kind) => Self::Unknown { kind, data },
        };
        Ok(event)
    }
}

fn payload<T: serde::de::DeserializeOwned>(kind: &'static str, data: Value) -> Result<T> {
    serde_json::from_value(data).map_err(|source| Error::Payload { kind, source })
}
