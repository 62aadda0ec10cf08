//! Typed, normalized plugin descriptors.
//!
//! Wire descriptors from [`marquee_protocol::PluginDescriptor`] are checked and
//! converted here: config values are matched against their declared kind,
//! `enabled` is derived from the `enabled` config entry and the script url is
//! made absolute against the plugin server.

use {
    crate::error::{DescriptorError, Error, Result},
    marquee_protocol::{ConfigEntry, ENABLED_CONFIG, PluginDescriptor, ScriptSource},
    serde_json::{Number, Value},
    std::collections::HashSet,
    url::Url,
};

// ── Host address ─────────────────────────────────────────────────────────────

/// The plugin server's `host[:port]`, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAddress {
    host: String,
    http_base: Url,
}

impl HostAddress {
    pub fn parse(host: &str) -> Result<Self> {
        let host = host.trim().trim_end_matches('/').to_owned();
        let http_base = Url::parse(&format!("http://{host}/")).map_err(|source| {
            Error::InvalidHost {
                host: host.clone(),
                source,
            }
        })?;
        Ok(Self { host, http_base })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// WebSocket URL of the control channel.
    pub fn channel_url(&self) -> String {
        format!("ws://{}", self.host)
    }

    /// Resolve a script reference against the server. Absolute URLs are kept.
    pub fn resolve(&self, reference: &str) -> std::result::Result<String, url::ParseError> {
        self.http_base.join(reference).map(String::from)
    }
}

// ── Config values ────────────────────────────────────────────────────────────

/// Value kind implied by a config's declared `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Bool,
    Number,
    Text,
    /// Unrecognized tag: any scalar is accepted.
    Any,
}

impl ConfigKind {
    pub fn from_declared(declared: &str) -> Self {
        match declared.to_ascii_lowercase().as_str() {
            "checkbox" | "boolean" | "bool" | "toggle" => Self::Bool,
            "number" | "range" | "integer" | "float" => Self::Number,
            "text" | "string" | "textarea" | "color" | "password" | "url" | "email" | "date"
            | "time" => Self::Text,
            _ => Self::Any,
        }
    }
}

/// A config value checked against its declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl ConfigValue {
    /// Convert a JSON value, failing with the JSON kind actually found when it
    /// does not match `kind`.
    fn from_json(kind: ConfigKind, value: Value) -> std::result::Result<Self, &'static str> {
        match (kind, value) {
            (_, Value::Null) => Ok(Self::Null),
            (ConfigKind::Bool, Value::Bool(b)) => Ok(Self::Bool(b)),
            (ConfigKind::Number, Value::Number(n)) => Ok(Self::Number(n)),
            (ConfigKind::Text, Value::String(s)) => Ok(Self::Text(s)),
            (ConfigKind::Any, Value::Bool(b)) => Ok(Self::Bool(b)),
            (ConfigKind::Any, Value::Number(n)) => Ok(Self::Number(n)),
            (ConfigKind::Any, Value::String(s)) => Ok(Self::Text(s)),
            (_, other) => Err(json_kind(&other)),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String form used for element attributes. `Null` has none.
    pub fn display(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(number_attribute(n)),
            Self::Text(s) => Some(s.clone()),
        }
    }
}

/// Integral floats print without a fractional part, so `1.0` becomes `"1"`.
fn number_attribute(n: &Number) -> String {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_EXACT => {
            format!("{f:.0}")
        },
        _ => n.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One configurable parameter of a plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub name: String,
    /// Declared type tag, as sent by the server.
    pub declared: String,
    pub value: ConfigValue,
    pub default: ConfigValue,
}

impl Config {
    fn from_entry(plugin: &str, entry: ConfigEntry) -> std::result::Result<Self, DescriptorError> {
        let kind = ConfigKind::from_declared(&entry.kind);
        let mismatch = |found| DescriptorError::TypeMismatch {
            plugin: plugin.to_owned(),
            config: entry.name.clone(),
            declared: entry.kind.clone(),
            found,
        };

        let default = ConfigValue::from_json(kind, entry.default.clone()).map_err(mismatch)?;
        let value = match entry.value.clone() {
            // The server fills a missing value from the default.
            None => default.clone(),
            Some(raw) => ConfigValue::from_json(kind, raw).map_err(mismatch)?,
        };

        Ok(Self {
            name: entry.name,
            declared: entry.kind,
            value,
            default,
        })
    }

    /// Attribute to set on the rendered element, if this config produces one.
    pub fn attribute(&self) -> Option<(&str, String)> {
        if self.name == ENABLED_CONFIG {
            return None;
        }
        self.value.display().map(|v| (self.name.as_str(), v))
    }
}

// ── Plugins ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    pub url: Option<String>,
    pub inline: Option<String>,
}

impl From<ScriptSource> for Script {
    fn from(source: ScriptSource) -> Self {
        Self {
            url: source.url,
            inline: source.inline,
        }
    }
}

/// A normalized plugin descriptor.
///
/// `enabled` always mirrors the `enabled` config entry and `script.url` is
/// absolute. Equality is structural over every field.
#[derive(Debug, Clone, PartialEq)]
pub struct Plugin {
    pub name: String,
    pub version: String,
    pub enabled: bool,
    pub description: Option<String>,
    pub url: Option<String>,
    pub configs: Vec<Config>,
    pub script: Script,
    pub background_script: Option<Script>,
}

impl Plugin {
    /// Validate and normalize a raw JSON descriptor.
    pub fn from_value(value: Value, host: &HostAddress) -> std::result::Result<Self, DescriptorError> {
        let plugin = value
            .get("name")
            .and_then(Value::as_str)
            .map(String::from);
        let descriptor: PluginDescriptor = serde_json::from_value(value)
            .map_err(|source| DescriptorError::Malformed { plugin, source })?;
        Self::from_descriptor(descriptor, host)
    }

    pub fn from_descriptor(
        descriptor: PluginDescriptor,
        host: &HostAddress,
    ) -> std::result::Result<Self, DescriptorError> {
        let name = descriptor.name;

        let mut seen = HashSet::new();
        let mut configs = Vec::with_capacity(descriptor.configs.len());
        for entry in descriptor.configs {
            if !seen.insert(entry.name.clone()) {
                return Err(DescriptorError::DuplicateConfig {
                    plugin: name,
                    config: entry.name,
                });
            }
            configs.push(Config::from_entry(&name, entry)?);
        }

        let enabled_config = configs
            .iter()
            .find(|c| c.name == ENABLED_CONFIG)
            .ok_or_else(|| DescriptorError::MissingEnabled {
                plugin: name.clone(),
            })?;
        let effective = match &enabled_config.value {
            ConfigValue::Null => &enabled_config.default,
            value => value,
        };
        let enabled = effective
            .as_bool()
            .ok_or_else(|| DescriptorError::EnabledNotBoolean {
                plugin: name.clone(),
            })?;

        let mut script = Script::from(descriptor.script);
        if let Some(reference) = script.url.take() {
            let absolute = host
                .resolve(&reference)
                .map_err(|source| DescriptorError::ScriptUrl {
                    plugin: name.clone(),
                    url: reference,
                    source,
                })?;
            script.url = Some(absolute);
        }

        Ok(Self {
            name,
            version: descriptor.version,
            enabled,
            description: descriptor.description,
            url: descriptor.url,
            configs,
            script,
            background_script: descriptor.background_script.map(Script::from),
        })
    }

    /// Element attributes: every non-`enabled`, non-null config in order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.configs.iter().filter_map(Config::attribute)
    }

    /// Whether the rendered instance gets send/subscribe wiring.
    pub fn has_background(&self) -> bool {
        self.background_script
            .as_ref()
            .is_some_and(|s| s.url.is_some())
    }

    pub fn config(&self, name: &str) -> Option<&Config> {
        self.configs.iter().find(|c| c.name == name)
    }

    /// Identity comparison, independent of configuration.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
