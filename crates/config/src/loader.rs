use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    schema::MarqueeConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "marquee.toml",
    "marquee.yaml",
    "marquee.yml",
    "marquee.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<MarqueeConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./marquee.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/marquee/marquee.{toml,yaml,yml,json}` (user-global)
///
/// Returns `MarqueeConfig::default()` if no config file is found or the one
/// found cannot be parsed.
pub fn discover_and_load() -> MarqueeConfig {
    let found = find_config_file_in(Path::new(".")).or_else(|| {
        config_dir().and_then(|dir| find_config_file_in(&dir))
    });

    let Some(path) = found else {
        debug!("no config file found, using defaults");
        return MarqueeConfig::default();
    };

    debug!(path = %path.display(), "loading config");
    match load_config(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            MarqueeConfig::default()
        },
    }
}

/// Find the first standard config file name present in `dir`.
pub fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/marquee/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "marquee").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> Result<MarqueeConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        other => Err(Error::UnsupportedFormat(other.to_owned())),
    }
}
