//! Configuration loading for the display host.
//!
//! Config files: `marquee.toml`, `marquee.yaml`, `marquee.yml` or `marquee.json`.
//! Searched in `./` then `~/.config/marquee/`.

pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{config_dir, discover_and_load, find_config_file_in, load_config},
    schema::{ConnectionConfig, DisplayConfig, MarqueeConfig, UiConfig},
};
