use {
    anyhow::Result,
    clap::Subcommand,
    marquee_config::MarqueeConfig,
    std::path::{Path, PathBuf},
};

#[derive(Subcommand, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the resolved configuration as TOML (default).
    #[default]
    Show,
    /// Print where a config file was found, if any.
    Path,
}

/// `explicit` is the `--config` path, which wins over discovery.
pub fn handle_config(
    action: ConfigAction,
    config: &MarqueeConfig,
    explicit: Option<&Path>,
) -> Result<()> {
    match action {
        ConfigAction::Show => print!("{}", config.to_toml()?),
        ConfigAction::Path => match located_config(explicit) {
            Some(path) => println!("{}", path.display()),
            None => eprintln!("No config file found; using defaults."),
        },
    }
    Ok(())
}

fn located_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let cwd = std::env::current_dir().ok()?;
    marquee_config::find_config_file_in(&cwd)
        .or_else(|| marquee_config::config_dir().and_then(|d| marquee_config::find_config_file_in(&d)))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins_over_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[display]\nhost = \"h:1\"\n").unwrap();

        assert_eq!(located_config(Some(&path)), Some(path.clone()));
    }
}
