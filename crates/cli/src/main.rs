mod config_commands;

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    marquee_config::MarqueeConfig,
    marquee_display::HostAddress,
    std::{fs::OpenOptions, path::PathBuf, sync::Mutex},
    tracing::info,
    tracing_subscriber::{
        EnvFilter,
        fmt::{self, writer::BoxMakeWriter},
        layer::SubscriberExt,
        util::SubscriberInitExt,
    },
};

#[derive(Parser)]
#[command(name = "marquee", about = "Marquee: plugin display host", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Plugin server `host[:port]` (overrides config value).
    #[arg(long, global = true, env = "MARQUEE_HOST")]
    host: Option<String>,

    /// Config file to load instead of searching the default locations.
    #[arg(long, global = true, env = "MARQUEE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Write logs to this file. The terminal UI discards logs otherwise.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal display (default when no subcommand is provided).
    Tui,
    /// Connect and log every surface operation instead of drawing.
    Headless,
    /// Configuration inspection.
    Config {
        #[command(subcommand)]
        action: Option<config_commands::ConfigAction>,
    },
}

/// Where log output goes for the chosen command.
fn log_writer(cli: &Cli) -> anyhow::Result<Option<BoxMakeWriter>> {
    if let Some(path) = &cli.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        return Ok(Some(BoxMakeWriter::new(Mutex::new(file))));
    }
    match cli.command {
        // The terminal UI owns stdout.
        None | Some(Commands::Tui) => Ok(None),
        Some(_) => Ok(Some(BoxMakeWriter::new(std::io::stderr))),
    }
}

fn init_telemetry(cli: &Cli, writer: BoxMakeWriter) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    let ansi = cli.log_file.is_none();

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(writer),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .init();
    }
}

/// Load the config file and apply CLI/env overrides.
fn resolve_config(cli: &Cli) -> anyhow::Result<MarqueeConfig> {
    let mut config = match &cli.config {
        Some(path) => marquee_config::load_config(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => marquee_config::discover_and_load(),
    };
    if let Some(host) = &cli.host {
        config.display.host = host.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(writer) = log_writer(&cli)? {
        init_telemetry(&cli, writer);
    }

    let config = resolve_config(&cli)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.display.host,
        "marquee starting"
    );

    match cli.command {
        None | Some(Commands::Tui) => {
            let host = HostAddress::parse(&config.display.host)?;
            marquee_tui::run_tui(&config, host).await?;
        },
        Some(Commands::Headless) => {
            let host = HostAddress::parse(&config.display.host)?;
            marquee_tui::run_headless(&config, host).await?;
        },
        Some(Commands::Config { action }) => {
            config_commands::handle_config(
                action.unwrap_or_default(),
                &config,
                cli.config.as_deref(),
            )?;
        },
    }

    Ok(())
}
