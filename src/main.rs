// mmf_bluescreen - main.rs
// Emit one record through a configured blue-screen handler and print the outcome

use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use serde_json::Value;

use mmf_bluescreen::config::default_logs_root;
use mmf_bluescreen::config_loader::load_settings;
use mmf_bluescreen::containment::install_quiet_panic_hook;
use mmf_bluescreen::contributor::{info_fn, InfoItem, PanelCatalog};
use mmf_bluescreen::errors::BlueScreenResult;
use mmf_bluescreen::factory::BlueScreenFactory;
use mmf_bluescreen::handler::HandleOutcome;
use mmf_bluescreen::log_sink::{LogLevel, LogRecord};
use mmf_bluescreen::renderer::RenderFormat;

#[derive(Parser)]
#[command(
    name = "mmf_bluescreen",
    version,
    about = "Write a blue-screen snapshot for a log record"
)]
struct Cli {
    /// TOML settings file (defaults to ./bluescreen.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Logs root; snapshots go to <logs-dir>/logs unless log_directory is set
    #[arg(long)]
    logs_dir: Option<PathBuf>,

    /// Record message
    #[arg(short, long, default_value = "manual blue screen")]
    message: String,

    /// Record level, by name or code
    #[arg(short, long, default_value = "error")]
    level: String,

    /// Record channel
    #[arg(long, default_value = "cli")]
    channel: String,

    /// Override the configured output format (html or json)
    #[arg(long)]
    format: Option<String>,

    /// key=value pairs added to the record context
    #[arg(long = "context", value_name = "KEY=VALUE")]
    context: Vec<String>,

    /// Print handler diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: Cli) -> BlueScreenResult<HandleOutcome> {
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(format) = &cli.format {
        settings.format = Some(format.parse::<RenderFormat>()?);
    }

    let logs_root = cli.logs_dir.clone().unwrap_or_else(default_logs_root);
    let config = settings.resolve(&logs_root)?;

    let mut factory = BlueScreenFactory::from_settings(&settings, &PanelCatalog::new())?;
    factory.register_info(info_fn("process", |_| {
        let cwd = std::env::current_dir()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        Ok(vec![
            InfoItem::new("pid", std::process::id().to_string()),
            InfoItem::new("cwd", cwd),
        ])
    }));
    let handler = factory.build(config)?;

    let mut record = LogRecord::new(cli.level.parse::<LogLevel>()?, cli.message).with_channel(cli.channel);
    for pair in &cli.context {
        let (key, value) = pair.split_once('=').unwrap_or((pair.as_str(), ""));
        record = record.with_context(key, Value::from(value));
    }

    Ok(handler.process(&record))
}

fn main() {
    let cli = Cli::parse();

    let max_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();
    install_quiet_panic_hook();

    match run(cli) {
        Ok(outcome) => match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to print outcome: {e}");
                exit(1);
            }
        },
        Err(e) => {
            eprintln!("Failed to configure blue screen handler: {e}");
            exit(1);
        }
    }
}
