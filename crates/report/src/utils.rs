use anyhow::Error;
use clap::Parser;
use metar_report_core::{
    find_config_file, load_config, ConfigSource, PaletteConfig, DEFAULT_FEED_URL,
    DEFAULT_TIMEOUT_SECS,
};
use slog::{o, Drain, Level, Logger};
use std::{env, time::Duration};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "METAR report - prints current conditions for a list of stations"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $METAR_REPORT_CONFIG, ./metar-report.toml,
    /// $XDG_CONFIG_HOME/metar-report/metar-report.toml, /etc/metar-report/metar-report.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Station identifiers to report on, e.g. KSEA KPDX
    #[arg(env = "METAR_REPORT_STATIONS", value_delimiter = ',')]
    #[serde(default)]
    pub stations: Vec<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "METAR_REPORT_LEVEL")]
    pub level: Option<String>,

    /// METAR endpoint, stations are sent as the `ids` query parameter
    #[arg(short, long, env = "METAR_REPORT_FEED_URL")]
    pub feed_url: Option<String>,

    /// HTTP User-Agent header for feed requests
    #[arg(short, long, env = "METAR_REPORT_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long, env = "METAR_REPORT_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Print the report without terminal colors
    #[arg(long, env = "METAR_REPORT_NO_COLOR")]
    #[serde(default)]
    pub no_color: bool,

    /// Palette overrides, only read from the `[colors]` table of the config file
    #[arg(skip)]
    pub colors: Option<PaletteConfig>,
}

impl Cli {
    pub fn feed_url(&self) -> String {
        self.feed_url
            .clone()
            .unwrap_or_else(|| DEFAULT_FEED_URL.to_string())
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("metar-report/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Layers these (command line) values over values read from a config file.
    pub fn merge(self, file_config: Cli) -> Cli {
        Cli {
            config: self.config,
            stations: if self.stations.is_empty() {
                file_config.stations
            } else {
                self.stations
            },
            level: self.level.or(file_config.level),
            feed_url: self.feed_url.or(file_config.feed_url),
            user_agent: self.user_agent.or(file_config.user_agent),
            timeout_secs: self.timeout_secs.or(file_config.timeout_secs),
            no_color: self.no_color || file_config.no_color,
            colors: file_config.colors,
        }
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Result<Cli, Error> {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("METAR_REPORT_CONFIG", "metar-report.toml")
    };

    // env vars are handled by clap
    let file_config: Cli = load_config(&source)?;
    Ok(cli_args.merge(file_config))
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "info" => Level::Info,
        "warn" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

pub fn setup_logger(cli: &Cli) -> Logger {
    let log_level = match cli.level.as_ref() {
        Some(level) => parse_level(level),
        None => parse_level(&env::var("RUST_LOG").unwrap_or_default()),
    };

    // the report itself goes to stdout
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(log_level).fuse();
    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}
