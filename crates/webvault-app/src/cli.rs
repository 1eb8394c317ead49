use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;
use webvault_cache::CacheConfig;
use webvault_core::{RelatedOptions, Strategy};
use webvault_telemetry::LogFormat;

pub const CATALOG_ENV: &str = "WEBVAULT_CATALOG";
pub const LOG_FORMAT_ENV: &str = "WEBVAULT_LOG_FORMAT";
pub const PREFERENCES_DIR_ENV: &str = "WEBVAULT_PREFERENCES_DIR";
pub const CACHE_CAPACITY_ENV: &str = "WEBVAULT_CACHE_CAPACITY";
pub const CACHE_TTL_ENV: &str = "WEBVAULT_CACHE_TTL_SECS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Text => write!(f, "text"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Category,
    Tags,
    Content,
    Mixed,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Category => Strategy::Category,
            StrategyArg::Tags => Strategy::Tags,
            StrategyArg::Content => Strategy::Content,
            StrategyArg::Mixed => Strategy::Mixed,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "webvault", about = "Resolve website details from a WebVault catalog")]
pub struct Cli {
    /// JSON array of catalog records. The built-in demo catalog is used if unset.
    #[arg(long, global = true, env = CATALOG_ENV)]
    pub catalog: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Text
    )]
    pub log_format: LogFormatArg,

    /// Directory for persisted view preferences. Kept in memory if unset.
    #[arg(long, global = true, env = PREFERENCES_DIR_ENV)]
    pub preferences_dir: Option<PathBuf>,

    #[arg(long, global = true, env = CACHE_CAPACITY_ENV)]
    pub cache_capacity: Option<u64>,

    #[arg(long, global = true, env = CACHE_TTL_ENV)]
    pub cache_ttl_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::builder()
            .max_capacity_opt(self.cache_capacity)
            .ttl_opt(self.cache_ttl_secs.map(Duration::from_secs))
            .build()
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the resolved website detail.
    Show { id: String },
    /// Print websites related to a website.
    Related {
        id: String,
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        min_score: Option<f64>,
        #[arg(long)]
        include_ads: bool,
        #[arg(long)]
        include_self: bool,
    },
    /// Record one visit to a website.
    Visit { id: String },
    /// Load a detail page and print its final state.
    Page {
        id: String,
        /// Also record a visit during the page session.
        #[arg(long)]
        visit: bool,
    },
}

/// Builds related options from command-line flags, defaulting the rest.
pub fn related_options(
    strategy: Option<StrategyArg>,
    limit: Option<usize>,
    min_score: Option<f64>,
    include_ads: bool,
    include_self: bool,
) -> RelatedOptions {
    let defaults = RelatedOptions::default();
    RelatedOptions {
        strategy: strategy.map(Into::into).unwrap_or(defaults.strategy),
        limit: limit.unwrap_or(defaults.limit),
        exclude_self: !include_self,
        min_score: min_score.unwrap_or(defaults.min_score),
        include_ads,
    }
}
