//! Diagnostic logging for package diagram processing
//!
//! Everything in this crate reports through `tracing`. Non-fatal problems
//! found while loading a package file (a dependency naming a class that no
//! longer exists, say) and failed print jobs are logged instead of aborting
//! the operation, so installing a subscriber is how a caller sees them.
//!
//! ```rust,no_run
//! use pkgdiagram::core::logging::init_logging;
//!
//! init_logging(Some("debug"), Some("json")).unwrap();
//! ```
//!
//! # Environment Variables
//!
//! - `PKGDIAGRAM_LOG_LEVEL`: level or `EnvFilter` directives used when no
//!   level is passed in
//! - `RUST_LOG`: consulted after `PKGDIAGRAM_LOG_LEVEL`, e.g.
//!   `RUST_LOG="info,pkgdiagram::print=trace"`
//! - `PKGDIAGRAM_LOG_FORMAT`: `compact`, `pretty` or `json`

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

pub const LEVEL_ENV: &str = "PKGDIAGRAM_LOG_LEVEL";
pub const FORMAT_ENV: &str = "PKGDIAGRAM_LOG_FORMAT";
const DEFAULT_LEVEL: &str = "info";

/// Output shape of log lines, all written to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One line per event, no source locations
    #[default]
    Compact,
    /// Multi-line with colours, span entry/exit and source locations
    Pretty,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }

    fn layer(self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let base = tracing_subscriber::fmt::layer::<Registry>()
            .with_writer(std::io::stderr)
            .with_level(true);
        match self {
            LogFormat::Compact => Box::new(
                base.with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_span_events(FmtSpan::NONE),
            ),
            LogFormat::Pretty => Box::new(
                base.with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::ACTIVE)
                    .pretty(),
            ),
            LogFormat::Json => Box::new(
                base.with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::ACTIVE)
                    .json(),
            ),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!(
                "Unknown log format: {} (expected one of {})",
                s,
                Self::variants().join(", ")
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Filter directives and format after applying the fallbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub directives: String,
    pub format: LogFormat,
}

impl LogSettings {
    /// Resolve against the process environment
    pub fn resolve(level: Option<&str>, format: Option<&str>) -> Result<Self, String> {
        Self::resolve_with(level, format, |key| std::env::var(key).ok())
    }

    /// Resolve with `lookup` standing in for the environment
    ///
    /// The level falls back to `PKGDIAGRAM_LOG_LEVEL`, `RUST_LOG`, then
    /// `info`; the format to `PKGDIAGRAM_LOG_FORMAT`, then compact. Only an
    /// unknown format is an error.
    pub fn resolve_with(
        level: Option<&str>,
        format: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let directives = level
            .map(str::to_string)
            .or_else(|| lookup(LEVEL_ENV))
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
        let format = match format.map(str::to_string).or_else(|| lookup(FORMAT_ENV)) {
            Some(name) => name.parse()?,
            None => LogFormat::default(),
        };
        Ok(Self { directives, format })
    }

    /// Directives that fail to parse fall back to `info`
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    }
}

/// Install the global subscriber
///
/// Returns an error for an unknown format or when a global subscriber is
/// already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings =
        LogSettings::resolve(level, format).map_err(|e| format!("Invalid log format: {}", e))?;

    Registry::default()
        .with(settings.format.layer())
        .with(settings.filter())
        .try_init()?;
    Ok(())
}

pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}
