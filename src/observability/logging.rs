//! Logging configuration and utilities.
//!
//! The client emits `tracing` events; applications decide where they go.
//! [`LoggingConfig::init`] installs a `tracing-subscriber` registry for
//! applications that do not configure one themselves.

use std::sync::OnceLock;

use regex::Regex;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Maximum number of body bytes written to a log event.
pub const MAX_LOGGED_BODY_LEN: usize = 1000;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// The minimum log level to capture
    pub level: LogLevel,
    /// The output format for log messages
    pub format: LogFormat,
    /// Whether to include the module target in log output
    pub include_target: bool,
    /// Whether to include file and line number in log output
    pub include_file_line: bool,
}

/// Log level enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Trace-level logging (most verbose)
    Trace,
    /// Debug-level logging
    Debug,
    /// Info-level logging
    Info,
    /// Warning-level logging
    Warn,
    /// Error-level logging (least verbose)
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl From<LogLevel> for tracing::level_filters::LevelFilter {
    fn from(level: LogLevel) -> Self {
        tracing::level_filters::LevelFilter::from_level(level.into())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors (for development)
    Pretty,
    /// JSON format (for structured logging in production)
    Json,
    /// Compact format (for space-constrained environments)
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            include_target: true,
            include_file_line: false,
        }
    }
}

impl LoggingConfig {
    /// Creates a new logging configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the log format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets whether to include the module target.
    pub fn with_target(mut self, include: bool) -> Self {
        self.include_target = include;
        self
    }

    /// Sets whether to include file and line number.
    pub fn with_file_line(mut self, include: bool) -> Self {
        self.include_file_line = include;
        self
    }

    /// Initialize logging with this configuration.
    ///
    /// `RUST_LOG` directives are honoured on top of the configured level.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber has already been installed.
    pub fn init(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let filter = EnvFilter::from_default_env()
            .add_directive(tracing::level_filters::LevelFilter::from(self.level).into());

        match self.format {
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(
                        fmt::layer()
                            .with_target(self.include_target)
                            .with_file(self.include_file_line)
                            .with_line_number(self.include_file_line),
                    )
                    .try_init()?;
            }
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json().with_target(self.include_target))
                    .try_init()?;
            }
            LogFormat::Compact => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact().with_target(self.include_target))
                    .try_init()?;
            }
        }

        Ok(())
    }
}

/// Field names whose values never reach the logs.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "access_token",
    "accessToken",
    "refreshToken",
    "client_secret",
    "key",
    "authorization",
    "Authorization",
];

fn sensitive_field_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            let names = SENSITIVE_FIELDS
                .iter()
                .map(|name| regex::escape(name))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r#""({})"\s*:\s*"(?:[^"\\]|\\.)*""#, names)).ok()
        })
        .as_ref()
}

/// Replaces the values of sensitive JSON string fields with `[REDACTED]`.
pub fn redact_sensitive(input: &str) -> String {
    match sensitive_field_pattern() {
        Some(pattern) => pattern
            .replace_all(input, r#""$1":"[REDACTED]""#)
            .into_owned(),
        None => "[REDACTED]".to_string(),
    }
}

fn truncate(body: &str) -> &str {
    if body.len() <= MAX_LOGGED_BODY_LEN {
        return body;
    }

    let mut end = MAX_LOGGED_BODY_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Redacts, then truncates, a body for logging.
fn sanitize(body: &str) -> String {
    truncate(&redact_sensitive(body)).to_string()
}

/// Log an outgoing HTTP request for debugging.
pub fn log_request(method: &str, path: &str, body: Option<&str>) {
    tracing::debug!(
        method = method,
        path = path,
        body = %body.map(sanitize).unwrap_or_else(|| "<empty>".to_string()),
        "Outgoing request"
    );
}

/// Log an incoming HTTP response for debugging.
pub fn log_response(status: u16, duration_ms: u64, body: Option<&str>) {
    tracing::debug!(
        status = status,
        duration_ms = duration_ms,
        body = %body.map(sanitize).unwrap_or_else(|| "<empty>".to_string()),
        "Incoming response"
    );
}
