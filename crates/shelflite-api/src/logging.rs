//! Logging setup for applications embedding ShelfLite
//!
//! The store itself only emits `tracing` events. Call [`LogConfig::init`]
//! once at startup to route them to stdout, a daily-rolling file, or both.

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// Level used when the configured one does not parse
pub const FALLBACK_LEVEL: &str = "info";

/// File name used when a log path has none
pub const DEFAULT_LOG_FILE: &str = "shelflite.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    /// Output to stdout
    Stdout,
    /// Output to a daily-rolling file
    File(PathBuf),
    /// Output to both stdout and file
    Both(PathBuf),
}

impl LogOutput {
    fn writes_stdout(&self) -> bool {
        matches!(self, LogOutput::Stdout | LogOutput::Both(_))
    }

    fn file(&self) -> Option<&Path> {
        match self {
            LogOutput::Stdout => None,
            LogOutput::File(path) | LogOutput::Both(path) => Some(path),
        }
    }
}

/// Log format style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-readable
    Pretty,
    /// Single line per event
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive, e.g. `"info"` or `"shelflite_storage=debug"`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Output destination
    pub output: LogOutput,
    /// Format style
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: FALLBACK_LEVEL.to_string(),
            output: LogOutput::Stdout,
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Info level to stdout
    pub fn info() -> Self {
        Self::default()
    }

    /// Debug level to stdout, which includes one event per mutation
    pub fn debug() -> Self {
        Self::default().with_level("debug")
    }

    /// Warn level to stdout
    pub fn warn() -> Self {
        Self::default().with_level("warn")
    }

    /// Set log output to a daily-rolling file
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::File(path.into());
        self
    }

    /// Set log output to both stdout and a file
    pub fn with_both<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::Both(path.into());
        self
    }

    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set log level filter
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
    }

    /// Installs the global subscriber.
    ///
    /// When logging to a file, the returned guard owns the background
    /// writer; keep it alive for as long as events should be written.
    /// Fails if a global subscriber is already installed.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use shelflite::logging::LogConfig;
    ///
    /// let _guard = LogConfig::info().with_both("logs/shop.log").init()?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn init(self) -> Result<Option<WorkerGuard>, TryInitError> {
        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = None;

        if self.output.writes_stdout() {
            layers.push(fmt_layer(self.format, std::io::stdout, true));
        }

        if let Some(path) = self.output.file() {
            let (dir, file_name) = split_log_path(path);
            let appender = tracing_appender::rolling::daily(dir, file_name);
            let (writer, worker) = tracing_appender::non_blocking(appender);
            layers.push(fmt_layer(self.format, writer, false));
            guard = Some(worker);
        }

        tracing_subscriber::registry()
            .with(layers)
            .with(self.env_filter())
            .try_init()?;

        Ok(guard)
    }
}

fn fmt_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
    match format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

fn split_log_path(path: &Path) -> (&Path, &str) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_LOG_FILE);
    (dir, file_name)
}
