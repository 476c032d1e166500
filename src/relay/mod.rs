//! Log/progress relay.
//!
//! Pipeline code reports progress through a [`Relay`], which timestamps each message, hands it to
//! an injected [`EventSink`] and mirrors it into `tracing`. Consumers (the CLI, tests, a UI) pick
//! the sink; the pipeline never knows where events end up.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// `tracing` target of records mirrored from a [`Relay`].
pub const RELAY_TARGET: &str = "slidecast::relay";

/// Severity of a [`LogEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Normal progress.
    #[default]
    Info,
    /// Recoverable problem (e.g. a skipped image).
    Warn,
    /// A folder or batch failed.
    Error,
}

impl LogLevel {
    /// Upper-case label used when printing events.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Matching `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }

    fn filter_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One relayed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Severity.
    pub level: LogLevel,
    /// Human-readable text.
    pub message: String,
    /// Time the event was emitted.
    pub timestamp: DateTime<Utc>,
}

impl LogEvent {
    /// Event stamped with the current time.
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Display for LogEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.level,
            self.message
        )
    }
}

/// Destination for relayed events. Must be append-only and preserve call order.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn emit(&self, event: LogEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: LogEvent) {}
}

/// Forwards events into an unbounded channel.
///
/// Events emitted after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<LogEvent>,
}

impl ChannelSink {
    /// Wrap an existing sender.
    pub fn new(tx: mpsc::Sender<LogEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink together with the receiving end.
    pub fn channel() -> (Self, mpsc::Receiver<LogEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: LogEvent) {
        let _ = self.tx.send(event);
    }
}

/// Collects events in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of collected events in emission order.
    pub fn events(&self) -> Vec<LogEvent> {
        match self.events.lock() {
            Ok(e) => e.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages of collected events in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: LogEvent) {
        match self.events.lock() {
            Ok(mut e) => e.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// Handle used by pipeline code to report progress.
///
/// Cheap to clone; clones share the sink.
#[derive(Clone)]
pub struct Relay {
    sink: Arc<dyn EventSink>,
    scope: Option<String>,
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay").field("scope", &self.scope).finish()
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new(NullSink)
    }
}

impl Relay {
    /// Relay delivering to `sink`.
    pub fn new(sink: impl EventSink + 'static) -> Self {
        Self::from_arc(Arc::new(sink))
    }

    /// Relay delivering to an already shared sink.
    pub fn from_arc(sink: Arc<dyn EventSink>) -> Self {
        Self { sink, scope: None }
    }

    /// Same sink, with `scope` attached to the mirrored `tracing` records.
    pub fn scoped(&self, scope: impl Into<String>) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            scope: Some(scope.into()),
        }
    }

    /// Scope attached by [`Relay::scoped`], if any.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Emit `message` at `level`.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let event = LogEvent::now(level, message);
        let scope = self.scope.as_deref().unwrap_or("-");
        match level {
            LogLevel::Debug => {
                tracing::debug!(target: RELAY_TARGET, folder = scope, "{}", event.message)
            }
            LogLevel::Info => {
                tracing::info!(target: RELAY_TARGET, folder = scope, "{}", event.message)
            }
            LogLevel::Warn => {
                tracing::warn!(target: RELAY_TARGET, folder = scope, "{}", event.message)
            }
            LogLevel::Error => {
                tracing::error!(target: RELAY_TARGET, folder = scope, "{}", event.message)
            }
        }
        self.sink.emit(event);
    }

    /// Emit at [`LogLevel::Debug`].
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    /// Emit at [`LogLevel::Info`].
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    /// Emit at [`LogLevel::Warn`].
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    /// Emit at [`LogLevel::Error`].
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }
}

/// Install a global `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over `default_level`. Calling this twice is a no-op.
pub fn init_tracing(default_level: LogLevel) {
    init_tracing_with(default_level.filter_str());
}

/// Like [`init_tracing`] with explicit default filter directives, e.g.
/// `"info,slidecast::relay=off"`.
pub fn init_tracing_with(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}

#[cfg(test)]
#[path = "../../tests/unit/relay/mod.rs"]
mod tests;
