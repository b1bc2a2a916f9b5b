//! Application state shared across handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use p1dash_store::Store;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};

use crate::config::Config;

/// Shared application state.
pub struct AppState {
    /// The reading store (wrapped in Mutex for thread-safe access).
    pub store: Mutex<Store>,
    /// Configuration.
    pub config: RwLock<Config>,
    /// Collector status.
    pub collector: CollectorState,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Store, config: Config) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
            config: RwLock::new(config),
            collector: CollectorState::new(),
        })
    }
}

/// State for tracking the collector.
pub struct CollectorState {
    /// Whether the collector task is running.
    running: AtomicBool,
    /// When the collector was started (Unix timestamp).
    started_at: AtomicU64,
    /// Poll statistics.
    pub stats: RwLock<CollectionStats>,
}

impl CollectorState {
    /// Create a new collector state.
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            started_at: AtomicU64::new(0),
            stats: RwLock::new(CollectionStats::default()),
        }
    }

    /// Check if the collector is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark the collector as started or stopped.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
        if running {
            let now = OffsetDateTime::now_utc().unix_timestamp() as u64;
            self.started_at.store(now, Ordering::SeqCst);
        }
    }

    /// Get the collector start time.
    pub fn started_at(&self) -> Option<OffsetDateTime> {
        let ts = self.started_at.load(Ordering::SeqCst);
        if ts == 0 {
            None
        } else {
            OffsetDateTime::from_unix_timestamp(ts as i64).ok()
        }
    }
}

impl Default for CollectorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Poll statistics for the meter.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CollectionStats {
    /// Meter endpoint being polled.
    pub source: Option<String>,
    /// Poll interval in seconds.
    pub poll_interval: u64,
    /// Time of last successful poll.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_poll_at: Option<OffsetDateTime>,
    /// Time of last failed poll.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_error_at: Option<OffsetDateTime>,
    /// Last error message.
    pub last_error: Option<String>,
    /// Successful polls.
    pub success_count: u64,
    /// Failed polls.
    pub failure_count: u64,
    /// Polls whose timestamp was already stored.
    pub duplicate_count: u64,
}

impl CollectionStats {
    /// Record a successful poll.
    pub fn record_success(&mut self, at: OffsetDateTime, inserted: bool) {
        self.last_poll_at = Some(at);
        self.success_count += 1;
        if !inserted {
            self.duplicate_count += 1;
        }
    }

    /// Record a failed poll.
    pub fn record_failure(&mut self, at: OffsetDateTime, error: String) {
        self.last_error_at = Some(at);
        self.last_error = Some(error);
        self.failure_count += 1;
    }
}
