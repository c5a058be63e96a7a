//! Time-windowed alert admission.
//!
//! Suppresses redelivery of the same logical event inside a rolling window.
//! Single-process, last-write-wins; not a distributed dedup. A storage
//! failure (lock poisoning) fails open so a real alert is never silently
//! dropped.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, warn};

/// How often the lazy sweep runs, relative to retention.
const SWEEP_DIVISOR: i32 = 24;

pub struct AlertGate {
    /// key -> last admitted timestamp
    seen: RwLock<HashMap<String, DateTime<Utc>>>,
    last_sweep: RwLock<DateTime<Utc>>,
    window: Duration,
    retention: Duration,
}

impl AlertGate {
    pub fn new(window: Duration, retention: Duration) -> Self {
        Self {
            seen: RwLock::new(HashMap::new()),
            last_sweep: RwLock::new(Utc::now()),
            window,
            retention,
        }
    }

    /// 900 s window, 24 h retention.
    pub fn with_defaults() -> Self {
        Self::new(Duration::seconds(900), Duration::hours(24))
    }

    /// Admits or suppresses an event key. Admission records the current
    /// timestamp; suppression leaves the old one in place so a burst cannot
    /// extend its own window.
    pub fn admit(&self, key: &str) -> bool {
        self.admit_at(key, Utc::now())
    }

    /// Lookup and upsert happen under one write guard so two concurrent
    /// identical events cannot both be admitted.
    pub fn admit_at(&self, key: &str, now: DateTime<Utc>) -> bool {
        let mut seen = match self.seen.write() {
            Ok(guard) => guard,
            Err(e) => {
                warn!("dedupe store unavailable ({e}), admitting");
                return true;
            }
        };

        self.sweep_if_due(&mut seen, now);

        if let Some(last) = seen.get(key) {
            if now - *last < self.window {
                debug!(key, "suppressed: repeat within dedupe window");
                return false;
            }
        }
        seen.insert(key.to_string(), now);
        true
    }

    /// Lazy sweep: drops records past the retention horizon to bound the map.
    fn sweep_if_due(&self, seen: &mut HashMap<String, DateTime<Utc>>, now: DateTime<Utc>) {
        let mut last_sweep = match self.last_sweep.write() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        if now - *last_sweep < self.retention / SWEEP_DIVISOR {
            return;
        }
        let cutoff = now - self.retention;
        let before = seen.len();
        seen.retain(|_, ts| *ts > cutoff);
        if seen.len() < before {
            debug!(evicted = before - seen.len(), "dedupe sweep");
        }
        *last_sweep = now;
    }

    pub fn tracked(&self) -> usize {
        self.seen.read().map(|s| s.len()).unwrap_or(0)
    }
}
