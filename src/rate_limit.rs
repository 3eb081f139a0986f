//! Process-wide rate-limit gate.
//!
//! Tripped by any upstream 429, whichever endpoint produced it. While
//! tripped, search and price-lookup actions are suppressed; recovery is a
//! flat-cadence availability probe admitted at most once per minimum
//! interval, issued by whichever request observes the tripped gate. A
//! successful probe reopens the gate.

use chrono::{DateTime, Duration, Utc};

const MIN_PROBE_INTERVAL_SECS: i64 = 3;

#[derive(Debug)]
pub struct RateLimitGate {
    tripped_at: Option<DateTime<Utc>>,
    last_probe_at: Option<DateTime<Utc>>,
    min_probe_interval: Duration,
}

impl RateLimitGate {
    pub fn new() -> Self {
        Self::with_probe_interval(Duration::seconds(MIN_PROBE_INTERVAL_SECS))
    }

    pub fn with_probe_interval(min_probe_interval: Duration) -> Self {
        Self {
            tripped_at: None,
            last_probe_at: None,
            min_probe_interval,
        }
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped_at.is_some()
    }

    pub fn tripped_at(&self) -> Option<DateTime<Utc>> {
        self.tripped_at
    }

    /// Record an upstream rate-limit response. Re-tripping while already
    /// tripped keeps the original timestamp.
    pub fn trip(&mut self) {
        if self.tripped_at.is_none() {
            self.tripped_at = Some(Utc::now());
        }
    }

    /// Admit one probe if the gate is tripped and the minimum interval since
    /// the previous probe has elapsed. The admission itself records the
    /// probe time, so at most one caller wins per interval.
    pub fn try_begin_probe(&mut self) -> bool {
        if self.tripped_at.is_none() {
            return false;
        }

        let now = Utc::now();
        let due = match self.last_probe_at {
            Some(last) => now - last >= self.min_probe_interval,
            None => true,
        };

        if due {
            self.last_probe_at = Some(now);
        }
        due
    }

    pub fn record_probe_result(&mut self, available: bool) {
        if available {
            self.tripped_at = None;
            self.last_probe_at = None;
        }
    }
}

impl Default for RateLimitGate {
    fn default() -> Self {
        Self::new()
    }
}
