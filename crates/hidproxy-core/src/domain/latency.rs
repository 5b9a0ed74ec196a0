//! Rolling capture-to-write latency statistics.

use std::fmt;
use std::time::Duration;

/// Min / max / exponentially weighted average of report latencies.
///
/// The average follows `avg = (avg + sample) / 2`, so it reacts within a few
/// reports to a change in load while still smoothing single outliers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencyStats {
    min: Option<Duration>,
    max: Duration,
    avg: Duration,
    last: Duration,
    samples: u64,
}

impl LatencyStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one measured latency into the statistics.
    pub fn record(&mut self, latency: Duration) {
        self.min = Some(self.min.map_or(latency, |m| m.min(latency)));
        self.max = self.max.max(latency);
        self.avg = (self.avg + latency) / 2;
        self.last = latency;
        self.samples += 1;
    }

    /// Smallest latency seen, `None` before the first sample.
    pub fn min(&self) -> Option<Duration> {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn avg(&self) -> Duration {
        self.avg
    }

    pub fn last(&self) -> Duration {
        self.last
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Returns `true` on every `every`-th sample; used to rate-limit logging.
    pub fn is_summary_due(&self, every: u64) -> bool {
        every > 0 && self.samples > 0 && self.samples % every == 0
    }
}

impl fmt::Display for LatencyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "now={}µs avg={}µs min={}µs max={}µs",
            self.last.as_micros(),
            self.avg.as_micros(),
            self.min.unwrap_or_default().as_micros(),
            self.max.as_micros()
        )
    }
}
