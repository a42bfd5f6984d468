use std::fmt;
use std::time::{Duration, Instant};

/// Running count/avg/min/max of a duration series, in microseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DurationStat {
    pub count: u64,
    pub avg_us: u64,
    pub min_us: u64,
    pub max_us: u64,
}

impl DurationStat {
    pub fn record(&mut self, d: Duration) {
        let us = u64::try_from(d.as_micros()).unwrap_or(u64::MAX);
        self.count += 1;
        if self.count == 1 {
            self.avg_us = us;
            self.min_us = us;
            self.max_us = us;
            return;
        }
        // incremental mean
        let avg = self.avg_us as i128 + (us as i128 - self.avg_us as i128) / self.count as i128;
        self.avg_us = avg.max(0) as u64;
        self.min_us = self.min_us.min(us);
        self.max_us = self.max_us.max(us);
    }
}

impl fmt::Display for DurationStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.count, self.avg_us, self.min_us, self.max_us
        )
    }
}

/// Per-window worker statistics, dumped roughly once per second.
#[derive(Clone, Debug)]
pub struct Stat {
    pub transactions: DurationStat,
    pub updates: DurationStat,
    pub positions: u64,
    pub sizes: u64,
    pub visibility: u64,
    window_start: Instant,
}

impl Default for Stat {
    fn default() -> Self {
        Self::new()
    }
}

impl Stat {
    /// Window length between periodic dumps.
    pub const INTERVAL: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self {
            transactions: DurationStat::default(),
            updates: DurationStat::default(),
            positions: 0,
            sizes: 0,
            visibility: 0,
            window_start: Instant::now(),
        }
    }

    /// Reset all counters and start a new window.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn since_clear(&self) -> Duration {
        self.window_start.elapsed()
    }

    pub fn window_elapsed(&self) -> bool {
        self.since_clear() >= Self::INTERVAL
    }

    pub fn dump(&self, surface: &str) {
        tracing::info!(target: "strobe::stats", surface, "stat{}", self);
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " t: {} u: {} p: {} s: {} v: {} d: {}",
            self.transactions,
            self.updates,
            self.positions,
            self.sizes,
            self.visibility,
            self.since_clear().as_micros()
        )
    }
}
