use crate::domain::Event;
use std::time::{Duration, Instant};
use tracing::warn;

/// Why a flush was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    SizeBased,
    TimeBased,
    /// Final attempt when the agent stops.
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_size: usize,
    pub max_wait_time: Duration,
    /// Cap on retained events; `None` lets the batch grow without bound
    /// while the collector is unreachable.
    pub max_pending: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_size: 10,
            max_wait_time: Duration::from_secs(5),
            max_pending: None,
        }
    }
}

/// Events awaiting delivery, in file order, plus the time of the last
/// successful flush.
///
/// Events leave the batch only through [`Batch::drain`], which the agent
/// calls after the collector confirmed delivery. A failed delivery leaves
/// everything in place and new events keep appending behind it.
#[derive(Debug)]
pub struct Batch {
    config: BatchConfig,
    entries: Vec<Event>,
    last_flush: Instant,
    dropped_total: u64,
}

impl Batch {
    pub fn new(config: BatchConfig) -> Self {
        Self::with_last_flush(config, Instant::now())
    }

    pub fn with_last_flush(config: BatchConfig, last_flush: Instant) -> Self {
        Self {
            config,
            entries: Vec::new(),
            last_flush,
            dropped_total: 0,
        }
    }

    /// Append events. Returns how many of the oldest pending events were
    /// dropped to respect `max_pending` (always 0 when uncapped).
    pub fn add(&mut self, events: impl IntoIterator<Item = Event>) -> usize {
        self.entries.extend(events);

        let Some(cap) = self.config.max_pending else {
            return 0;
        };
        if self.entries.len() <= cap {
            return 0;
        }

        let excess = self.entries.len() - cap;
        self.entries.drain(..excess);
        self.dropped_total += excess as u64;
        warn!(
            dropped = excess,
            max_pending = cap,
            "Pending batch over capacity; dropped oldest events"
        );
        excess
    }

    pub fn flush_trigger(&self, now: Instant) -> Option<FlushTrigger> {
        if self.entries.len() >= self.config.max_size {
            return Some(FlushTrigger::SizeBased);
        }

        if !self.entries.is_empty()
            && now.saturating_duration_since(self.last_flush) >= self.config.max_wait_time
        {
            return Some(FlushTrigger::TimeBased);
        }

        None
    }

    pub fn should_flush(&self, now: Instant) -> bool {
        self.flush_trigger(now).is_some()
    }

    /// Remove the first `count` events after a confirmed delivery and record
    /// `now` as the last flush.
    pub fn drain(&mut self, count: usize, now: Instant) -> Vec<Event> {
        let count = count.min(self.entries.len());
        self.last_flush = now;
        self.entries.drain(..count).collect()
    }

    pub fn entries(&self) -> &[Event] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_flush(&self) -> Instant {
        self.last_flush
    }

    pub fn dropped_total(&self) -> u64 {
        self.dropped_total
    }

    pub fn estimated_memory_size(&self) -> usize {
        self.entries.iter().map(Event::estimated_size).sum()
    }
}
