use super::config::AgentSettings;
use crate::buffer::{Batch, FlushTrigger};
use crate::collector::TailCursor;
use crate::domain::{AgentError, Event};
use crate::parser::LineParser;
use crate::sender::BatchSink;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Lifecycle of the agent loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Connecting,
    Running,
    Stopping,
    Stopped,
    Failed,
}

/// What one poll cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub lines_read: usize,
    pub events_parsed: usize,
    pub flush: Option<FlushOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushOutcome {
    pub trigger: FlushTrigger,
    pub events: usize,
    pub delivered: bool,
}

/// Counters reported when the agent stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentSummary {
    pub lines_read: u64,
    pub events_parsed: u64,
    pub lines_dropped: u64,
    pub events_delivered: u64,
    pub successful_flushes: u64,
    pub failed_flushes: u64,
    pub events_overflowed: u64,
    pub events_undelivered: usize,
    pub rotations: u64,
}

/// The tail-parse-batch-deliver loop.
///
/// Owns the cursor and the batch exclusively. Delivery is awaited in-line,
/// so a slow collector delays the next poll rather than piling up work.
pub struct Agent<S: BatchSink> {
    cursor: TailCursor,
    parser: LineParser,
    batch: Batch,
    sink: S,
    stream: Option<S>,
    poll_interval: Duration,
    state: AgentState,
    summary: AgentSummary,
}

impl<S: BatchSink> Agent<S> {
    /// Open the log file (positioned at its end). Failure here is fatal.
    pub async fn connect(
        settings: &AgentSettings,
        sink: S,
        stream: Option<S>,
    ) -> Result<Self, AgentError> {
        debug!(state = ?AgentState::Connecting, path = %settings.log_file.display(), "Opening log file");
        let cursor = TailCursor::open(&settings.log_file).await?;

        info!(
            path = %settings.log_file.display(),
            offset = cursor.offset(),
            endpoint = sink.endpoint(),
            stream_endpoint = stream.as_ref().map(|s| s.endpoint()),
            mode = ?settings.mode,
            batch_size = settings.batch.max_size,
            batch_timeout_ms = settings.batch.max_wait_time.as_millis() as u64,
            poll_interval_ms = settings.poll_interval.as_millis() as u64,
            "Tailing log file"
        );

        Ok(Self {
            cursor,
            parser: LineParser::with_origin_tag(settings.origin_tag.clone()),
            batch: Batch::new(settings.batch.clone()),
            sink,
            stream,
            poll_interval: settings.poll_interval,
            state: AgentState::Running,
            summary: AgentSummary::default(),
        })
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn pending(&self) -> &[Event] {
        self.batch.entries()
    }

    pub fn summary(&self) -> &AgentSummary {
        &self.summary
    }

    /// Poll until `shutdown` is cancelled, then flush once and stop.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<AgentSummary, AgentError> {
        if let Err(e) = self.run_until_cancelled(&shutdown).await {
            self.state = AgentState::Failed;
            error!(error = %e, "Agent loop failed");
            return Err(e);
        }

        Ok(self.stop().await)
    }

    async fn run_until_cancelled(&mut self, shutdown: &CancellationToken) -> Result<(), AgentError> {
        loop {
            if shutdown.is_cancelled() {
                return Ok(());
            }

            self.run_cycle().await?;

            tokio::select! {
                () = shutdown.cancelled() => return Ok(()),
                () = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }

    /// One poll: read, parse, append, and deliver if a trigger fired.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, AgentError> {
        let lines = self.cursor.read_new_lines().await?;
        let events: Vec<Event> = lines
            .iter()
            .filter_map(|line| self.parser.parse(line))
            .collect();

        let report_lines = lines.len();
        let report_events = events.len();
        self.summary.lines_read += report_lines as u64;
        self.summary.events_parsed += report_events as u64;
        self.summary.lines_dropped += (report_lines - report_events) as u64;

        if !events.is_empty() {
            debug!(lines = report_lines, events = report_events, "Parsed new events");
            self.push_to_stream(&events).await;
            self.batch.add(events);
        }

        let flush = match self.batch.flush_trigger(Instant::now()) {
            Some(trigger) => Some(self.flush(trigger).await),
            None => None,
        };

        Ok(CycleReport {
            lines_read: report_lines,
            events_parsed: report_events,
            flush,
        })
    }

    async fn flush(&mut self, trigger: FlushTrigger) -> FlushOutcome {
        let events = self.batch.len();
        debug!(events, ?trigger, "Flushing batch");

        let delivered = match self.sink.send(self.batch.entries()).await {
            Ok(receipt) => {
                self.batch.drain(events, Instant::now());
                self.summary.successful_flushes += 1;
                self.summary.events_delivered += events as u64;
                debug!(batch_id = %receipt.batch_id, events, "Batch accepted");
                true
            }
            Err(e) => {
                self.summary.failed_flushes += 1;
                warn!(
                    error = %e,
                    retained = events,
                    retained_bytes = self.batch.estimated_memory_size(),
                    "Delivery failed; retaining batch for the next cycle"
                );
                false
            }
        };

        FlushOutcome {
            trigger,
            events,
            delivered,
        }
    }

    async fn push_to_stream(&self, events: &[Event]) {
        let Some(stream) = &self.stream else {
            return;
        };

        if let Err(e) = stream.send(events).await {
            warn!(
                error = %e,
                endpoint = stream.endpoint(),
                events = events.len(),
                "Stream push failed; events remain queued for the collector only"
            );
        }
    }

    async fn stop(mut self) -> AgentSummary {
        self.state = AgentState::Stopping;
        info!(pending = self.batch.len(), "Shutting down agent");

        if !self.batch.is_empty() {
            self.flush(FlushTrigger::Shutdown).await;
        }

        if !self.batch.is_empty() {
            warn!(
                events = self.batch.len(),
                bytes = self.batch.estimated_memory_size(),
                "Discarding undelivered events at shutdown"
            );
        }

        self.summary.events_undelivered = self.batch.len();
        self.summary.events_overflowed = self.batch.dropped_total();
        self.summary.rotations = self.cursor.rotations();
        self.cursor.close();
        self.state = AgentState::Stopped;
        debug!(state = ?self.state, "Agent state changed");

        info!(
            lines_read = self.summary.lines_read,
            events_parsed = self.summary.events_parsed,
            lines_dropped = self.summary.lines_dropped,
            events_delivered = self.summary.events_delivered,
            failed_flushes = self.summary.failed_flushes,
            events_overflowed = self.summary.events_overflowed,
            rotations = self.summary.rotations,
            "Agent stopped"
        );
        self.summary
    }
}
