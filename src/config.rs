use std::time::Duration;

/// Tuning knobs for the scheduling core.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How long the dispatch loop sleeps when the queue is empty or the
    /// head job is not yet ready.
    pub poll_interval: Duration,
    /// Upper bound on concurrently running jobs.
    /// `None` leaves execution unbounded.
    pub max_in_flight: Option<usize>,
    /// Capacity of the intake request and execution report channels.
    pub channel_buffer: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_in_flight: None,
            channel_buffer: 64,
        }
    }
}

impl SchedulerConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: Option<usize>) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }
}
