/// Scheduler tuning knobs.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Upper bound on items sitting in the pending set. Submissions beyond
    /// this are refused with `QueueFull` rather than silently dropped.
    pub max_pending: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { max_pending: 10_000 }
    }
}

impl SchedulerConfig {
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }
}
