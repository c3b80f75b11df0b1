use std::time::Duration;

use crate::declare;

/// Knobs for one job run. Passed in by value so several jobs can coexist
/// in the same process.
#[derive(Clone, Debug)]
pub struct JobConfig {
    /// Destination folder; created on demand, owned by the job for its run.
    pub out_dir: String,
    /// Pause after every download attempt.
    pub item_delay: Duration,
    /// Pause after a pagination click in the rendered-page strategy.
    pub settle_delay: Duration,
    pub request_timeout: Duration,
    /// Bound on waiting for the results marker in the rendered-page strategy.
    pub ui_wait_timeout: Duration,
}

impl JobConfig {
    pub fn new(out_dir: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            item_delay: Duration::from_millis(declare::ITEM_DELAY_MS),
            settle_delay: Duration::from_millis(declare::SETTLE_DELAY_MS),
            request_timeout: Duration::from_secs(declare::REQUEST_TIMEOUT_SEC),
            ui_wait_timeout: Duration::from_secs(declare::UI_WAIT_TIMEOUT_SEC),
        }
    }
}
