// Queue constants (no magic values)
use std::time::Duration;

/// Interval between dequeue attempts while waiting for a message (100ms)
pub const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Visibility timeout applied by `wait_for_message` when none is given (10s)
pub const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(10);
