// Harness and bus constants (no magic values)
use std::time::Duration;

/// Default number of bus workers
pub const DEFAULT_THREAD_COUNT: usize = 5;

/// Default wall-clock window for one run (10s)
pub const DEFAULT_RUN_DURATION: Duration = Duration::from_secs(10);

/// Default messages enqueued per iteration
pub const DEFAULT_LOAD_PER_ITERATION: usize = 5;

/// Default worker nap when the inbox is empty (1s)
pub const DEFAULT_IDLE_SLEEP_DURATION: Duration = Duration::from_secs(1);

/// Default delay between CPU samples while waiting for idleness (25ms)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Default CPU margin above baseline (percentage points)
pub const DEFAULT_CPU_MARGIN: f32 = 25.0;

/// Delay between the discarded cold sample and the baseline sample (1s)
pub const BASELINE_SETTLE_DURATION: Duration = Duration::from_secs(1);

/// Default queue URI template; `{}` receives the logical queue name
pub const DEFAULT_QUEUE_URI_TEMPLATE: &str = "memory://./{}";

/// Placeholder in the queue URI template
pub const QUEUE_NAME_PLACEHOLDER: &str = "{}";

/// Logical name of the inbox work queue
pub const INBOX_WORK_QUEUE_NAME: &str = "test-inbox-work";

/// Logical name of the error queue
pub const ERROR_QUEUE_NAME: &str = "test-error";

/// Text carried by every synthetic load message
pub const RESOURCE_TEST_TEXT: &str = "[resource testing]";

/// Sleep after a worker fails to reach its queue before retrying (1s)
pub const ERROR_RECOVERY_SLEEP_DURATION: Duration = Duration::from_secs(1);
