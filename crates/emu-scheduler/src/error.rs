//! Scheduler construction errors.

use thiserror::Error;

/// Rejected [`SchedulerConfig`](crate::SchedulerConfig).
///
/// Scheduling itself never fails; only building a scheduler from a
/// configuration can.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A zero-length time-warp interval would reschedule the rebase timer
    /// on the current half-tick forever.
    #[error("time-warp interval must be at least one cycle")]
    ZeroTimewarp,
    /// The interval leaves too little 32-bit headroom for caller offsets.
    #[error("time-warp interval of {cycles} cycles exceeds the maximum of {max}")]
    TimewarpTooLarge { cycles: u32, max: u32 },
}
