//! Scheduler configuration.

use crate::ConfigError;

/// Default time-warp interval in cycles (about one second of a 1 MHz bus).
pub const EVENT_TIMEWARP_COUNT: u32 = 0x000F_FFFF;

/// Largest accepted time-warp interval in cycles.
///
/// The relative clock reaches twice the interval in half-ticks before it is
/// folded away, so this keeps at least half of the 32-bit range free for
/// caller offsets.
pub const MAX_TIMEWARP_CYCLES: u32 = u32::MAX / 4;

/// Configuration for creating an [`EventScheduler`](crate::EventScheduler).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    /// Cycles between rebases of the relative clock.
    pub timewarp_cycles: u32,
}

impl SchedulerConfig {
    #[must_use]
    pub const fn new(timewarp_cycles: u32) -> Self {
        Self { timewarp_cycles }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.timewarp_cycles {
            0 => Err(ConfigError::ZeroTimewarp),
            cycles if cycles > MAX_TIMEWARP_CYCLES => Err(ConfigError::TimewarpTooLarge {
                cycles,
                max: MAX_TIMEWARP_CYCLES,
            }),
            _ => Ok(()),
        }
    }

    /// Largest `cycles` argument `schedule` accepts under this interval.
    ///
    /// Just before a rebase the relative clock sits at `2 * timewarp_cycles`
    /// half-ticks; the target must still fit in 32 bits after the phase
    /// adjustment adds one more. An interval that fails [`validate`] leaves
    /// no headroom and yields zero.
    ///
    /// [`validate`]: Self::validate
    #[must_use]
    pub const fn max_schedule_cycles(&self) -> u32 {
        u32::MAX
            .saturating_sub(self.timewarp_cycles.saturating_mul(2))
            .saturating_sub(1)
            / 2
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new(EVENT_TIMEWARP_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = SchedulerConfig::default();
        assert_eq!(config.timewarp_cycles, EVENT_TIMEWARP_COUNT);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn zero_interval_rejected() {
        assert_eq!(SchedulerConfig::new(0).validate(), Err(ConfigError::ZeroTimewarp));
    }

    #[test]
    fn oversized_interval_rejected() {
        let err = SchedulerConfig::new(MAX_TIMEWARP_CYCLES + 1).validate();
        assert_eq!(
            err,
            Err(ConfigError::TimewarpTooLarge {
                cycles: MAX_TIMEWARP_CYCLES + 1,
                max: MAX_TIMEWARP_CYCLES,
            })
        );
        assert_eq!(SchedulerConfig::new(MAX_TIMEWARP_CYCLES).validate(), Ok(()));
    }

    #[test]
    fn schedule_headroom_fits_in_u32() {
        let config = SchedulerConfig::new(MAX_TIMEWARP_CYCLES);
        let worst = u64::from(2 * config.timewarp_cycles)
            + 2 * u64::from(config.max_schedule_cycles())
            + 1;
        assert!(worst <= u64::from(u32::MAX));
    }

    #[test]
    fn unvalidated_interval_has_no_headroom() {
        assert_eq!(SchedulerConfig::new(u32::MAX).max_schedule_cycles(), 0);
        assert_eq!(SchedulerConfig::new(u32::MAX / 2 + 1).max_schedule_cycles(), 0);
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ConfigError::ZeroTimewarp.to_string(),
            "time-warp interval must be at least one cycle"
        );
        assert_eq!(
            ConfigError::TimewarpTooLarge { cycles: 5, max: 4 }.to_string(),
            "time-warp interval of 5 cycles exceeds the maximum of 4"
        );
    }
}
