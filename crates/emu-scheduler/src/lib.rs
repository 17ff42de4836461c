//! Two-phase discrete-event scheduler for cycle-accurate emulation.
//!
//! Hardware units that run on their own timing (oscillators, timers,
//! envelope generators, the CPU) register an event once and then ask for it
//! to fire N cycles from now on a given half of the bus clock (Φ1 or Φ2).
//! The scheduler keeps pending events in a time-ordered list and hands them
//! back, one at a time, to whoever drives the machine.
//!
//! Time is counted in half-ticks: one cycle is two half-ticks, Φ1 then Φ2.
//! The running clock is split into a bounded relative counter and an
//! unbounded absolute accumulator. A self-owned timer periodically folds the
//! relative counter into the accumulator ("time-warp") so that the 32-bit
//! relative arithmetic never wraps, however long the emulation runs.
//!
//! ```
//! use emu_scheduler::{EventScheduler, Phase};
//!
//! let mut sched = EventScheduler::new();
//! let irq = sched.register("cia.timer_a", 0u8);
//! sched.schedule(irq, 10, Phase::Phi1);
//!
//! let fired = sched.clock().expect("timer pending");
//! assert_eq!(fired.id, irq);
//! assert_eq!(fired.time, 20);
//! ```

mod config;
mod error;
mod event;
mod observable;
mod phase;
mod scheduler;

pub use config::{EVENT_TIMEWARP_COUNT, MAX_TIMEWARP_CYCLES, SchedulerConfig};
pub use error::ConfigError;
pub use event::{EventId, Fire, Fired};
pub use observable::{Observable, Value};
pub use phase::Phase;
pub use scheduler::EventScheduler;
