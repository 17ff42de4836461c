//! Time-ordered pending event list with half-tick phase alignment.
//!
//! Pending events form a circular doubly-linked list threaded through an
//! arena. Slot 0 is the sentinel (both head and tail); slot 1 is the
//! scheduler's own time-warp timer. Insertion walks from the head, which is
//! cheap because most offsets are small and land near the front.

use tracing::{debug, trace, warn};

use crate::event::Slot;
use crate::{ConfigError, EventId, Fire, Fired, Phase, SchedulerConfig};

const SENTINEL: u32 = 0;
const TIMEWARP: u32 = 1;
const FIRST_CALLER_SLOT: u32 = 2;

/// Discrete-event scheduler for independently clocked hardware units.
///
/// `K` is the caller's tag for an event (typically a small `Copy` enum naming
/// the unit and what it should do). The scheduler never owns the units
/// themselves; it only hands tags back through [`clock`](Self::clock) or a
/// [`Fire`] implementation.
#[derive(Debug)]
pub struct EventScheduler<K> {
    slots: Vec<Slot<K>>,
    /// Released caller slots awaiting reuse.
    free: Vec<u32>,
    /// Half-ticks since the current time-warp epoch began.
    relative: u32,
    /// Half-ticks accumulated before the current epoch.
    absolute: u64,
    /// Linked nodes, rebase timer included.
    linked: u32,
    config: SchedulerConfig,
}

impl<K: Copy> EventScheduler<K> {
    /// Create a scheduler with the default time-warp interval.
    #[must_use]
    pub fn new() -> Self {
        Self::build(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SchedulerConfig) -> Self {
        let mut sched = Self {
            slots: vec![
                Slot::new(SENTINEL, "scheduler", None),
                Slot::new(TIMEWARP, "scheduler.timewarp", None),
            ],
            free: Vec::new(),
            relative: 0,
            absolute: 0,
            linked: 0,
            config,
        };
        sched.reset();
        sched
    }

    /// Register a new, unpending event.
    ///
    /// The label is used for diagnostics only.
    pub fn register(&mut self, label: &'static str, kind: K) -> EventId {
        if let Some(index) = self.free.pop() {
            let slot = self.slot_mut(index);
            slot.label = label;
            slot.kind = Some(kind);
            slot.live = true;
            slot.pending = false;
            slot.prev = index;
            slot.next = index;
            return EventId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot::new(index, label, Some(kind)));
        EventId::new(index, 0)
    }

    /// Return an event's slot to the arena. The handle becomes stale.
    ///
    /// The owner must cancel a pending event before releasing it.
    pub fn release(&mut self, id: EventId) {
        let Some(index) = self.resolve(id) else {
            return;
        };
        let label = self.slot(index).label;
        debug_assert!(
            !self.slot(index).pending,
            "event {label} released while still pending"
        );
        if self.slot(index).pending {
            warn!(event = label, "released while pending; cancelling");
            self.unlink(index);
        }
        let slot = self.slot_mut(index);
        slot.live = false;
        slot.kind = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
    }

    /// Schedule `id` to fire `cycles` whole cycles from now, on `phase`.
    ///
    /// An already pending event is cancelled first and then inserted afresh,
    /// so it queues behind every other event due on the same half-tick.
    /// `cycles` must not exceed [`max_schedule_cycles`](Self::max_schedule_cycles).
    pub fn schedule(&mut self, id: EventId, cycles: u32, phase: Phase) {
        if let Some(index) = self.resolve(id) {
            self.schedule_slot(index, cycles, phase);
        }
    }

    /// Remove `id` from the pending list. Cancelling an unpending event does
    /// nothing.
    pub fn cancel(&mut self, id: EventId) {
        let Some(index) = self.resolve(id) else {
            return;
        };
        if self.slot(index).pending {
            trace!(event = self.slot(index).label, "cancel");
            self.unlink(index);
        }
    }

    /// Drop every pending event and restart the clock at zero.
    ///
    /// Owners are not notified: their events simply become unpending. The
    /// time-warp timer is rearmed straight away.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.pending = false;
        }
        let sentinel = self.slot_mut(SENTINEL);
        sentinel.prev = SENTINEL;
        sentinel.next = SENTINEL;
        self.relative = 0;
        self.absolute = 0;
        self.linked = 0;
        debug!(timewarp_cycles = self.config.timewarp_cycles, "scheduler reset");
        self.rebase();
    }

    /// Unlink the next pending event, move the clock to its due time and
    /// return it. Time-warps are handled internally and never returned.
    ///
    /// Returns `None` once no caller event is pending; the clock is left
    /// where it was.
    pub fn clock(&mut self) -> Option<Fired<K>> {
        let (_, due) = self.pending().next()?;
        self.pop_due(due)
    }

    /// Fire every event due at or before the absolute half-tick `deadline`,
    /// then leave the clock at `deadline`. Returns how many events fired.
    ///
    /// Events scheduled from inside `fire` are dispatched in the same call if
    /// they fall due before the deadline. The clock never moves backwards.
    pub fn run_until<F: Fire<K> + ?Sized>(&mut self, deadline: u64, target: &mut F) -> usize {
        let mut count = 0;
        while let Some(fired) = self.pop_due(deadline) {
            trace!(event = fired.label, time = fired.time, "fire");
            target.fire(self, fired);
            count += 1;
        }
        if deadline > self.now() {
            // Every earlier due time has been dispatched, including the
            // time-warp, so the offset fits the relative counter.
            let relative = u32::try_from(deadline - self.absolute);
            debug_assert!(
                relative.is_ok(),
                "deadline {deadline} lies beyond the pending time-warp"
            );
            if let Ok(relative) = relative {
                self.relative = relative;
            }
        }
        count
    }

    /// Run the machine forward by `cycles` whole cycles.
    pub fn run_cycles<F: Fire<K> + ?Sized>(&mut self, cycles: u32, target: &mut F) -> usize {
        let deadline = self.now() + 2 * u64::from(cycles);
        self.run_until(deadline, target)
    }

    /// Absolute half-tick of the next pending event, time-warp included.
    #[must_use]
    pub fn next_due(&self) -> Option<u64> {
        let head = self.slot(SENTINEL).next;
        (head != SENTINEL).then(|| self.absolute + u64::from(self.slot(head).due))
    }

    /// Current absolute time in half-ticks.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.absolute + u64::from(self.relative)
    }

    /// The half of the cycle the clock is currently on.
    #[must_use]
    pub fn phase(&self) -> Phase {
        Phase::of(self.now())
    }

    /// Whole cycles elapsed as seen by a unit clocked on `phase`.
    ///
    /// A Φ1 unit sees the cycle count roll over on the half-tick after Φ2,
    /// so from Φ2 it already reports the upcoming cycle.
    #[must_use]
    pub fn time(&self, phase: Phase) -> u64 {
        (self.now() + u64::from(phase.bit() ^ 1)) >> 1
    }

    /// Cycles elapsed since `clock`, a value previously read with
    /// [`time`](Self::time) on the same phase.
    #[must_use]
    pub fn elapsed_since(&self, clock: u64, phase: Phase) -> u64 {
        self.time(phase).wrapping_sub(clock)
    }

    /// Pending caller events. The time-warp timer is not counted.
    #[must_use]
    pub fn pending_count(&self) -> u32 {
        self.linked - u32::from(self.slot(TIMEWARP).pending)
    }

    #[must_use]
    pub fn relative_clock(&self) -> u32 {
        self.relative
    }

    #[must_use]
    pub fn absolute_clock(&self) -> u64 {
        self.absolute
    }

    #[must_use]
    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    #[must_use]
    pub fn max_schedule_cycles(&self) -> u32 {
        self.config.max_schedule_cycles()
    }

    #[must_use]
    pub fn is_pending(&self, id: EventId) -> bool {
        self.lookup(id).is_some_and(|index| self.slot(index).pending)
    }

    /// Absolute half-tick `id` is due at, if pending.
    #[must_use]
    pub fn due_time(&self, id: EventId) -> Option<u64> {
        let slot = self.slot(self.lookup(id)?);
        slot.pending.then(|| self.absolute + u64::from(slot.due))
    }

    #[must_use]
    pub fn label(&self, id: EventId) -> Option<&'static str> {
        self.lookup(id).map(|index| self.slot(index).label)
    }

    #[must_use]
    pub fn kind(&self, id: EventId) -> Option<K> {
        self.lookup(id).and_then(|index| self.slot(index).kind)
    }

    /// Pending caller events in firing order with their absolute due times.
    #[must_use]
    pub fn pending(&self) -> impl Iterator<Item = (EventId, u64)> + '_ {
        let mut node = self.slot(SENTINEL).next;
        std::iter::from_fn(move || {
            while node != SENTINEL {
                let index = node;
                let slot = self.slot(index);
                node = slot.next;
                if index != TIMEWARP {
                    let due = self.absolute + u64::from(slot.due);
                    return Some((EventId::new(index, slot.generation), due));
                }
            }
            None
        })
    }

    /// Label and absolute due time of the list head, time-warp included.
    pub(crate) fn head(&self) -> Option<(&'static str, u64)> {
        let head = self.slot(SENTINEL).next;
        (head != SENTINEL).then(|| {
            let slot = self.slot(head);
            (slot.label, self.absolute + u64::from(slot.due))
        })
    }

    fn pop_due(&mut self, deadline: u64) -> Option<Fired<K>> {
        loop {
            let head = self.slot(SENTINEL).next;
            if head == SENTINEL {
                return None;
            }
            let due = self.absolute + u64::from(self.slot(head).due);
            if due > deadline {
                return None;
            }
            if head == TIMEWARP && self.linked == 1 {
                // Idle: every epoch before the last one due by the deadline
                // is empty, so fold them in one step. Epochs are whole
                // periods starting on Φ1, so phase parity is unchanged.
                let period = 2 * u64::from(self.config.timewarp_cycles);
                self.absolute += (deadline - due) / period * period;
            }
            self.relative = self.slot(head).due;
            self.unlink(head);
            if head == TIMEWARP {
                self.rebase();
                continue;
            }
            let slot = self.slot(head);
            let Some(kind) = slot.kind else {
                continue;
            };
            return Some(Fired {
                id: EventId::new(head, slot.generation),
                kind,
                label: slot.label,
                time: self.now(),
            });
        }
    }

    fn schedule_slot(&mut self, index: u32, cycles: u32, phase: Phase) {
        debug_assert!(
            cycles <= self.max_schedule_cycles(),
            "{cycles} cycles overruns the time-warp interval"
        );
        if self.slot(index).pending {
            self.unlink(index);
        }

        let mut target = self.relative.wrapping_add(cycles.wrapping_mul(2));
        let parity = ((self.absolute + u64::from(target)) & 1) as u32;
        target = target.wrapping_add(parity ^ phase.bit());

        // Walk past every node due at or before the target so that equal
        // due times keep schedule-call order.
        let mut node = self.slot(SENTINEL).next;
        while node != SENTINEL && self.slot(node).due <= target {
            node = self.slot(node).next;
        }
        let prev = self.slot(node).prev;
        self.slot_mut(prev).next = index;
        self.slot_mut(node).prev = index;
        let slot = self.slot_mut(index);
        slot.prev = prev;
        slot.next = node;
        slot.pending = true;
        slot.due = target;
        self.linked += 1;
        trace!(event = self.slot(index).label, cycles, %phase, due = target, "schedule");
    }

    fn unlink(&mut self, index: u32) {
        let (prev, next) = {
            let slot = self.slot(index);
            (slot.prev, slot.next)
        };
        self.slot_mut(prev).next = next;
        self.slot_mut(next).prev = prev;
        let slot = self.slot_mut(index);
        slot.pending = false;
        slot.prev = index;
        slot.next = index;
        self.linked -= 1;
    }

    /// Fold the elapsed window into the absolute clock and re-origin every
    /// pending due time, then rearm the time-warp timer.
    fn rebase(&mut self) {
        let window = self.relative;
        self.absolute += u64::from(window);
        // Only the sentinel is unpending on this walk.
        let mut node = self.slot(SENTINEL).next;
        while self.slot(node).pending {
            let slot = self.slot_mut(node);
            slot.due -= window;
            node = slot.next;
        }
        self.relative = 0;
        debug!(window, absolute = self.absolute, pending = self.linked, "time-warp");
        self.schedule_slot(TIMEWARP, self.config.timewarp_cycles, Phase::Phi1);
    }

    /// Slot index for a caller handle, or `None` if it is stale.
    fn lookup(&self, id: EventId) -> Option<u32> {
        let slot = self.slots.get(id.index as usize)?;
        (id.index >= FIRST_CALLER_SLOT && slot.live && slot.generation == id.generation)
            .then_some(id.index)
    }

    fn resolve(&self, id: EventId) -> Option<u32> {
        let index = self.lookup(id);
        debug_assert!(index.is_some(), "stale event handle {id:?}");
        if index.is_none() {
            warn!(?id, "ignoring stale event handle");
        }
        index
    }

    fn slot(&self, index: u32) -> &Slot<K> {
        &self.slots[index as usize]
    }

    fn slot_mut(&mut self, index: u32) -> &mut Slot<K> {
        &mut self.slots[index as usize]
    }
}

impl<K: Copy> Default for EventScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}
