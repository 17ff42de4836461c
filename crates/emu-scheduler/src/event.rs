//! Schedulable events and the hook that fires them.

use crate::EventScheduler;

/// Handle to an event registered with an [`EventScheduler`].
///
/// The handle names an arena slot plus the generation it was issued for, so a
/// handle kept past [`EventScheduler::release`] is recognised as stale rather
/// than silently aliasing a newer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl EventId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot index (diagnostics only).
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }
}

/// An event that has just been unlinked from the pending list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired<K> {
    pub id: EventId,
    /// Tag supplied at registration.
    pub kind: K,
    pub label: &'static str,
    /// Absolute half-tick the event was due at. The scheduler clock has
    /// already been advanced to it.
    pub time: u64,
}

/// A unit that reacts to its own scheduled events.
///
/// The scheduler unlinks an event before calling `fire`, so the
/// implementation may reschedule `fired.id` (or anything else) right away.
pub trait Fire<K> {
    fn fire(&mut self, scheduler: &mut EventScheduler<K>, fired: Fired<K>);
}

/// One arena entry: a node of the circular pending list.
#[derive(Debug, Clone)]
pub(crate) struct Slot<K> {
    pub label: &'static str,
    /// `None` for the sentinel and the rebase timer.
    pub kind: Option<K>,
    pub generation: u32,
    /// Registered to a caller (or built in). Free-list slots are dead.
    pub live: bool,
    pub pending: bool,
    /// Due time in relative half-ticks; meaningful only while pending.
    pub due: u32,
    pub prev: u32,
    pub next: u32,
}

impl<K> Slot<K> {
    /// An unpending slot linked to itself.
    pub fn new(index: u32, label: &'static str, kind: Option<K>) -> Self {
        Self {
            label,
            kind,
            generation: 0,
            live: true,
            pending: false,
            due: 0,
            prev: index,
            next: index,
        }
    }
}
