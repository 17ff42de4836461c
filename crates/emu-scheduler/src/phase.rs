//! Bus clock phases.

/// Half of a two-phase bus clock cycle.
///
/// Each cycle is split into Φ1 (bus owned by video/peripherals on most 6502
/// machines) followed by Φ2 (CPU access). Internally the scheduler counts
/// half-ticks, and an even half-tick is always Φ1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// First half of the cycle (even half-ticks).
    Phi1,
    /// Second half of the cycle (odd half-ticks).
    Phi2,
}

impl Phase {
    /// Parity bit of this phase in half-tick time.
    #[must_use]
    pub const fn bit(self) -> u32 {
        match self {
            Phase::Phi1 => 0,
            Phase::Phi2 => 1,
        }
    }

    /// Phase of the given half-tick.
    #[must_use]
    pub const fn of(half_tick: u64) -> Self {
        if half_tick & 1 == 0 {
            Phase::Phi1
        } else {
            Phase::Phi2
        }
    }

    /// The other half of the cycle.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Phase::Phi1 => Phase::Phi2,
            Phase::Phi2 => Phase::Phi1,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Phi1 => write!(f, "phi1"),
            Phase::Phi2 => write!(f, "phi2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_half_ticks_are_phi1() {
        assert_eq!(Phase::of(0), Phase::Phi1);
        assert_eq!(Phase::of(1), Phase::Phi2);
        assert_eq!(Phase::of(20), Phase::Phi1);
        assert_eq!(Phase::of(u64::MAX), Phase::Phi2);
    }

    #[test]
    fn bit_matches_parity() {
        for t in 0..8u64 {
            assert_eq!(u64::from(Phase::of(t).bit()), t & 1);
        }
    }

    #[test]
    fn opposite_swaps() {
        assert_eq!(Phase::Phi1.opposite(), Phase::Phi2);
        assert_eq!(Phase::Phi2.opposite().opposite(), Phase::Phi2);
    }
}
