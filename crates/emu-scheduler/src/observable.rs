//! State inspection for debuggers and tests.
//!
//! Queries never affect scheduling state.

use std::fmt;

use crate::EventScheduler;

/// A dynamically-typed value for state queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Number of events.
    Count(u32),
    /// Half-tick clock reading or due time.
    Time(u64),
    String(String),
    /// Path exists but has nothing to report (e.g. an empty queue).
    None,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Count(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::None => write!(f, "-"),
        }
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Count(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Time(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// A component whose state can be inspected by dotted path.
pub trait Observable {
    /// Query a specific property by path. Returns `None` if the path is not
    /// recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// List all available query paths.
    fn query_paths(&self) -> &'static [&'static str];
}

const PATHS: &[&str] = &[
    "clock.relative",
    "clock.absolute",
    "clock.now",
    "clock.phase",
    "pending",
    "next.label",
    "next.due",
];

impl<K: Copy> Observable for EventScheduler<K> {
    fn query(&self, path: &str) -> Option<Value> {
        let value = match path {
            "clock.relative" => u64::from(self.relative_clock()).into(),
            "clock.absolute" => self.absolute_clock().into(),
            "clock.now" => self.now().into(),
            "clock.phase" => self.phase().to_string().as_str().into(),
            "pending" => self.pending_count().into(),
            "next.label" => self.head().map_or(Value::None, |(label, _)| label.into()),
            "next.due" => self.head().map_or(Value::None, |(_, due)| due.into()),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        PATHS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Phase;

    #[test]
    fn every_listed_path_answers() {
        let sched: EventScheduler<()> = EventScheduler::new();
        for path in sched.query_paths() {
            assert!(sched.query(path).is_some(), "{path} unanswered");
        }
        assert_eq!(sched.query("clock.bogus"), None);
    }

    #[test]
    fn reports_head_of_queue() {
        let mut sched = EventScheduler::new();
        let id = sched.register("vic.raster", ());
        assert_eq!(
            sched.query("next.label"),
            Some(Value::String("scheduler.timewarp".into()))
        );
        sched.schedule(id, 63, Phase::Phi2);
        assert_eq!(sched.query("next.label"), Some(Value::String("vic.raster".into())));
        assert_eq!(sched.query("next.due"), Some(Value::Time(127)));
        assert_eq!(sched.query("pending"), Some(Value::Count(1)));
        assert_eq!(sched.query("clock.phase").map(|v| v.to_string()), Some("phi1".into()));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Count(7).to_string(), "7");
        assert_eq!(Value::Time(1_048_575).to_string(), "1048575");
        assert_eq!(Value::from("osc").to_string(), "osc");
        assert_eq!(Value::None.to_string(), "-");
    }
}
