use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

/// Tags the three artifacts of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl RunId {
    pub fn overview_file(&self) -> String {
        format!("{}_overview_plot.png", self.0)
    }

    pub fn closeup_file(&self) -> String {
        format!("{}_closeup_plot.png", self.0)
    }

    pub fn map_file(&self) -> String {
        format!("{}_map.html", self.0)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(RunId)
            .map_err(|_| format!("Invalid run id: {}", s))
    }
}

/// Hands out strictly increasing run ids.
///
/// Ids start at the wall-clock time in milliseconds so they stay distinct
/// across restarts, and never repeat within a process even when two runs
/// start in the same millisecond or the clock steps backwards.
#[derive(Debug, Default)]
pub struct RunIdGenerator {
    last: AtomicU64,
}

impl RunIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> RunId {
        let now = now_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        RunId(now.max(previous + 1))
    }
}

fn now_millis() -> u64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    u64::try_from(millis).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn filenames_follow_the_artifact_pattern() {
        let id = RunId(4242);
        assert_eq!(id.overview_file(), "4242_overview_plot.png");
        assert_eq!(id.closeup_file(), "4242_closeup_plot.png");
        assert_eq!(id.map_file(), "4242_map.html");
    }

    #[test]
    fn ids_strictly_increase() {
        let generator = RunIdGenerator::new();
        let mut previous = generator.next_id();
        for _ in 0..1_000 {
            let next = generator.next_id();
            assert!(next > previous, "{next} <= {previous}");
            previous = next;
        }
    }

    #[test]
    fn ids_are_unique_across_threads() {
        let generator = Arc::new(RunIdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                std::thread::spawn(move || (0..250).map(|_| generator.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate run id {id}");
            }
        }
        assert_eq!(seen.len(), 1_000);
    }

    #[test]
    fn parses_from_path_segment() {
        assert_eq!("17".parse::<RunId>().unwrap(), RunId(17));
        assert!("abc".parse::<RunId>().is_err());
    }
}
