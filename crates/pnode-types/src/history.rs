use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::round1;

/// Cumulative observations of one node across fetch cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ObservationCounter {
    pub observed: u64,
    pub online: u64,
}

impl ObservationCounter {
    pub fn record(&mut self, online: bool) {
        self.observed += 1;
        if online {
            self.online += 1;
        }
    }

    /// Observed uptime percent with one decimal, `None` before the first observation.
    pub fn percent(&self) -> Option<f64> {
        if self.observed == 0 {
            return None;
        }
        Some(round1(self.online as f64 / self.observed as f64 * 100.0))
    }
}

/// One point of the fleet uptime time-series, appended per successful fetch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeHistorySample {
    pub timestamp: DateTime<Utc>,
    pub average_percent: f64,
    pub by_id: BTreeMap<String, f64>,
}

impl UptimeHistorySample {
    pub fn percent_for(&self, id: &str) -> Option<f64> {
        self.by_id.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_percent() {
        let mut counter = ObservationCounter::default();
        assert_eq!(counter.percent(), None);

        counter.record(true);
        counter.record(true);
        counter.record(false);
        counter.record(true);

        assert_eq!(counter.observed, 4);
        assert_eq!(counter.online, 3);
        assert_eq!(counter.percent(), Some(75.0));
    }

    #[test]
    fn test_counter_rounding() {
        let counter = ObservationCounter { observed: 3, online: 2 };
        assert_eq!(counter.percent(), Some(66.7));
    }
}
