//! Usage counters with daily rollover.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::keys;

/// Completed agent action reported to the counters store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsEvent {
    CheckCompleted,
    PromptConverted,
}

/// Persisted usage counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub daily_count: u64,
    pub total_count: u64,
    pub total_issues_found: u64,
    /// `None` when nothing was stored yet or the stored date was unreadable.
    pub last_rollover_date: Option<NaiveDate>,
}

impl Counters {
    pub fn from_entries(entries: &Map<String, Value>) -> Self {
        let count = |key: &str| entries.get(key).and_then(Value::as_u64).unwrap_or(0);
        Self {
            daily_count: count(keys::TODAY_CHECKS),
            total_count: count(keys::TOTAL_CHECKS),
            total_issues_found: count(keys::TOTAL_ISSUES),
            last_rollover_date: entries
                .get(keys::LAST_STATS_DATE)
                .and_then(Value::as_str)
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
        }
    }

    pub fn to_entries(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(keys::TODAY_CHECKS.into(), Value::from(self.daily_count));
        map.insert(keys::TOTAL_CHECKS.into(), Value::from(self.total_count));
        map.insert(keys::TOTAL_ISSUES.into(), Value::from(self.total_issues_found));
        if let Some(date) = self.last_rollover_date {
            map.insert(
                keys::LAST_STATS_DATE.into(),
                Value::String(date.format("%Y-%m-%d").to_string()),
            );
        }
        map
    }

    pub fn needs_rollover(&self, today: NaiveDate) -> bool {
        self.last_rollover_date != Some(today)
    }

    /// The counters as seen on `today`: the daily count resets when the
    /// stored date is not today.
    pub fn rolled_over(&self, today: NaiveDate) -> Self {
        let mut next = self.clone();
        if next.needs_rollover(today) {
            next.daily_count = 0;
            next.last_rollover_date = Some(today);
        }
        next
    }

    /// Roll over if needed, then count one event.
    pub fn record(&self, event: StatsEvent, issues_found: u64, today: NaiveDate) -> Self {
        let mut next = self.rolled_over(today);
        next.daily_count += 1;
        next.total_count += 1;
        if event == StatsEvent::CheckCompleted {
            next.total_issues_found += issues_found;
        }
        next
    }
}
