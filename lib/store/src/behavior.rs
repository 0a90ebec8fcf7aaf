// Time-ordered log of user behavior for window queries
use ahash::AHashMap;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use hybridrec_core::{ActionKind, BehaviorRecord, ProductId, TemporalIndex, UserId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Activity summary for one user over a trailing window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BehaviorPattern {
    pub total_interactions: usize,
    pub action_counts: BTreeMap<String, usize>,
    pub most_active_day: Option<NaiveDate>,
    /// Up to five most-touched items, ties in first-seen order
    pub favorite_items: Vec<(ProductId, usize)>,
    pub daily_activity: BTreeMap<NaiveDate, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BehaviorStatistics {
    pub records: usize,
    pub distinct_timestamps: usize,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

/// Chronological behavior index
///
/// Records sharing a timestamp keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct BehaviorLog {
    records: BTreeMap<DateTime<Utc>, Vec<BehaviorRecord>>,
    len: usize,
}

impl BehaviorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: BehaviorRecord) {
        self.records.entry(record.timestamp).or_default().push(record);
        self.len += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Records stamped exactly at `timestamp`
    pub fn at(&self, timestamp: DateTime<Utc>) -> &[BehaviorRecord] {
        self.records.get(&timestamp).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Records with `start <= timestamp <= end`, oldest first. An inverted range is empty.
    pub fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> impl Iterator<Item = &BehaviorRecord> {
        let range = if start <= end {
            Some(self.records.range(start..=end))
        } else {
            None
        };
        range.into_iter().flatten().flat_map(|(_, records)| records.iter())
    }

    /// Activity in the `hours` leading up to `now`
    pub fn recent_activity(
        &self,
        user: Option<&UserId>,
        hours: i64,
        actions: Option<&[ActionKind]>,
        now: DateTime<Utc>,
    ) -> Vec<BehaviorRecord> {
        self.interactions_in_window(user, now - Duration::hours(hours), now, actions)
    }

    pub fn behavior_pattern(&self, user: &UserId, days: i64, now: DateTime<Utc>) -> BehaviorPattern {
        let mut action_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut daily_activity: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        let mut item_counts: Vec<(ProductId, usize)> = Vec::new();
        let mut item_slots: AHashMap<ProductId, usize> = AHashMap::new();
        let mut total_interactions = 0;

        for record in self
            .in_range(now - Duration::days(days), now)
            .filter(|r| &r.user == user)
        {
            total_interactions += 1;
            *action_counts.entry(record.action.to_string()).or_insert(0) += 1;
            *daily_activity.entry(record.timestamp.date_naive()).or_insert(0) += 1;
            match item_slots.get(&record.item) {
                Some(&slot) => item_counts[slot].1 += 1,
                None => {
                    item_slots.insert(record.item.clone(), item_counts.len());
                    item_counts.push((record.item.clone(), 1));
                }
            }
        }

        // Earliest day wins a tie
        let most_active_day = daily_activity
            .iter()
            .fold(None, |best: Option<(&NaiveDate, &usize)>, (day, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((day, count)),
            })
            .map(|(day, _)| *day);

        item_counts.sort_by(|a, b| b.1.cmp(&a.1));
        item_counts.truncate(5);

        BehaviorPattern {
            total_interactions,
            action_counts,
            most_active_day,
            favorite_items: item_counts,
            daily_activity,
        }
    }

    /// Every record, oldest first
    pub fn chronological(&self) -> impl Iterator<Item = &BehaviorRecord> {
        self.records.values().flatten()
    }

    pub fn statistics(&self) -> BehaviorStatistics {
        BehaviorStatistics {
            records: self.len,
            distinct_timestamps: self.records.len(),
            earliest: self.records.keys().next().copied(),
            latest: self.records.keys().next_back().copied(),
        }
    }
}

impl TemporalIndex for BehaviorLog {
    fn interactions_in_window(
        &self,
        user: Option<&UserId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        actions: Option<&[ActionKind]>,
    ) -> Vec<BehaviorRecord> {
        self.in_range(start, end)
            .filter(|r| user.map_or(true, |u| &r.user == u))
            .filter(|r| actions.map_or(true, |kinds| kinds.contains(&r.action)))
            .cloned()
            .collect()
    }
}
