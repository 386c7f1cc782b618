//! Hour buckets and the statistics derived from them

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::ScanRecord;
use crate::time::{hour_label, local_hour};

/// Local hour (0-23) → number of scans in that hour
///
/// Sparse: an hour only has a bucket once a scan fell into it, so every
/// stored count is at least 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HourIndex {
    buckets: BTreeMap<u32, u64>,
}

impl HourIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from scratch over a full record set
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ScanRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.increment(local_hour(record.timestamp));
        }
        index
    }

    /// Add one scan to `hour`, creating the bucket at 1 if absent
    pub fn increment(&mut self, hour: u32) {
        *self.buckets.entry(hour).or_insert(0) += 1;
    }

    pub fn count(&self, hour: u32) -> u64 {
        self.buckets.get(&hour).copied().unwrap_or(0)
    }

    /// Number of non-empty buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Buckets in ascending hour order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.buckets.iter().map(|(h, c)| (*h, *c))
    }

    /// Derive the published statistics
    pub fn snapshot(&self, total_capacity: u64) -> Snapshot {
        let mut latest_first = self.buckets.iter().rev();
        let last = latest_first.next().map(|(_, c)| *c).unwrap_or(0);
        let previous = latest_first.next().map(|(_, c)| *c).unwrap_or(0);

        // A bucket exists only with count >= 1, so previous > 0 here
        let growth = if self.buckets.len() >= 2 && previous > 0 {
            (last as f64 - previous as f64) / previous as f64
        } else {
            0.0
        };

        let speed = total_capacity as f64 / self.buckets.len().max(1) as f64;

        let chart_series = self
            .iter()
            .map(|(hour, count)| ChartPoint {
                hour,
                label: hour_label(hour),
                count,
            })
            .collect();

        Snapshot {
            speed,
            last_hour_capacity: last,
            previous_hour_capacity: previous,
            total_capacity,
            growth,
            chart_series,
        }
    }
}

/// One point of the hourly capacity chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub hour: u32,
    /// `HH:00`
    pub label: String,
    pub count: u64,
}

/// Read-only statistics republished after every mutation
///
/// `last_hour_capacity` is the count of the highest hour that has scans,
/// not of the current wall-clock hour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Scans per active hour
    pub speed: f64,
    pub last_hour_capacity: u64,
    pub previous_hour_capacity: u64,
    pub total_capacity: u64,
    /// Relative change between the two latest active hours (-0.5 = down 50%)
    pub growth: f64,
    /// Ascending by hour, one point per non-empty hour
    pub chart_series: Vec<ChartPoint>,
}

impl Snapshot {
    pub fn growth_percent(&self) -> f64 {
        self.growth * 100.0
    }

    pub fn is_empty(&self) -> bool {
        self.total_capacity == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(pairs: &[(u32, u64)]) -> HourIndex {
        let mut idx = HourIndex::new();
        for (hour, count) in pairs {
            for _ in 0..*count {
                idx.increment(*hour);
            }
        }
        idx
    }

    #[test]
    fn test_empty_index_gives_zeroed_snapshot() {
        let snap = HourIndex::new().snapshot(0);
        assert_eq!(snap, Snapshot::default());
        assert!(snap.is_empty());
    }

    #[test]
    fn test_growth_is_negative_when_latest_hour_drops() {
        let snap = index(&[(9, 4), (10, 2)]).snapshot(6);
        assert_eq!(snap.growth, -0.5);
        assert_eq!(snap.growth_percent(), -50.0);
        assert_eq!(snap.last_hour_capacity, 2);
        assert_eq!(snap.previous_hour_capacity, 4);
    }

    #[test]
    fn test_growth_uses_highest_keys_not_adjacent_hours() {
        let snap = index(&[(8, 1), (9, 2), (14, 3)]).snapshot(6);
        assert_eq!(snap.last_hour_capacity, 3);
        assert_eq!(snap.growth, 0.5);
    }

    #[test]
    fn test_single_bucket_has_zero_growth() {
        let snap = index(&[(11, 5)]).snapshot(5);
        assert_eq!(snap.growth, 0.0);
        assert_eq!(snap.speed, 5.0);
        assert_eq!(snap.last_hour_capacity, 5);
        assert_eq!(snap.previous_hour_capacity, 0);
    }

    #[test]
    fn test_chart_series_is_sparse_and_ascending() {
        let snap = index(&[(15, 1), (7, 2), (9, 1)]).snapshot(4);
        let hours: Vec<u32> = snap.chart_series.iter().map(|p| p.hour).collect();
        assert_eq!(hours, vec![7, 9, 15]);
        assert_eq!(snap.chart_series[0].label, "07:00");
        assert_eq!(snap.chart_series.iter().map(|p| p.count).sum::<u64>(), 4);
        assert!((snap.speed - 4.0 / 3.0).abs() < f64::EPSILON);
    }
}
