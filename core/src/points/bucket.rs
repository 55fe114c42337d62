use crate::points::record::PointRecord;
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// A time-of-day interval `[start, end)` rendered as one toggleable layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub label: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub color: String,
}

impl TimeBucket {
    pub fn new(label: impl Into<String>, start: NaiveTime, end: NaiveTime, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start,
            end,
            color: color.into(),
        }
    }

    /// Whole-hour bucket labelled `HH:00-HH:00`.
    pub fn hourly(start_hour: u32, end_hour: u32, color: &str) -> Self {
        let start = NaiveTime::from_hms_opt(start_hour % 24, 0, 0).unwrap_or(NaiveTime::MIN);
        let end = NaiveTime::from_hms_opt(end_hour % 24, 0, 0).unwrap_or(NaiveTime::MIN);
        Self::new(
            format!("{:02}:00-{:02}:00", start.hour(), end.hour()),
            start,
            end,
            color,
        )
    }

    /// Morning buckets 07-08 red, 08-09 blue, 09-10 green.
    pub fn default_set() -> Vec<Self> {
        vec![
            Self::hourly(7, 8, "red"),
            Self::hourly(8, 9, "blue"),
            Self::hourly(9, 10, "green"),
        ]
    }

    /// Half-open membership on the time of day. A bucket whose start is
    /// after its end wraps past midnight.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= time && time < self.end
        } else {
            time >= self.start || time < self.end
        }
    }
}

/// Records that fell into one bucket, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketedPoints {
    pub bucket: TimeBucket,
    pub points: Vec<PointRecord>,
}

impl BucketedPoints {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Splits `points` across `buckets`. Each record goes to the first bucket
/// containing its time of day, or nowhere.
pub fn partition(points: &[PointRecord], buckets: &[TimeBucket]) -> Vec<BucketedPoints> {
    let mut partitions: Vec<BucketedPoints> = buckets
        .iter()
        .map(|bucket| BucketedPoints {
            bucket: bucket.clone(),
            points: Vec::new(),
        })
        .collect();

    for point in points {
        let time = point.timestamp.time();
        if let Some(slot) = partitions.iter_mut().find(|p| p.bucket.contains(time)) {
            slot.points.push(point.clone());
        }
    }

    partitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn post(hour: u32, minute: u32, second: u32) -> PointRecord {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap();
        PointRecord::new(116.4, 39.9, ts)
    }

    #[test]
    fn default_buckets_cover_seven_to_ten() {
        let buckets = TimeBucket::default_set();
        let labels: Vec<_> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["07:00-08:00", "08:00-09:00", "09:00-10:00"]);
        let colors: Vec<_> = buckets.iter().map(|b| b.color.as_str()).collect();
        assert_eq!(colors, vec!["red", "blue", "green"]);
    }

    #[test]
    fn boundaries_are_half_open() {
        let points = vec![
            post(6, 59, 59),
            post(7, 0, 0),
            post(7, 59, 59),
            post(8, 0, 0),
            post(9, 59, 59),
            post(10, 0, 0),
        ];
        let parts = partition(&points, &TimeBucket::default_set());
        let counts: Vec<_> = parts.iter().map(|p| p.points.len()).collect();
        assert_eq!(counts, vec![2, 1, 1]);
        assert_eq!(parts[1].points[0], post(8, 0, 0));
    }

    #[test]
    fn every_minute_of_the_day_lands_in_at_most_one_bucket() {
        let buckets = TimeBucket::default_set();
        for minute in 0..(24 * 60) {
            let time = NaiveTime::from_hms_opt(minute / 60, minute % 60, 30).unwrap();
            let hits = buckets.iter().filter(|b| b.contains(time)).count();
            let expected = usize::from((7..10).contains(&(minute / 60)));
            assert_eq!(hits, expected, "minute {}", minute);
        }
    }

    #[test]
    fn partition_preserves_source_order() {
        let points = vec![post(7, 45, 0), post(9, 5, 0), post(7, 10, 0), post(7, 30, 0)];
        let parts = partition(&points, &TimeBucket::default_set());
        let minutes: Vec<_> = parts[0]
            .points
            .iter()
            .map(|p| p.timestamp.time().minute())
            .collect();
        assert_eq!(minutes, vec![45, 10, 30]);
        assert!(parts[1].is_empty());
        assert_eq!(parts[2].points.len(), 1);
    }

    #[test]
    fn overlapping_buckets_assign_the_first_match_only() {
        let buckets = vec![TimeBucket::hourly(7, 9, "red"), TimeBucket::hourly(8, 10, "blue")];
        let parts = partition(&[post(8, 30, 0)], &buckets);
        assert_eq!(parts[0].points.len(), 1);
        assert!(parts[1].is_empty());
    }

    #[test]
    fn bucket_can_wrap_past_midnight() {
        let night = TimeBucket::hourly(22, 2, "black");
        assert!(night.contains(NaiveTime::from_hms_opt(23, 0, 0).unwrap()));
        assert!(night.contains(NaiveTime::from_hms_opt(1, 59, 0).unwrap()));
        assert!(!night.contains(NaiveTime::from_hms_opt(2, 0, 0).unwrap()));
        assert!(!night.contains(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
    }
}
