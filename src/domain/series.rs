// Series shaping - Fixed-cadence resampling and display downsampling
use super::telemetry::TimeSeriesPoint;
use chrono::DateTime;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResampleError {
    #[error("resampling would produce {buckets} buckets, limit is {limit}")]
    TooManyBuckets { buckets: u64, limit: usize },
}

/// Re-aligns samples onto a fixed grid of `interval_secs`.
///
/// Samples falling into the same bucket are averaged and each bucket is
/// labelled with its left edge. Empty buckets between the first and last
/// observed bucket are filled by linear interpolation; nothing is produced
/// outside the observed range. The grid spanning first to last bucket may
/// hold at most `max_buckets` entries.
pub fn resample_points(
    points: &[TimeSeriesPoint],
    interval_secs: i64,
    max_buckets: usize,
) -> Result<Vec<TimeSeriesPoint>, ResampleError> {
    let interval = interval_secs.max(1);

    let mut buckets: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for point in points {
        let key = point.time.and_utc().timestamp().div_euclid(interval) * interval;
        let entry = buckets.entry(key).or_insert((0.0, 0));
        entry.0 += point.value;
        entry.1 += 1;
    }

    let observed: Vec<(i64, f64)> = buckets
        .into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect();

    if let (Some(&(first, _)), Some(&(last, _))) = (observed.first(), observed.last()) {
        let buckets = (last - first) as u64 / interval as u64 + 1;
        if buckets > max_buckets as u64 {
            return Err(ResampleError::TooManyBuckets {
                buckets,
                limit: max_buckets,
            });
        }
    }

    let mut resampled = Vec::new();
    for pair in observed.windows(2) {
        let (k0, v0) = pair[0];
        let (k1, v1) = pair[1];
        let mut key = k0;
        while key < k1 {
            let value = v0 + (v1 - v0) * (key - k0) as f64 / (k1 - k0) as f64;
            push_bucket(&mut resampled, key, value);
            key += interval;
        }
    }
    if let Some(&(key, value)) = observed.last() {
        push_bucket(&mut resampled, key, value);
    }

    Ok(resampled)
}

fn push_bucket(out: &mut Vec<TimeSeriesPoint>, key: i64, value: f64) {
    if let Some(time) = DateTime::from_timestamp(key, 0) {
        out.push(TimeSeriesPoint::new(time.naive_utc(), value));
    }
}

/// Downsample time series points by evenly spaced index selection.
///
/// Series at or below `max_points` come back untouched. Longer series keep
/// exactly `max_points` samples, always including the first and last.
pub fn downsample_points(points: Vec<TimeSeriesPoint>, max_points: usize) -> Vec<TimeSeriesPoint> {
    let cap = max_points.max(2);
    if points.len() <= cap {
        return points;
    }

    let last = points.len() - 1;
    let steps = cap - 1;
    points
        .into_iter()
        .enumerate()
        .scan(0usize, |next, (idx, point)| {
            // Selected indices are floor(k * last / steps) for k in 0..=steps.
            if *next <= steps && idx == *next * last / steps {
                *next += 1;
                Some(Some(point))
            } else {
                Some(None)
            }
        })
        .flatten()
        .collect()
}
