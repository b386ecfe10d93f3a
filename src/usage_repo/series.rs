// Merge & downsample: raw per-resource daily samples in, one date-ordered,
// unit-normalized series per sub-metric out. Pure and synchronous; the axis
// comes from calendar-day enumeration of the window, never from which dates
// happen to have data.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{MetricSeries, RawResourceSample, ResourceReadings, UsageSeries};
use crate::window::{self, ResolvedWindow};

const MILLICORES_PER_CORE: f64 = 1000.0;
const BYTES_PER_DECIMAL_GB: f64 = 1e9;

/// Per-date accumulation across all samples sharing a calendar date.
/// Sub-metric sums treat an absent reading as a zero contribution; presence is
/// tracked only by map membership (a date with zero samples has no entry).
#[derive(Debug, Clone, Default)]
struct DayMerged {
    pod_count_sum: f64,
    pod_count_n: u32,
    cpu: ReadingSums,
    memory: ReadingSums,
}

impl DayMerged {
    /// Per-date mean of raw pod counts; None when no sample carried one.
    fn pod_count(&self) -> Option<f64> {
        (self.pod_count_n > 0).then(|| self.pod_count_sum / self.pod_count_n as f64)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ReadingSums {
    min_usage: f64,
    average_usage: f64,
    max_usage: f64,
    recommended_limits: f64,
    recommended_requests: f64,
    actual_limits: f64,
    actual_requests: f64,
}

impl ReadingSums {
    fn add(&mut self, r: &ResourceReadings) {
        self.min_usage += r.min_usage.unwrap_or(0.0);
        self.average_usage += r.average_usage.unwrap_or(0.0);
        self.max_usage += r.max_usage.unwrap_or(0.0);
        self.recommended_limits += r.recommended_limits.unwrap_or(0.0);
        self.recommended_requests += r.recommended_requests.unwrap_or(0.0);
        self.actual_limits += r.actual_limits.unwrap_or(0.0);
        self.actual_requests += r.actual_requests.unwrap_or(0.0);
    }
}

/// Builds the bucketed series for a window: merge by date, average within each
/// bucket, then convert units (milli-cores -> cores, bytes -> decimal GB).
pub fn build_series(samples: &[RawResourceSample], window: &ResolvedWindow) -> UsageSeries {
    let merged = merge_by_date(samples);
    let buckets = bucket_axis(window);

    let dates: Vec<NaiveDate> = buckets.iter().map(|(key, _)| *key).collect();
    let pod_count = bucket_means(&buckets, &merged, 1.0, |day| day.pod_count());
    let cpu = metric_series(&buckets, &merged, MILLICORES_PER_CORE, |day| &day.cpu);
    let memory = metric_series(&buckets, &merged, BYTES_PER_DECIMAL_GB, |day| &day.memory);

    UsageSeries {
        granularity: window.granularity,
        dates,
        pod_count,
        cpu,
        memory,
    }
}

fn merge_by_date(samples: &[RawResourceSample]) -> BTreeMap<NaiveDate, DayMerged> {
    let mut merged: BTreeMap<NaiveDate, DayMerged> = BTreeMap::new();
    for sample in samples {
        let day = merged.entry(sample.date).or_default();
        if let Some(pods) = sample.pod_count {
            day.pod_count_sum += pods;
            day.pod_count_n += 1;
        }
        day.cpu.add(&sample.cpu);
        day.memory.add(&sample.memory);
    }
    merged
}

/// Sorted bucket keys with their member days. Built once per request and
/// shared across the pod-count series and all fourteen cpu/memory sub-series.
fn bucket_axis(window: &ResolvedWindow) -> Vec<(NaiveDate, Vec<NaiveDate>)> {
    let mut buckets: BTreeMap<NaiveDate, Vec<NaiveDate>> = BTreeMap::new();
    for day in window.days() {
        buckets
            .entry(window::bucket_key(day, window.granularity))
            .or_default()
            .push(day);
    }
    buckets.into_iter().collect()
}

/// Per-bucket mean over member days that have a value; a bucket with zero such
/// days is None ("no data"), never 0. The divisor converts units after averaging.
fn bucket_means<F>(
    buckets: &[(NaiveDate, Vec<NaiveDate>)],
    merged: &BTreeMap<NaiveDate, DayMerged>,
    divisor: f64,
    value: F,
) -> Vec<Option<f64>>
where
    F: Fn(&DayMerged) -> Option<f64>,
{
    buckets
        .iter()
        .map(|(_, days)| {
            let present: Vec<f64> = days
                .iter()
                .filter_map(|d| merged.get(d).and_then(&value))
                .collect();
            if present.is_empty() {
                return None;
            }
            let mean = present.iter().sum::<f64>() / present.len() as f64;
            Some(mean / divisor)
        })
        .collect()
}

fn metric_series<S>(
    buckets: &[(NaiveDate, Vec<NaiveDate>)],
    merged: &BTreeMap<NaiveDate, DayMerged>,
    divisor: f64,
    select: S,
) -> MetricSeries
where
    S: Fn(&DayMerged) -> &ReadingSums + Copy,
{
    MetricSeries {
        min_usage: bucket_means(buckets, merged, divisor, move |d| Some(select(d).min_usage)),
        average_usage: bucket_means(buckets, merged, divisor, move |d| {
            Some(select(d).average_usage)
        }),
        max_usage: bucket_means(buckets, merged, divisor, move |d| Some(select(d).max_usage)),
        recommended_limits: bucket_means(buckets, merged, divisor, move |d| {
            Some(select(d).recommended_limits)
        }),
        recommended_requests: bucket_means(buckets, merged, divisor, move |d| {
            Some(select(d).recommended_requests)
        }),
        actual_limits: bucket_means(buckets, merged, divisor, move |d| {
            Some(select(d).actual_limits)
        }),
        actual_requests: bucket_means(buckets, merged, divisor, move |d| {
            Some(select(d).actual_requests)
        }),
    }
}
