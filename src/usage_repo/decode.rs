// Upstream payload decode: loosely-typed nested JSON in, explicit
// present/absent `RawResourceSample` fields out. Missing or malformed fields
// decode to `None`; an unparseable timestamp drops the entry.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::{RawResourceSample, ResourceReadings};

/// One page of the paginated usage query.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UsagePage {
    pub resources: Vec<UpstreamResource>,
}

/// One underlying resource (container/workload instance) with its daily series.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpstreamResource {
    pub series: Vec<UpstreamEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpstreamEntry {
    pub timestamp: String,
    pub usage: Option<UpstreamUsage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamUsage {
    pub average_pod_count: Option<f64>,
    pub min_usage: Option<UpstreamMagnitudes>,
    pub average_usage: Option<UpstreamMagnitudes>,
    pub max_usage: Option<UpstreamMagnitudes>,
    pub recommendation: Option<UpstreamBounds>,
    pub settings: Option<UpstreamBounds>,
}

/// Raw cpu/memory magnitudes: milli-cores and bytes.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct UpstreamMagnitudes {
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpstreamBounds {
    pub limits: Option<UpstreamMagnitudes>,
    pub requests: Option<UpstreamMagnitudes>,
}

/// Decodes every entry of one resource's series, appending the well-dated ones.
pub fn append_resource_samples(resource: &UpstreamResource, out: &mut Vec<RawResourceSample>) {
    for entry in &resource.series {
        if let Some(sample) = sample_from_entry(entry) {
            out.push(sample);
        }
    }
}

/// One entry -> one sample. Only the first 10 chars of the timestamp matter
/// (the calendar day; time-of-day is discarded).
pub fn sample_from_entry(entry: &UpstreamEntry) -> Option<RawResourceSample> {
    let day = entry.timestamp.get(..10)?;
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;

    let mut sample = RawResourceSample::new(date);
    let Some(usage) = &entry.usage else {
        return Some(sample);
    };
    sample.pod_count = usage.average_pod_count;
    sample.cpu = readings(usage, |m| m.cpu);
    sample.memory = readings(usage, |m| m.memory);
    Some(sample)
}

fn readings<F>(usage: &UpstreamUsage, pick: F) -> ResourceReadings
where
    F: Fn(&UpstreamMagnitudes) -> Option<f64> + Copy,
{
    ResourceReadings {
        min_usage: usage.min_usage.as_ref().and_then(pick),
        average_usage: usage.average_usage.as_ref().and_then(pick),
        max_usage: usage.max_usage.as_ref().and_then(pick),
        recommended_limits: bound(&usage.recommendation, |b| &b.limits, pick),
        recommended_requests: bound(&usage.recommendation, |b| &b.requests, pick),
        actual_limits: bound(&usage.settings, |b| &b.limits, pick),
        actual_requests: bound(&usage.settings, |b| &b.requests, pick),
    }
}

fn bound<S, F>(bounds: &Option<UpstreamBounds>, side: S, pick: F) -> Option<f64>
where
    S: Fn(&UpstreamBounds) -> &Option<UpstreamMagnitudes>,
    F: Fn(&UpstreamMagnitudes) -> Option<f64>,
{
    bounds.as_ref().and_then(|b| side(b).as_ref()).and_then(pick)
}
