use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::window::{Granularity, ResolvedWindow};

/// Seven parallel sub-series for one of cpu/memory, unit-converted and
/// averaged per bucket. `None` = no contributing day had a value ("no data",
/// deliberately distinct from 0). Each vector is axis-length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeries {
    pub min_usage: Vec<Option<f64>>,
    pub average_usage: Vec<Option<f64>>,
    pub max_usage: Vec<Option<f64>>,
    pub recommended_limits: Vec<Option<f64>>,
    pub recommended_requests: Vec<Option<f64>>,
    pub actual_limits: Vec<Option<f64>>,
    pub actual_requests: Vec<Option<f64>>,
}

/// The final bucketed output: one date-ordered axis (days, week-Mondays, or
/// month-firsts) with parallel value arrays. CPU in cores, memory in decimal GB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSeries {
    pub granularity: Granularity,
    pub dates: Vec<NaiveDate>,
    pub pod_count: Vec<Option<f64>>,
    pub cpu: MetricSeries,
    pub memory: MetricSeries,
}

/// Wire shape of GET /api/usage/{entity}. Cached as a whole by the
/// cache-aside layer, so it round-trips through serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub entity: String,
    pub app_groups: Vec<String>,
    pub window: ResolvedWindow,
    pub series: UsageSeries,
    /// Series for the preceding window of equal length, when compare=true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<UsageSeries>,
    /// Deep link into the vendor UI scoped to the same groups and window.
    pub source_url: String,
}
