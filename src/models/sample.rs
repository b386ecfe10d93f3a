use chrono::NaiveDate;

/// One upstream reading for one resource on one calendar day, decoded into
/// explicit present/absent fields at the ingestion boundary. Several resources
/// may report the same date; merging across them happens in the series engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResourceSample {
    pub date: NaiveDate,
    /// Average pod count reported for the day, if measured.
    pub pod_count: Option<f64>,
    /// CPU readings in milli-cores.
    pub cpu: ResourceReadings,
    /// Memory readings in bytes.
    pub memory: ResourceReadings,
}

impl RawResourceSample {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            ..Default::default()
        }
    }
}

/// The seven per-resource sub-metrics for one of cpu/memory, in the upstream's
/// native unit. `None` means the upstream did not report the field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceReadings {
    pub min_usage: Option<f64>,
    pub average_usage: Option<f64>,
    pub max_usage: Option<f64>,
    pub recommended_limits: Option<f64>,
    pub recommended_requests: Option<f64>,
    pub actual_limits: Option<f64>,
    pub actual_requests: Option<f64>,
}
