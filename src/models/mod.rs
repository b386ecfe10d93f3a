// Domain models: typed raw samples in, bucketed series out.

mod sample;
mod series;

pub use sample::{RawResourceSample, ResourceReadings};
pub use series::{MetricSeries, UsageResponse, UsageSeries};
