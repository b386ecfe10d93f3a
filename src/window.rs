// Calendar window resolution: named presets -> [start, end] UTC instants plus
// the downsampling granularity charts should use for that span. All date math
// is UTC; week buckets start on Monday.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Named date-window shorthand accepted by the API (`?window=`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    SevenDays,
    ThirtyDays,
    YearRolling,
    LastMonth,
    MonthToDate,
    LastQuarter,
    QuarterToDate,
    LastYear,
    YearToDate,
}

impl Preset {
    /// Parses a preset name. Unknown input degrades to `30d` rather than erroring.
    pub fn parse(s: &str) -> Preset {
        match s {
            "7d" => Preset::SevenDays,
            "30d" => Preset::ThirtyDays,
            "365d" => Preset::YearRolling,
            "last_month" => Preset::LastMonth,
            "mtd" => Preset::MonthToDate,
            "last_quarter" => Preset::LastQuarter,
            "qtd" => Preset::QuarterToDate,
            "last_year" => Preset::LastYear,
            "ytd" => Preset::YearToDate,
            other => {
                tracing::debug!(preset = other, "unknown window preset, using 30d");
                Preset::ThirtyDays
            }
        }
    }

    pub fn granularity(self) -> Granularity {
        match self {
            Preset::SevenDays | Preset::ThirtyDays | Preset::LastMonth | Preset::MonthToDate => {
                Granularity::Daily
            }
            Preset::YearRolling | Preset::LastQuarter | Preset::QuarterToDate => Granularity::Weekly,
            Preset::LastYear | Preset::YearToDate => Granularity::Monthly,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::SevenDays => "7d",
            Preset::ThirtyDays => "30d",
            Preset::YearRolling => "365d",
            Preset::LastMonth => "last_month",
            Preset::MonthToDate => "mtd",
            Preset::LastQuarter => "last_quarter",
            Preset::QuarterToDate => "qtd",
            Preset::LastYear => "last_year",
            Preset::YearToDate => "ytd",
        }
    }
}

/// Bucket size on the output time axis; serializes lowercase (e.g. "weekly").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

/// A resolved window: inclusive UTC instants (end clamped to 23:59:59.999)
/// plus the granularity to downsample to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub granularity: Granularity,
}

impl ResolvedWindow {
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Every UTC calendar day from start to end, inclusive. This is the default
    /// axis even for days with no samples.
    pub fn days(&self) -> Vec<NaiveDate> {
        enumerate_days(self.start_date(), self.end_date())
    }

    /// The window of equal day-length immediately preceding this one,
    /// used for current-vs-previous comparisons.
    pub fn previous(&self) -> ResolvedWindow {
        let len = self.days().len() as u64;
        let prev_end = self
            .start_date()
            .checked_sub_days(Days::new(1))
            .unwrap_or(self.start_date());
        let prev_start = prev_end
            .checked_sub_days(Days::new(len.saturating_sub(1)))
            .unwrap_or(prev_end);
        ResolvedWindow {
            start: day_start(prev_start),
            end: day_end(prev_end),
            granularity: self.granularity,
        }
    }
}

/// Resolves a preset against an explicit "now" (tests pin this).
pub fn resolve_at(preset: Preset, now: DateTime<Utc>) -> ResolvedWindow {
    let today = now.date_naive();
    let (start, end) = match preset {
        Preset::SevenDays => (rolling_start(today, 7), today),
        Preset::ThirtyDays => (rolling_start(today, 30), today),
        Preset::YearRolling => (rolling_start(today, 365), today),
        Preset::LastMonth => {
            let this_month = month_start(today);
            let prev = this_month
                .checked_sub_months(Months::new(1))
                .unwrap_or(this_month);
            (prev, last_day_before(this_month))
        }
        Preset::MonthToDate => (month_start(today), today),
        Preset::LastQuarter => {
            // checked_sub_months rolls the year back when the current quarter is Q1
            let this_quarter = quarter_start(today);
            let prev = this_quarter
                .checked_sub_months(Months::new(3))
                .unwrap_or(this_quarter);
            (prev, last_day_before(this_quarter))
        }
        Preset::QuarterToDate => (quarter_start(today), today),
        Preset::LastYear => {
            let jan1 = year_start(today);
            let prev = jan1.checked_sub_months(Months::new(12)).unwrap_or(jan1);
            (prev, last_day_before(jan1))
        }
        Preset::YearToDate => (year_start(today), today),
    };
    ResolvedWindow {
        start: day_start(start),
        end: day_end(end),
        granularity: preset.granularity(),
    }
}

/// Resolves a preset against the current UTC time.
pub fn resolve(preset: Preset) -> ResolvedWindow {
    resolve_at(preset, Utc::now())
}

/// The bucket key a date belongs to: the date itself (daily), the Monday of
/// its week (weekly), or the first of its month (monthly).
pub fn bucket_key(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Daily => date,
        Granularity::Weekly => week_start(date),
        Granularity::Monthly => month_start(date),
    }
}

/// Monday of the week containing `date`; Sunday maps six days back.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_monday();
    date.checked_sub_days(Days::new(back as u64)).unwrap_or(date)
}

/// First day of the calendar month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the calendar quarter (Jan/Apr/Jul/Oct) containing `date`.
pub fn quarter_start(date: NaiveDate) -> NaiveDate {
    let month = date.month0() / 3 * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

/// Inclusive sequence of calendar days from `start` to `end`; empty if reversed.
pub fn enumerate_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    start.iter_days().take_while(|d| *d <= end).collect()
}

fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

/// Start date of an n-day rolling window ending today, inclusive of today.
fn rolling_start(today: NaiveDate, len_days: u64) -> NaiveDate {
    today
        .checked_sub_days(Days::new(len_days.saturating_sub(1)))
        .unwrap_or(today)
}

fn last_day_before(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(1)).unwrap_or(date)
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn day_end(date: NaiveDate) -> DateTime<Utc> {
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(end_of_day).and_utc()
}
