use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Reporting window. `end` is exclusive on the billing API side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BillingPeriod {
    /// Move `end` back by `days`, never before `start`.
    pub fn with_end_offset(&self, days: u32) -> Self {
        let end = (self.end - Duration::days(i64::from(days))).max(self.start);
        Self {
            start: self.start,
            end,
        }
    }
}

/// How far each query's end date sits before today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryOffsets {
    pub total_end_days: u32,
    pub services_end_days: u32,
}

impl Default for BoundaryOffsets {
    fn default() -> Self {
        Self {
            total_end_days: 1,
            services_end_days: 0,
        }
    }
}

/// The two windows a report queries: the headline total and the
/// per-service breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindows {
    pub total: BillingPeriod,
    pub services: BillingPeriod,
}

impl ReportWindows {
    pub fn resolve(today: NaiveDate, offsets: BoundaryOffsets) -> Self {
        let base = resolve(today);
        Self {
            total: base.with_end_offset(offsets.total_end_days),
            services: base.with_end_offset(offsets.services_end_days),
        }
    }
}

/// Period from the start of the month up to `today`. On the 1st the period
/// starts at the beginning of the previous month instead.
pub fn resolve(today: NaiveDate) -> BillingPeriod {
    let month_start = first_of_month(today);
    let start = if today.day() == 1 {
        first_of_month(month_start - Duration::days(1))
    } else {
        month_start
    };
    BillingPeriod { start, end: today }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}
