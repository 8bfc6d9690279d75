// Date window - Inclusive calendar-day range used to filter telemetry
use chrono::{NaiveDate, NaiveDateTime, Timelike};

const LAST_SECOND_OF_DAY: u32 = 86_399;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A window only exists when both bounds are supplied.
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Some(Self::new(start, end)),
            _ => None,
        }
    }

    /// True for `start 00:00:00 <= time <= end 23:59:59`.
    pub fn contains(&self, time: &NaiveDateTime) -> bool {
        let date = time.date();
        if date < self.start || date > self.end {
            return false;
        }
        if date == self.end {
            let t = time.time();
            // Sub-second remainders of 23:59:59 (and leap seconds) fall past the bound.
            return !(t.num_seconds_from_midnight() == LAST_SECOND_OF_DAY && t.nanosecond() > 0);
        }
        true
    }
}
