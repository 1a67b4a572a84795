//! War calendar
//!
//! Maps the tick counter onto a civil date. One tick is one hour.

use serde::{Deserialize, Serialize};

use super::types::Tick;

pub const HOURS_PER_DAY: u64 = 24;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Proleptic Gregorian date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month) && self.day >= 1 && self.day <= days_in_month(self.year, self.month)
    }

    /// Days since 1970-01-01
    fn to_days(self) -> i64 {
        let m = i64::from(self.month);
        let y = i64::from(self.year) - i64::from(m <= 2);
        let era = (if y >= 0 { y } else { y - 399 }) / 400;
        let yoe = y - era * 400;
        let mp = if m > 2 { m - 3 } else { m + 9 };
        let doy = (153 * mp + 2) / 5 + i64::from(self.day) - 1;
        let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
        era * 146_097 + doe - 719_468
    }

    fn from_days(days: i64) -> Self {
        let z = days + 719_468;
        let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
        let doe = z - era * 146_097;
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = doy - (153 * mp + 2) / 5 + 1;
        let month = if mp < 10 { mp + 3 } else { mp - 9 };
        let year = yoe + era * 400 + i64::from(month <= 2);
        Self {
            year: year as i32,
            month: month as u32,
            day: day as u32,
        }
    }

    pub fn plus_days(self, days: u64) -> Self {
        Self::from_days(self.to_days() + days as i64)
    }
}

impl Default for CalendarDate {
    fn default() -> Self {
        Self::new(1939, 9, 1)
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let month = MONTH_NAMES
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("?");
        write!(f, "{} {} {}", self.day, month, self.year)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => 31,
    }
}

/// Calendar tracks simulated time with hour granularity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarCalendar {
    start: CalendarDate,
    tick: Tick,
}

impl WarCalendar {
    pub fn new(start: CalendarDate) -> Self {
        Self { start, tick: 0 }
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn current_day(&self) -> u64 {
        self.tick / HOURS_PER_DAY
    }

    pub fn current_hour(&self) -> u32 {
        (self.tick % HOURS_PER_DAY) as u32
    }

    pub fn current_date(&self) -> CalendarDate {
        self.start.plus_days(self.current_day())
    }

    pub fn start_date(&self) -> CalendarDate {
        self.start
    }
}

impl Default for WarCalendar {
    fn default() -> Self {
        Self::new(CalendarDate::default())
    }
}
