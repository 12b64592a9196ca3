//! Calendar helpers for a daily time step.
//!
//! Days of year are 1-based (`1..=365` or `1..=366`); zero-based indices are
//! named `doy0`.

/// Number of weeks used by weekly climate statistics (day 365/366 falls in week 53).
pub const MAX_WEEKS: usize = 53;

/// Maximum number of days in a year.
pub const MAX_DAYS: usize = 366;

const DAYS_IN_MONTH: [usize; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Whether `year` is a Gregorian leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `year`.
pub fn year_length(year: i32) -> usize {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Number of days in zero-based `month` of `year`.
pub fn days_in_month(month: usize, year: i32) -> usize {
    if month == 1 && is_leap_year(year) {
        29
    } else {
        DAYS_IN_MONTH[month % 12]
    }
}

/// Zero-based day of year on which zero-based `month` starts.
pub fn month_start_doy0(month: usize, year: i32) -> usize {
    (0..month.min(12)).map(|m| days_in_month(m, year)).sum()
}

/// Zero-based month containing the 1-based day of year `doy`.
pub fn month_of_doy(doy: usize, year: i32) -> usize {
    let mut remaining = doy.max(1);
    for m in 0..12 {
        let n = days_in_month(m, year);
        if remaining <= n {
            return m;
        }
        remaining -= n;
    }
    11
}

/// Zero-based week of the 1-based day of year `doy`.
pub fn week_of_doy(doy: usize) -> usize {
    (doy.max(1) - 1) / 7
}
