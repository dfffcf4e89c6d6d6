//! SOA serial arithmetic.
//!
//! Serials are either `0` (the server manages them), a plain counter below
//! [`LEGACY_SERIAL_CEILING`], or `YYYYMMDDnn` with a two-digit revision.
use chrono::{Datelike, NaiveDate};

/// Highest serial still treated as a plain counter. Reaching it wraps to 1.
pub const LEGACY_SERIAL_CEILING: u32 = 1_979_999_999;

const MAX_REVISION: u64 = 99;

/// Serial that follows `current` when the zone is changed on `today`.
pub fn next_serial(current: u32, today: NaiveDate) -> u32 {
    if current == 0 {
        return 0;
    }
    if current < LEGACY_SERIAL_CEILING {
        return current + 1;
    }
    if current == LEGACY_SERIAL_CEILING {
        return 1;
    }

    let date_part = u64::from(current / 100);
    let revision = u64::from(current % 100);
    let today_part = date_number(today);

    let next = if date_part == today_part {
        bump(today, revision)
    } else if date_part > today_part {
        match date_from_number(date_part) {
            Some(date) => bump(date, revision),
            None => u64::from(current) + 1,
        }
    } else {
        today_part * 100
    };
    u32::try_from(next).unwrap_or(1)
}

/// First serial of `date`: `YYYYMMDD00`.
pub fn first_serial_of(date: NaiveDate) -> u64 {
    date_number(date) * 100
}

fn bump(date: NaiveDate, revision: u64) -> u64 {
    if revision >= MAX_REVISION {
        first_serial_of(next_date(date))
    } else {
        date_number(date) * 100 + revision + 1
    }
}

/// The day after `date`, or `date` itself at the end of the calendar.
pub fn next_date(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

fn date_number(date: NaiveDate) -> u64 {
    let year = u64::try_from(date.year()).unwrap_or(0);
    year * 10_000 + u64::from(date.month()) * 100 + u64::from(date.day())
}

fn date_from_number(n: u64) -> Option<NaiveDate> {
    let year = i32::try_from(n / 10_000).ok()?;
    let month = u32::try_from(n / 100 % 100).ok()?;
    let day = u32::try_from(n % 100).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Serial field (third) of SOA content.
pub fn soa_serial(content: &str) -> Option<&str> {
    content.split_whitespace().nth(2)
}

/// Replace the serial field of SOA content, leaving the rest as it was.
pub fn set_soa_serial(content: &str, serial: u32) -> String {
    let mut fields: Vec<String> = content.split_whitespace().map(str::to_string).collect();
    if let Some(field) = fields.get_mut(2) {
        *field = serial.to_string();
    }
    fields.join(" ").trim_end().to_string()
}

/// SOA content with its serial advanced for a change made on `today`.
/// Content without a numeric serial is returned unchanged.
pub fn updated_soa_content(content: &str, today: NaiveDate) -> String {
    match soa_serial(content).and_then(|s| s.parse::<u32>().ok()) {
        Some(current) => set_soa_serial(content, next_serial(current, today)),
        None => content.to_string(),
    }
}
