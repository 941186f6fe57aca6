// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::{LedgerError, LedgerResult};

/// Strict "YYYY-MM-DD" parse.
pub fn parse_date(s: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| LedgerError::validation(["date"]))
}

/// Strict "YYYY-MM" validation; returns the token unchanged.
pub fn parse_month(s: &str) -> LedgerResult<String> {
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .map_err(|_| LedgerError::validation(["yearMonth"]))?;
    Ok(s.to_string())
}

/// Expands a loosely-specified date token into an inclusive start /
/// exclusive end pair of "YYYY-MM-DD" strings. "2024" covers the whole
/// year, "2024-06" the month, "2024-06-15" the single day.
pub fn date_range(token: &str) -> LedgerResult<(String, String)> {
    let parts: Vec<&str> = token.split('-').collect();
    let invalid = || LedgerError::validation(["date"]);

    let (start, end) = match parts.len() {
        1 => {
            let year: i32 = parts[0].parse().map_err(|_| invalid())?;
            let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
            let end = NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or_else(invalid)?;
            (start, end)
        }
        2 => {
            let year: i32 = parts[0].parse().map_err(|_| invalid())?;
            let month: u32 = parts[1].parse().map_err(|_| invalid())?;
            let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
            let end = start.checked_add_months(Months::new(1)).ok_or_else(invalid)?;
            (start, end)
        }
        3 => {
            let start = parse_date(token)?;
            let end = start.checked_add_days(Days::new(1)).ok_or_else(invalid)?;
            (start, end)
        }
        _ => return Err(invalid()),
    };

    Ok((start.to_string(), end.to_string()))
}

/// Advances a date by whole calendar months, clamping at month end
/// (2024-01-31 + 1 month = 2024-02-29).
pub fn add_months(date: NaiveDate, months: u32) -> LedgerResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| LedgerError::validation(["date"]))
}

/// "YYYY-MM" token for a date.
pub fn year_month(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
