//! Public holidays that move restaurant revenue.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// One dated occurrence of a named holiday and the days around it that it affects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub name: &'static str,
    pub date: NaiveDate,
    /// Days before `date` that carry the effect.
    pub lower_window: i64,
    /// Days after `date` that carry the effect.
    pub upper_window: i64,
}

impl Holiday {
    pub fn covers(&self, day: NaiveDate) -> bool {
        day >= self.date - Duration::days(self.lower_window)
            && day <= self.date + Duration::days(self.upper_window)
    }
}

/// (name, month, day, lower window, upper window)
const RUSSIAN_HOLIDAYS: [(&str, u32, u32, i64, i64); 8] = [
    ("new_year", 1, 1, 0, 5),
    ("christmas", 1, 7, 0, 1),
    ("defender_day", 2, 23, 0, 1),
    ("womens_day", 3, 8, 0, 1),
    ("labor_day", 5, 1, 0, 1),
    ("victory_day", 5, 9, 0, 1),
    ("russia_day", 6, 12, 0, 1),
    ("unity_day", 11, 4, 0, 1),
];

/// Every holiday occurrence for the years `first_year..=last_year`, ordered by
/// date.
pub fn russian_holidays(first_year: i32, last_year: i32) -> Vec<Holiday> {
    let mut holidays: Vec<Holiday> = (first_year..=last_year)
        .flat_map(|year| {
            RUSSIAN_HOLIDAYS
                .iter()
                .filter_map(move |&(name, month, day, lower, upper)| {
                    NaiveDate::from_ymd_opt(year, month, day).map(|date| Holiday {
                        name,
                        date,
                        lower_window: lower,
                        upper_window: upper,
                    })
                })
        })
        .collect();
    holidays.sort_by_key(|h| h.date);
    holidays
}
