use chrono::{Days, Months, NaiveDate, Utc};

/// The reference day relative dates are resolved against (UTC).
pub fn current_day() -> NaiveDate {
    Utc::now().naive_utc().date()
}

/// Converts a relative date like "3 weeks ago" into a calendar date counted
/// back from `today`. Unrecognised input yields `today`; never fails.
///
/// Patterns are checked in order, first match wins:
/// "a week ago", "week(s) ago", "day(s) ago", "month(s) ago".
pub fn normalize_relative_date(relative: &str, today: NaiveDate) -> NaiveDate {
    let relative = relative.trim().to_lowercase();

    let shifted = if relative.contains("a week ago") {
        today.checked_sub_days(Days::new(7))
    } else if relative.contains("week ago") || relative.contains("weeks ago") {
        today.checked_sub_days(Days::new(u64::from(extract_number(&relative)) * 7))
    } else if relative.contains("day ago") || relative.contains("days ago") {
        today.checked_sub_days(Days::new(u64::from(extract_number(&relative))))
    } else if relative.contains("month ago") || relative.contains("months ago") {
        today.checked_sub_months(Months::new(extract_number(&relative)))
    } else {
        None
    };

    shifted.unwrap_or(today)
}

/// Drops every non-digit and parses what is left; 1 when nothing parses.
///
/// Lossy on purpose: "in 3 groups, 2 days ago" reads as 32.
fn extract_number(text: &str) -> u32 {
    text.chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(1)
}
