//! Display formatting for dates and times in read responses

use chrono::{NaiveDate, NaiveTime};

/// `"October 16, 2026"`, or `"Not provided"`.
pub fn display_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => "Not provided".to_string(),
    }
}

/// `"9:05 AM"`, or `"Not specified"`.
pub fn display_time(time: Option<NaiveTime>) -> String {
    match time {
        Some(time) => time.format("%-I:%M %p").to_string(),
        None => "Not specified".to_string(),
    }
}
