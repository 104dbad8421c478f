use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Long-form date, e.g. "Sunday, October 18, 2026"
pub const ANCHOR_DATE_FORMAT: &str = "%A, %B %-d, %Y";

/// Format the calendar date of `now` in `tz` for use as the prompt's anchor date
pub fn anchor_date(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz).format(ANCHOR_DATE_FORMAT).to_string()
}

/// Anchor date for the current instant
pub fn today(tz: Tz) -> String {
    anchor_date(Utc::now(), tz)
}
