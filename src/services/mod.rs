//! Business rules behind each action.
//!
//! Services take any `Store` and return domain values; the API layer turns
//! them into response envelopes.

pub mod analytics;
pub mod assignments;
pub mod contact;
pub mod points;
pub mod questions;
pub mod submissions;
pub mod users;

use chrono::{Local, NaiveDate, SecondsFormat, Utc};

/// Current UTC time as an RFC 3339 timestamp with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Today's date in the server's local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Fresh row id such as `Q3f2c…`.
pub fn new_id(prefix: char) -> String {
    format!("{}{}", prefix, uuid::Uuid::new_v4().simple())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_prefixed_and_unique() {
        let a = new_id('Q');
        let b = new_id('Q');
        assert!(a.starts_with('Q'));
        assert_eq!(a.len(), 33);
        assert_ne!(a, b);
    }

    #[test]
    fn test_timestamp_is_rfc3339_utc() {
        let ts = now_timestamp();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
