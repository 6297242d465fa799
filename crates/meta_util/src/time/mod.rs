use chrono::{DateTime, Utc};

/// RFC 1123 style UTC timestamp, e.g. `Mon, 19 Oct 2026 08:05:09 GMT`.
pub fn utc_timestamp(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub fn utc_now() -> String {
    utc_timestamp(Utc::now())
}
