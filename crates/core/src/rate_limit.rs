//! Rate-limit header parsing

use chrono::{DateTime, Utc};

pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// Quota snapshot taken from the last response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: u64,
    pub remaining: u64,
    pub reset: Option<DateTime<Utc>>,
}

impl RateLimitInfo {
    /// Build a snapshot from `(name, value)` header pairs
    ///
    /// Header names are matched case-insensitively. Returns `None` unless both
    /// the limit and remaining headers are present and numeric. The reset
    /// header may be a unix timestamp in seconds or an RFC 3339 date.
    pub fn from_headers<'a, I>(headers: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut limit = None;
        let mut remaining = None;
        let mut reset = None;

        for (name, value) in headers {
            let value = value.trim();
            if name.eq_ignore_ascii_case(LIMIT_HEADER) {
                limit = value.parse::<u64>().ok();
            } else if name.eq_ignore_ascii_case(REMAINING_HEADER) {
                remaining = value.parse::<u64>().ok();
            } else if name.eq_ignore_ascii_case(RESET_HEADER) {
                reset = parse_reset(value);
            }
        }

        Some(Self {
            limit: limit?,
            remaining: remaining?,
            reset,
        })
    }

    /// At or below 10% of the quota
    pub fn is_low(&self) -> bool {
        self.remaining.saturating_mul(10) <= self.limit
    }
}

impl std::fmt::Display for RateLimitInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} requests remaining", self.remaining, self.limit)?;
        if let Some(reset) = self.reset {
            write!(f, ", resets at {}", reset.to_rfc3339())?;
        }
        Ok(())
    }
}

fn parse_reset(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(seconds) = value.parse::<i64>() {
        return DateTime::from_timestamp(seconds, 0);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_headers() {
        let info = RateLimitInfo::from_headers([
            ("X-RateLimit-Limit", "100"),
            ("x-ratelimit-remaining", " 42 "),
            ("x-ratelimit-reset", "1700000000"),
            ("content-type", "application/json"),
        ])
        .unwrap();

        assert_eq!(info.limit, 100);
        assert_eq!(info.remaining, 42);
        assert_eq!(info.reset, DateTime::from_timestamp(1_700_000_000, 0));
        assert!(!info.is_low());
    }

    #[test]
    fn test_rfc3339_reset() {
        let info = RateLimitInfo::from_headers([
            ("x-ratelimit-limit", "10"),
            ("x-ratelimit-remaining", "1"),
            ("x-ratelimit-reset", "2024-05-01T12:00:00Z"),
        ])
        .unwrap();

        assert_eq!(
            info.reset.map(|reset| reset.to_rfc3339()),
            Some("2024-05-01T12:00:00+00:00".to_string())
        );
        assert!(info.is_low());
    }

    #[test]
    fn test_missing_headers() {
        assert_eq!(RateLimitInfo::from_headers([("x-ratelimit-limit", "10")]), None);
        assert_eq!(
            RateLimitInfo::from_headers([
                ("x-ratelimit-limit", "ten"),
                ("x-ratelimit-remaining", "1"),
            ]),
            None
        );
    }

    #[test]
    fn test_display() {
        let info = RateLimitInfo {
            limit: 100,
            remaining: 5,
            reset: None,
        };
        assert_eq!(info.to_string(), "5/100 requests remaining");
    }
}
