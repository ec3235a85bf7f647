use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::limits::{MAX_GUESTS, MAX_NIGHTS};

/// Business rules the engine validates against. Hosts load it once from the
/// settings page payload or the environment and pass it by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingPolicy {
    /// Accept check-out on the check-in day (a 0-night stay).
    pub allow_zero_night: bool,
    /// Reject stays starting before today.
    pub enforce_not_past: bool,
    pub max_nights: u32,
    /// Primary customer included.
    pub max_guests: u32,
    /// First column of the calendar grid.
    pub week_start: Weekday,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            allow_zero_night: true,
            enforce_not_past: true,
            max_nights: MAX_NIGHTS,
            max_guests: MAX_GUESTS,
            week_start: Weekday::Mon,
        }
    }
}

impl BookingPolicy {
    /// Read `CABANA_*` variables; absent or unparsable values keep the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = Self {
            allow_zero_night: lookup("CABANA_ALLOW_ZERO_NIGHT")
                .and_then(|s| parse_flag(&s))
                .unwrap_or(defaults.allow_zero_night),
            enforce_not_past: lookup("CABANA_ENFORCE_NOT_PAST")
                .and_then(|s| parse_flag(&s))
                .unwrap_or(defaults.enforce_not_past),
            max_nights: lookup("CABANA_MAX_NIGHTS")
                .and_then(|s| s.parse().ok())
                .map(|n: u32| n.min(MAX_NIGHTS))
                .unwrap_or(defaults.max_nights),
            max_guests: lookup("CABANA_MAX_GUESTS")
                .and_then(|s| s.parse().ok())
                .map(|n: u32| n.clamp(1, MAX_GUESTS))
                .unwrap_or(defaults.max_guests),
            week_start: lookup("CABANA_WEEK_START")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.week_start),
        };
        tracing::debug!(?parsed, "booking policy loaded");
        parsed
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let p = BookingPolicy::default();
        assert!(p.allow_zero_night);
        assert!(p.enforce_not_past);
        assert_eq!(p.max_nights, MAX_NIGHTS);
        assert_eq!(p.week_start, Weekday::Mon);
    }

    #[test]
    fn env_overrides() {
        let p = BookingPolicy::from_lookup(lookup_from(&[
            ("CABANA_ALLOW_ZERO_NIGHT", "no"),
            ("CABANA_MAX_NIGHTS", "30"),
            ("CABANA_MAX_GUESTS", "8"),
            ("CABANA_WEEK_START", "sun"),
        ]));
        assert!(!p.allow_zero_night);
        assert!(p.enforce_not_past);
        assert_eq!(p.max_nights, 30);
        assert_eq!(p.max_guests, 8);
        assert_eq!(p.week_start, Weekday::Sun);
    }

    #[test]
    fn env_garbage_falls_back() {
        let p = BookingPolicy::from_lookup(lookup_from(&[
            ("CABANA_ENFORCE_NOT_PAST", "maybe"),
            ("CABANA_MAX_NIGHTS", "-1"),
            ("CABANA_MAX_GUESTS", "100000"),
        ]));
        assert!(p.enforce_not_past);
        assert_eq!(p.max_nights, MAX_NIGHTS);
        assert_eq!(p.max_guests, MAX_GUESTS); // clamped
    }

    #[test]
    fn json_partial_payload() {
        let json = r#"{"allow_zero_night": false, "week_start": "Sun"}"#;
        let p = BookingPolicy::from_json(json).unwrap();
        assert!(!p.allow_zero_night);
        assert_eq!(p.week_start, Weekday::Sun);
        assert_eq!(p.max_guests, MAX_GUESTS);
    }
}
