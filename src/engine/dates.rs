use chrono::NaiveDate;

use crate::config::BookingPolicy;
use crate::model::*;

use super::BookingError;

/// Parse an ISO calendar day. A trailing `T...` time part (as the API emits
/// for timestamps) is ignored.
pub fn parse_day(s: &str) -> Result<Day, BookingError> {
    let trimmed = s.trim();
    let date_part = trimmed.split('T').next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| BookingError::InvalidDate(s.to_string()))
}

/// Parse a check-in/check-out pair. Malformed input yields `InvalidDate`,
/// a check-out before check-in yields `EndBeforeStart`.
pub fn parse(start: &str, end: &str) -> Result<DateRange, BookingError> {
    let start = parse_day(start)?;
    let end = parse_day(end)?;
    DateRange::new(start, end)
}

pub fn nights_between(range: &DateRange) -> i64 {
    range.nights()
}

pub fn validate_not_past(range: &DateRange, today: Day) -> Result<(), BookingError> {
    if range.start() < today {
        return Err(BookingError::PastDate {
            start: range.start(),
            today,
        });
    }
    Ok(())
}

/// `DateRange` cannot hold `end < start`, so this only guards raw day pairs.
pub fn validate_order(start: Day, end: Day) -> Result<(), BookingError> {
    if end < start {
        return Err(BookingError::EndBeforeStart { start, end });
    }
    Ok(())
}

/// Full candidate check under `policy`: zero-night rule, stay length, and
/// (when enforced) the not-in-the-past rule.
pub fn validate(range: &DateRange, today: Day, policy: &BookingPolicy) -> Result<(), BookingError> {
    if range.is_empty() && !policy.allow_zero_night {
        return Err(BookingError::EndBeforeStart {
            start: range.start(),
            end: range.end(),
        });
    }
    if range.nights() > i64::from(policy.max_nights) {
        return Err(BookingError::LimitExceeded("stay too long"));
    }
    if policy.enforce_not_past {
        validate_not_past(range, today)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Day {
        s.parse().unwrap()
    }

    #[test]
    fn parse_valid_pair() {
        let r = parse("2025-01-10", "2025-01-15").unwrap();
        assert_eq!(r.start(), d("2025-01-10"));
        assert_eq!(nights_between(&r), 5);
    }

    #[test]
    fn parse_strips_time_suffix() {
        assert_eq!(parse_day("2025-01-10T14:00:00Z").unwrap(), d("2025-01-10"));
        assert_eq!(parse_day(" 2025-01-10 ").unwrap(), d("2025-01-10"));
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", "2025-13-01", "2025-02-30", "10.01.2025", "tomorrow"] {
            assert_eq!(
                parse_day(bad),
                Err(BookingError::InvalidDate(bad.to_string())),
                "{bad}"
            );
        }
        assert!(matches!(
            parse("2025-01-10", "nope"),
            Err(BookingError::InvalidDate(_))
        ));
    }

    #[test]
    fn parse_rejects_reversed_pair() {
        assert!(matches!(
            parse("2025-01-15", "2025-01-10"),
            Err(BookingError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn same_day_is_zero_nights() {
        let r = parse("2025-01-10", "2025-01-10").unwrap();
        assert_eq!(nights_between(&r), 0);
    }

    #[test]
    fn not_past() {
        let r = parse("2025-01-10", "2025-01-12").unwrap();
        assert!(validate_not_past(&r, d("2025-01-10")).is_ok());
        assert!(validate_not_past(&r, d("2025-01-01")).is_ok());
        assert_eq!(
            validate_not_past(&r, d("2025-01-11")),
            Err(BookingError::PastDate {
                start: d("2025-01-10"),
                today: d("2025-01-11")
            })
        );
    }

    #[test]
    fn order() {
        assert!(validate_order(d("2025-01-10"), d("2025-01-10")).is_ok());
        assert!(validate_order(d("2025-01-10"), d("2025-01-11")).is_ok());
        assert!(validate_order(d("2025-01-10"), d("2025-01-09")).is_err());
    }

    #[test]
    fn validate_under_policy() {
        let today = d("2025-01-01");
        let zero = parse("2025-01-10", "2025-01-10").unwrap();
        let mut policy = BookingPolicy::default();
        assert!(validate(&zero, today, &policy).is_ok());

        policy.allow_zero_night = false;
        assert!(matches!(
            validate(&zero, today, &policy),
            Err(BookingError::EndBeforeStart { .. })
        ));

        policy.max_nights = 3;
        let long = parse("2025-01-10", "2025-01-14").unwrap();
        assert_eq!(
            validate(&long, today, &policy),
            Err(BookingError::LimitExceeded("stay too long"))
        );

        let past = parse("2024-12-30", "2025-01-02").unwrap();
        assert!(matches!(
            validate(&past, today, &policy),
            Err(BookingError::PastDate { .. })
        ));
        policy.enforce_not_past = false;
        assert!(validate(&past, today, &policy).is_ok());
    }
}
