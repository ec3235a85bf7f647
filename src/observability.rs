use crate::engine::BookingError;

// No recorder is installed here; the host application chooses the exporter.

/// Counter: candidate ranges rejected because of an overlapping reservation.
pub const CONFLICTS_DETECTED_TOTAL: &str = "cabana_conflicts_detected_total";

/// Counter: validation failures. Labels: kind.
pub const VALIDATION_FAILURES_TOTAL: &str = "cabana_validation_failures_total";

/// Counter: price quotes produced.
pub const QUOTES_TOTAL: &str = "cabana_quotes_total";

/// Counter: resident slots dropped by a guest-count shrink.
pub const ROSTER_SLOTS_DISCARDED_TOTAL: &str = "cabana_roster_slots_discarded_total";

/// Count a failed validation under its kind label.
pub fn record_failure(err: &BookingError) {
    metrics::counter!(VALIDATION_FAILURES_TOTAL, "kind" => err.kind()).increment(1);
    if matches!(err, BookingError::ConflictDetected(_)) {
        metrics::counter!(CONFLICTS_DETECTED_TOTAL).increment(1);
    }
}

/// Pass a result through, counting it if it failed.
pub fn observe<T>(result: Result<T, BookingError>) -> Result<T, BookingError> {
    if let Err(e) = &result {
        record_failure(e);
    }
    result
}
