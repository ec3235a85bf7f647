use crate::model::{Day, ReservationId};

/// Every failure here is a local, user-facing validation outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    #[error("start date {start} is before today ({today})")]
    PastDate { start: Day, today: Day },

    #[error("check-out {end} must be after check-in {start}")]
    EndBeforeStart { start: Day, end: Day },

    #[error("conflict with reservation: {0}")]
    ConflictDetected(ReservationId),

    #[error("negative amount: {0}")]
    NegativeAmount(&'static str),

    #[error("resident name missing in slots: {0:?}")]
    IncompleteRoster(Vec<usize>),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid reservation snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("limit exceeded: {0}")]
    LimitExceeded(&'static str),
}

impl BookingError {
    /// Short stable label, used as metric label and UI message key.
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::InvalidDate(_) => "invalid_date",
            BookingError::PastDate { .. } => "past_date",
            BookingError::EndBeforeStart { .. } => "end_before_start",
            BookingError::ConflictDetected(_) => "conflict_detected",
            BookingError::NegativeAmount(_) => "negative_amount",
            BookingError::IncompleteRoster(_) => "incomplete_roster",
            BookingError::MissingField(_) => "missing_field",
            BookingError::InvalidSnapshot(_) => "invalid_snapshot",
            BookingError::LimitExceeded(_) => "limit_exceeded",
        }
    }
}
