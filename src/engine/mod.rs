mod book;
pub mod calendar;
pub mod conflict;
pub mod dates;
mod error;
pub mod pricing;
pub mod reschedule;
pub mod roster;
pub mod wizard;

pub use book::ReservationBook;
pub use calendar::{
    free_ranges, month_grid, occupancy_stats, occupied_runs, project, project_for, project_from,
    Occupancy, OccupancyStats,
};
pub use conflict::{check_no_conflict, find_conflict, has_conflict};
pub use error::BookingError;
pub use pricing::quote;
pub use reschedule::{plan_delay, plan_reschedule, ReschedulePlan};
pub use roster::{all_required_filled, check_roster, reconcile, reconcile_reporting};
pub use wizard::{BookingRequest, Customer, ReservationDraft, Step, Wizard};

use rust_decimal::Decimal;

use crate::config::BookingPolicy;
use crate::model::*;
use crate::observability::observe;

/// Validated, conflict-free quote for a candidate stay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub resource_id: ResourceId,
    pub range: DateRange,
    pub quote: PriceQuote,
}

/// The booking pipeline in one call: date checks, then the conflict check,
/// and only when both pass, the price quote. A `ConflictDetected` result
/// means no quote was computed.
#[allow(clippy::too_many_arguments)]
pub fn offer(
    candidate: DateRange,
    resource_id: ResourceId,
    existing: &[Reservation],
    nightly_rate: Decimal,
    manual_override: Option<Decimal>,
    extras: &[LineItem],
    today: Day,
    policy: &BookingPolicy,
) -> Result<Offer, BookingError> {
    observe(
        dates::validate(&candidate, today, policy)
            .and_then(|()| check_no_conflict(&candidate, resource_id, existing, None))
            .and_then(|()| quote(nightly_rate, candidate.nights(), manual_override, extras))
            .map(|quote| Offer {
                resource_id,
                range: candidate,
                quote,
            }),
    )
}
