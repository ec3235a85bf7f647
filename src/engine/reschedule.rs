use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::BookingPolicy;
use crate::model::*;
use crate::observability::observe;

use super::conflict::check_no_conflict;
use super::{dates, pricing, BookingError};

/// A validated move/extension of an existing reservation, ready to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReschedulePlan {
    pub reservation_id: ReservationId,
    pub previous: DateRange,
    pub range: DateRange,
    /// New nights minus old nights.
    pub nights_delta: i64,
    pub quote: PriceQuote,
}

/// Validate moving `reservation` to `new_range` against the snapshot and
/// re-quote it with the stay's manual price and extras. The reservation
/// never conflicts with itself.
///
/// The not-in-the-past rule only applies when the check-in day changes, so a
/// guest already in house can still extend their check-out.
#[allow(clippy::too_many_arguments)]
pub fn plan_reschedule(
    reservation: &Reservation,
    new_range: DateRange,
    existing: &[Reservation],
    nightly_rate: Decimal,
    manual_override: Option<Decimal>,
    extras: &[LineItem],
    today: Day,
    policy: &BookingPolicy,
) -> Result<ReschedulePlan, BookingError> {
    observe(plan(
        reservation,
        new_range,
        existing,
        Pricing {
            nightly_rate,
            manual_override,
            extras,
        },
        today,
        policy,
    ))
}

/// Postpone the whole stay by `days`, keeping its length, manual price and
/// extras.
#[allow(clippy::too_many_arguments)]
pub fn plan_delay(
    reservation: &Reservation,
    days: i64,
    existing: &[Reservation],
    nightly_rate: Decimal,
    manual_override: Option<Decimal>,
    extras: &[LineItem],
    today: Day,
    policy: &BookingPolicy,
) -> Result<ReschedulePlan, BookingError> {
    let moved = reservation
        .range
        .shifted(days)
        .ok_or(BookingError::LimitExceeded("date out of range"));
    let moved = observe(moved)?;
    plan_reschedule(
        reservation,
        moved,
        existing,
        nightly_rate,
        manual_override,
        extras,
        today,
        policy,
    )
}

struct Pricing<'a> {
    nightly_rate: Decimal,
    manual_override: Option<Decimal>,
    extras: &'a [LineItem],
}

fn plan(
    reservation: &Reservation,
    new_range: DateRange,
    existing: &[Reservation],
    pricing: Pricing<'_>,
    today: Day,
    policy: &BookingPolicy,
) -> Result<ReschedulePlan, BookingError> {
    if reservation.status.is_closed() {
        return Err(BookingError::LimitExceeded("reservation is closed"));
    }

    let start_moved = new_range.start() != reservation.range.start();
    let policy = BookingPolicy {
        enforce_not_past: policy.enforce_not_past && start_moved,
        ..policy.clone()
    };
    dates::validate(&new_range, today, &policy)?;
    check_no_conflict(&new_range, reservation.resource_id, existing, Some(reservation.id))?;

    let quote = pricing::quote(
        pricing.nightly_rate,
        new_range.nights(),
        pricing.manual_override,
        pricing.extras,
    )?;
    let plan = ReschedulePlan {
        reservation_id: reservation.id,
        previous: reservation.range,
        range: new_range,
        nights_delta: new_range.nights() - reservation.range.nights(),
        quote,
    };
    tracing::info!(
        reservation_id = reservation.id,
        nights_delta = plan.nights_delta,
        "reschedule {} -> {}",
        plan.previous,
        plan.range
    );
    Ok(plan)
}
