use crate::model::*;

use super::BookingError;

/// Reservations that can block `resource_id`: same resource, not cancelled,
/// not the one being edited.
pub(crate) fn occupying<'a>(
    reservations: &'a [Reservation],
    resource_id: ResourceId,
    exclude: Option<ReservationId>,
) -> impl Iterator<Item = &'a Reservation> + Clone {
    reservations.iter().filter(move |r| {
        r.resource_id == resource_id && r.is_occupying() && Some(r.id) != exclude
    })
}

/// First reservation overlapping `candidate`, if any.
pub fn find_conflict<'a>(
    candidate: &DateRange,
    resource_id: ResourceId,
    reservations: &'a [Reservation],
    exclude: Option<ReservationId>,
) -> Option<&'a Reservation> {
    occupying(reservations, resource_id, exclude).find(|r| candidate.overlaps(&r.range))
}

/// Client-side pre-check only: the snapshot may be stale, so the write path
/// must re-check atomically before committing.
pub fn has_conflict(
    candidate: &DateRange,
    resource_id: ResourceId,
    reservations: &[Reservation],
    exclude: Option<ReservationId>,
) -> bool {
    find_conflict(candidate, resource_id, reservations, exclude).is_some()
}

pub fn check_no_conflict(
    candidate: &DateRange,
    resource_id: ResourceId,
    reservations: &[Reservation],
    exclude: Option<ReservationId>,
) -> Result<(), BookingError> {
    match find_conflict(candidate, resource_id, reservations, exclude) {
        Some(r) => {
            tracing::debug!(
                resource_id,
                conflicting = r.id,
                "candidate {candidate} overlaps {}",
                r.range
            );
            Err(BookingError::ConflictDetected(r.id))
        }
        None => Ok(()),
    }
}
