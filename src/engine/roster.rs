use crate::limits::MAX_GUESTS;
use crate::model::ResidentSlot;
use crate::observability::ROSTER_SLOTS_DISCARDED_TOTAL;

use super::BookingError;

/// Resident slots needed for `guest_count`: the primary customer is not a
/// resident. Counts above `MAX_GUESTS` are treated as `MAX_GUESTS`.
pub fn required_slots(guest_count: u32) -> usize {
    guest_count.min(MAX_GUESTS).saturating_sub(1) as usize
}

/// Resize `slots` to match `guest_count`.
///
/// Growing appends empty required slots. Shrinking truncates from the tail
/// and the data typed into the removed slots is discarded. A later grow
/// produces fresh empty slots, never the old data. Slots that survive keep
/// their contents.
///
/// Every returned slot is `required`, so the required count always equals
/// [`required_slots`]`(guest_count)`.
pub fn reconcile(slots: Vec<ResidentSlot>, guest_count: u32) -> Vec<ResidentSlot> {
    reconcile_reporting(slots, guest_count).0
}

/// Same as [`reconcile`], also handing back the discarded tail so the
/// caller can warn about lost input.
pub fn reconcile_reporting(
    mut slots: Vec<ResidentSlot>,
    guest_count: u32,
) -> (Vec<ResidentSlot>, Vec<ResidentSlot>) {
    let required = required_slots(guest_count);
    for slot in &mut slots {
        slot.required = true;
    }
    if required >= slots.len() {
        slots.resize_with(required, ResidentSlot::required);
        return (slots, Vec::new());
    }

    let discarded = slots.split_off(required);
    let lost_input = discarded.iter().filter(|s| !s.is_blank()).count();
    if lost_input > 0 {
        tracing::warn!(
            guest_count,
            lost_input,
            "guest count shrink discarded resident data"
        );
    }
    metrics::counter!(ROSTER_SLOTS_DISCARDED_TOTAL).increment(discarded.len() as u64);
    (slots, discarded)
}

/// Every required slot has a name. ID number and phone stay optional.
pub fn all_required_filled(slots: &[ResidentSlot]) -> bool {
    missing_names(slots).next().is_none()
}

/// Indices of required slots without a name.
pub fn missing_names(slots: &[ResidentSlot]) -> impl Iterator<Item = usize> + '_ {
    slots
        .iter()
        .enumerate()
        .filter(|(_, s)| s.required && !s.has_name())
        .map(|(i, _)| i)
}

pub fn check_roster(slots: &[ResidentSlot]) -> Result<(), BookingError> {
    let missing: Vec<usize> = missing_names(slots).collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(BookingError::IncompleteRoster(missing))
    }
}
