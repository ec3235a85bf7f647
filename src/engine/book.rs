use std::collections::HashMap;

use crate::limits::MAX_SNAPSHOT_RESERVATIONS;
use crate::model::*;

use super::BookingError;

/// Snapshot of existing reservations as fetched from the API, grouped by
/// resource and kept sorted by check-in day.
///
/// Owned by the caller and replaced wholesale on refresh; it is never the
/// source of truth for exclusivity.
#[derive(Debug, Clone, Default)]
pub struct ReservationBook {
    by_resource: HashMap<ResourceId, Vec<Reservation>>,
    /// Reverse lookup: reservation id → resource id
    resource_of: HashMap<ReservationId, ResourceId>,
}

impl ReservationBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(reservations: Vec<Reservation>) -> Result<Self, BookingError> {
        if reservations.len() > MAX_SNAPSHOT_RESERVATIONS {
            return Err(BookingError::LimitExceeded("snapshot too large"));
        }
        let mut book = Self::new();
        for r in reservations {
            book.insert(r);
        }
        Ok(book)
    }

    /// Build from the API's JSON array of reservation rows.
    pub fn from_json(json: &str) -> Result<Self, BookingError> {
        let reservations: Vec<Reservation> = serde_json::from_str(json).map_err(|e| {
            tracing::warn!("rejecting reservation snapshot: {e}");
            BookingError::InvalidSnapshot(e.to_string())
        })?;
        Self::from_snapshot(reservations)
    }

    pub fn len(&self) -> usize {
        self.resource_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resource_of.is_empty()
    }

    /// Insert maintaining sort order by check-in. Replaces any reservation
    /// with the same id.
    pub fn insert(&mut self, reservation: Reservation) {
        self.remove(reservation.id);
        self.resource_of.insert(reservation.id, reservation.resource_id);
        let list = self.by_resource.entry(reservation.resource_id).or_default();
        let pos = list
            .binary_search_by_key(&reservation.range.start(), |r| r.range.start())
            .unwrap_or_else(|e| e);
        list.insert(pos, reservation);
    }

    pub fn remove(&mut self, id: ReservationId) -> Option<Reservation> {
        let resource_id = self.resource_of.remove(&id)?;
        let list = self.by_resource.get_mut(&resource_id)?;
        let pos = list.iter().position(|r| r.id == id)?;
        Some(list.remove(pos))
    }

    pub fn get(&self, id: ReservationId) -> Option<&Reservation> {
        let resource_id = self.resource_of.get(&id)?;
        self.by_resource.get(resource_id)?.iter().find(|r| r.id == id)
    }

    /// All reservations of a resource, cancelled included, by check-in.
    pub fn for_resource(&self, resource_id: ResourceId) -> &[Reservation] {
        self.by_resource
            .get(&resource_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Reservations of `resource_id` whose stay overlaps `query`.
    /// Binary search skips everything checking in at or after `query.end`.
    pub fn overlapping<'a>(
        &'a self,
        resource_id: ResourceId,
        query: &DateRange,
    ) -> impl Iterator<Item = &'a Reservation> + use<'a> {
        let list = self.for_resource(resource_id);
        let right_bound = list.partition_point(|r| r.range.start() < query.end());
        let query = *query;
        list[..right_bound]
            .iter()
            .filter(move |r| r.range.overlaps(&query))
    }

    pub fn find_conflict(
        &self,
        candidate: &DateRange,
        resource_id: ResourceId,
        exclude: Option<ReservationId>,
    ) -> Option<&Reservation> {
        self.overlapping(resource_id, candidate)
            .find(|r| r.is_occupying() && Some(r.id) != exclude)
    }

    pub fn has_conflict(
        &self,
        candidate: &DateRange,
        resource_id: ResourceId,
        exclude: Option<ReservationId>,
    ) -> bool {
        self.find_conflict(candidate, resource_id, exclude).is_some()
    }

    pub fn check_no_conflict(
        &self,
        candidate: &DateRange,
        resource_id: ResourceId,
        exclude: Option<ReservationId>,
    ) -> Result<(), BookingError> {
        match self.find_conflict(candidate, resource_id, exclude) {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::conflict;

    fn range(a: &str, b: &str) -> DateRange {
        DateRange::new(a.parse().unwrap(), b.parse().unwrap()).unwrap()
    }

    fn res(id: ReservationId, resource: ResourceId, a: &str, b: &str) -> Reservation {
        Reservation::new(id, resource, range(a, b), ReservationStatus::Confirmed)
    }

    #[test]
    fn insert_keeps_check_in_order() {
        let mut book = ReservationBook::new();
        book.insert(res(1, 1, "2025-03-20", "2025-03-22"));
        book.insert(res(2, 1, "2025-03-01", "2025-03-05"));
        book.insert(res(3, 1, "2025-03-10", "2025-03-12"));
        let ids: Vec<_> = book.for_resource(1).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn insert_same_id_replaces() {
        let mut book = ReservationBook::new();
        book.insert(res(1, 1, "2025-03-01", "2025-03-05"));
        book.insert(res(1, 2, "2025-04-01", "2025-04-05"));
        assert_eq!(book.len(), 1);
        assert!(book.for_resource(1).is_empty());
        assert_eq!(book.get(1).map(|r| r.resource_id), Some(2));
    }

    #[test]
    fn remove_by_id() {
        let mut book = ReservationBook::new();
        book.insert(res(1, 1, "2025-03-01", "2025-03-05"));
        book.insert(res(2, 1, "2025-03-05", "2025-03-07"));
        assert_eq!(book.remove(1).map(|r| r.id), Some(1));
        assert!(book.remove(1).is_none());
        assert_eq!(book.for_resource(1).len(), 1);
        assert!(book.get(1).is_none());
    }

    #[test]
    fn overlapping_skips_past_and_future() {
        let mut book = ReservationBook::new();
        book.insert(res(1, 1, "2025-01-01", "2025-01-05"));
        book.insert(res(2, 1, "2025-01-08", "2025-01-12"));
        book.insert(res(3, 1, "2025-02-01", "2025-02-03"));
        let hits: Vec<_> = book
            .overlapping(1, &range("2025-01-05", "2025-01-10"))
            .map(|r| r.id)
            .collect();
        assert_eq!(hits, vec![2]); // #1 checks out on the query's first day
    }

    #[test]
    fn overlapping_long_stay_spanning_query() {
        let mut book = ReservationBook::new();
        book.insert(res(1, 1, "2025-01-01", "2025-03-01"));
        assert_eq!(book.overlapping(1, &range("2025-02-01", "2025-02-02")).count(), 1);
    }

    #[test]
    fn overlapping_unknown_resource() {
        let book = ReservationBook::new();
        assert_eq!(book.overlapping(99, &range("2025-01-01", "2025-12-31")).count(), 0);
    }

    #[test]
    fn book_conflict_matches_linear_scan() {
        let mut book = ReservationBook::new();
        book.insert(res(1, 1, "2025-03-01", "2025-03-05"));
        let mut cancelled = res(2, 1, "2025-03-10", "2025-03-15");
        cancelled.status = ReservationStatus::Cancelled;
        book.insert(cancelled);

        for (a, b) in [
            ("2025-03-03", "2025-03-07"),
            ("2025-03-05", "2025-03-10"),
            ("2025-03-10", "2025-03-15"),
            ("2025-02-25", "2025-03-01"),
            ("2025-03-02", "2025-03-02"),
        ] {
            let candidate = range(a, b);
            assert_eq!(
                book.has_conflict(&candidate, 1, None),
                conflict::has_conflict(&candidate, 1, book.for_resource(1), None),
                "{candidate}"
            );
        }
        assert!(book.has_conflict(&range("2025-03-03", "2025-03-07"), 1, None));
        assert!(!book.has_conflict(&range("2025-03-03", "2025-03-07"), 1, Some(1)));
    }

    #[test]
    fn check_no_conflict_agrees_with_has_conflict() {
        let mut book = ReservationBook::new();
        book.insert(res(1, 1, "2025-03-01", "2025-03-05"));
        book.insert(res(2, 1, "2025-03-05", "2025-03-09"));
        book.insert(res(3, 1, "2025-03-12", "2025-03-12"));
        book.insert(res(4, 1, "2025-03-14", "2025-03-30"));
        let mut cancelled = res(5, 1, "2025-03-09", "2025-03-14");
        cancelled.status = ReservationStatus::Cancelled;
        book.insert(cancelled);
        book.insert(res(6, 2, "2025-03-01", "2025-03-31"));

        let first: Day = "2025-02-25".parse().unwrap();
        for offset in 0..40u64 {
            let start = first + chrono::Days::new(offset);
            for nights in 0..5u64 {
                let candidate = DateRange::new(start, start + chrono::Days::new(nights)).unwrap();
                for exclude in [None, Some(1), Some(2), Some(4), Some(6)] {
                    let checked = book.check_no_conflict(&candidate, 1, exclude);
                    assert_eq!(
                        checked.is_err(),
                        book.has_conflict(&candidate, 1, exclude),
                        "{candidate} excluding {exclude:?}"
                    );
                    assert_eq!(
                        checked,
                        conflict::check_no_conflict(&candidate, 1, book.for_resource(1), exclude),
                        "{candidate} excluding {exclude:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn from_json_snapshot() {
        let json = r#"[
            {"id": 1, "bungalow_id": 1, "status": "confirmed",
             "check_in_date": "2025-03-01", "check_out_date": "2025-03-05"},
            {"id": 2, "bungalow_id": 2, "status": "pending",
             "check_in_date": "2025-03-02", "check_out_date": "2025-03-04"}
        ]"#;
        let book = ReservationBook::from_json(json).unwrap();
        assert_eq!(book.len(), 2);
        assert_eq!(book.for_resource(2)[0].id, 2);
        assert_eq!(
            book.check_no_conflict(&range("2025-03-03", "2025-03-07"), 1, None),
            Err(BookingError::ConflictDetected(1))
        );
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(ReservationBook::from_json("{not json").is_err());
    }
}
