use chrono::{Datelike, Days, Weekday};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::BookingPolicy;
use crate::limits::{CALENDAR_GRID_DAYS, MAX_QUERY_WINDOW_DAYS};
use crate::model::*;

use super::conflict::occupying;
use super::BookingError;

// ── Month grid ───────────────────────────────────────────────────

/// The 6×7 block of days shown for `month`, starting on the `week_start`
/// day on or before the 1st.
fn grid_range(month: YearMonth, week_start: Weekday) -> Result<DateRange, BookingError> {
    let first = month.first_day();
    let back = (first.weekday().num_days_from_monday() + 7
        - week_start.num_days_from_monday())
        % 7;
    let out_of_range = || BookingError::LimitExceeded("calendar grid out of range");
    let start = first
        .checked_sub_days(Days::new(u64::from(back)))
        .ok_or_else(out_of_range)?;
    let end = start
        .checked_add_days(Days::new(CALENDAR_GRID_DAYS as u64))
        .ok_or_else(out_of_range)?;
    DateRange::new(start, end)
}

/// Every day shown for `month`, with leading/trailing days from adjacent
/// months flagged `false`.
pub fn month_grid(
    month: YearMonth,
    week_start: Weekday,
) -> Result<impl Iterator<Item = (Day, bool)> + Clone, BookingError> {
    let shown = month.as_range();
    let grid = grid_range(month, week_start)?;
    Ok(grid.days().map(move |day| (day, shown.contains_day(day))))
}

// ── Occupancy projection ─────────────────────────────────────────

/// Lazy per-day projection of one resource's reservations onto a month grid.
/// Each call to [`project`] yields a fresh iterator; clones advance
/// independently.
#[derive(Debug, Clone)]
pub struct Occupancy<'a> {
    month: DateRange,
    grid: DateRange,
    next: usize,
    /// Occupying reservations overlapping the grid, by check-in.
    reservations: Vec<&'a Reservation>,
}

/// Project `reservations` of `resource_id` onto `month` (Monday-first grid).
/// Cancelled reservations and `exclude` are ignored; the check-out day is
/// never occupied.
pub fn project<'a>(
    month: YearMonth,
    resource_id: ResourceId,
    reservations: &'a [Reservation],
    exclude: Option<ReservationId>,
) -> Result<Occupancy<'a>, BookingError> {
    project_from(month, Weekday::Mon, resource_id, reservations, exclude)
}

/// [`project`] laid out the way the policy's calendar starts its weeks.
pub fn project_for<'a>(
    policy: &BookingPolicy,
    month: YearMonth,
    resource_id: ResourceId,
    reservations: &'a [Reservation],
    exclude: Option<ReservationId>,
) -> Result<Occupancy<'a>, BookingError> {
    project_from(month, policy.week_start, resource_id, reservations, exclude)
}

pub fn project_from<'a>(
    month: YearMonth,
    week_start: Weekday,
    resource_id: ResourceId,
    reservations: &'a [Reservation],
    exclude: Option<ReservationId>,
) -> Result<Occupancy<'a>, BookingError> {
    let grid = grid_range(month, week_start)?;
    let mut hits: Vec<&Reservation> = occupying(reservations, resource_id, exclude)
        .filter(|r| r.range.overlaps(&grid))
        .collect();
    hits.sort_by_key(|r| r.range.start());
    Ok(Occupancy {
        month: month.as_range(),
        grid,
        next: 0,
        reservations: hits,
    })
}

impl Iterator for Occupancy<'_> {
    type Item = OccupancyDay;

    fn next(&mut self) -> Option<OccupancyDay> {
        if self.next >= CALENDAR_GRID_DAYS {
            return None;
        }
        // The whole grid was checked representable when it was built.
        let date = self
            .grid
            .start()
            .checked_add_days(Days::new(self.next as u64))?;
        self.next += 1;
        let holder = self
            .reservations
            .iter()
            .take_while(|r| r.range.start() <= date)
            .find(|r| r.range.contains_day(date));
        Some(OccupancyDay {
            date,
            in_month: self.month.contains_day(date),
            is_occupied: holder.is_some(),
            occupying_reservation_id: holder.map(|r| r.id),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = CALENDAR_GRID_DAYS - self.next.min(CALENDAR_GRID_DAYS);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Occupancy<'_> {}

// ── Occupied runs and free gaps ──────────────────────────────────

fn check_window(window: &DateRange) -> Result<(), BookingError> {
    if window.nights() > MAX_QUERY_WINDOW_DAYS {
        return Err(BookingError::LimitExceeded("query window too wide"));
    }
    Ok(())
}

/// Stays cut to `window` and chained: a guest checking in on the day the
/// previous one checks out extends the same run.
fn runs_within(
    window: &DateRange,
    resource_id: ResourceId,
    reservations: &[Reservation],
    exclude: Option<ReservationId>,
) -> Vec<DateRange> {
    let mut nights: Vec<DateRange> = occupying(reservations, resource_id, exclude)
        .filter_map(|r| r.range.intersection(window))
        .collect();
    nights.sort_unstable_by_key(DateRange::start);

    let mut runs = Vec::with_capacity(nights.len());
    let mut nights = nights.into_iter();
    let Some(mut run) = nights.next() else {
        return runs;
    };
    for stay in nights {
        if stay.start() > run.end() {
            runs.push(run);
            run = stay;
        } else if stay.end() > run.end() {
            run = DateRange::from_ordered(run.start(), stay.end());
        }
    }
    runs.push(run);
    runs
}

/// Unbroken stretches of occupied nights of `resource_id` inside `window`,
/// in date order. Back-to-back stays form one stretch.
pub fn occupied_runs(
    window: &DateRange,
    resource_id: ResourceId,
    reservations: &[Reservation],
    exclude: Option<ReservationId>,
) -> Result<Vec<DateRange>, BookingError> {
    check_window(window)?;
    Ok(runs_within(window, resource_id, reservations, exclude))
}

/// Bookable gaps of `resource_id` inside `window`, optionally only those
/// of at least `min_nights`.
pub fn free_ranges(
    window: &DateRange,
    resource_id: ResourceId,
    reservations: &[Reservation],
    exclude: Option<ReservationId>,
    min_nights: Option<i64>,
) -> Result<Vec<DateRange>, BookingError> {
    check_window(window)?;

    let mut free = Vec::new();
    let mut check_in = window.start();
    for run in runs_within(window, resource_id, reservations, exclude) {
        if run.start() > check_in {
            free.push(DateRange::from_ordered(check_in, run.start()));
        }
        check_in = run.end();
    }
    if check_in < window.end() {
        free.push(DateRange::from_ordered(check_in, window.end()));
    }

    if let Some(min) = min_nights {
        free.retain(|r| r.nights() >= min);
    }
    Ok(free)
}

// ── Reports ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupancyStats {
    pub month: YearMonth,
    pub days_in_month: i64,
    pub occupied_days: i64,
    /// Percentage, two decimals.
    pub rate: Decimal,
}

/// Occupied nights of `resource_id` within `month` (adjacent-month days
/// not counted).
pub fn occupancy_stats(
    month: YearMonth,
    resource_id: ResourceId,
    reservations: &[Reservation],
) -> OccupancyStats {
    let whole = month.as_range();
    let days_in_month = whole.nights();
    let occupied_days: i64 = runs_within(&whole, resource_id, reservations, None)
        .iter()
        .map(DateRange::nights)
        .sum();
    let rate = if days_in_month == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(occupied_days * 100) / Decimal::from(days_in_month)).round_dp(2)
    };
    OccupancyStats {
        month,
        days_in_month,
        occupied_days,
        rate,
    }
}
