use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::dates;
use crate::engine::BookingError;
use crate::limits::{MAX_CALENDAR_YEAR, MIN_CALENDAR_YEAR};

/// Calendar day without a time component. The only date type used.
pub type Day = NaiveDate;

/// Opaque reservation identity assigned by the persistence layer.
pub type ReservationId = i64;

/// The bungalow (or any rentable unit) a reservation is made against.
pub type ResourceId = i64;

/// Half-open stay `[start, end)`: `start` is the check-in day, `end` the
/// check-out day. The check-out day itself is not occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct DateRange {
    start: Day,
    end: Day,
}

#[derive(Deserialize)]
struct RawRange {
    start: Day,
    end: Day,
}

impl TryFrom<RawRange> for DateRange {
    type Error = BookingError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// `end == start` is accepted (zero nights); `end < start` is not.
    pub fn new(start: Day, end: Day) -> Result<Self, BookingError> {
        if end < start {
            return Err(BookingError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    /// For ranges derived from already-ordered days (merges, clamps).
    pub(crate) fn from_ordered(start: Day, end: Day) -> Self {
        debug_assert!(start <= end, "DateRange start must not be after end");
        Self { start, end }
    }

    pub fn start(&self) -> Day {
        self.start
    }

    pub fn end(&self) -> Day {
        self.end
    }

    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Strict pair: back-to-back stays sharing a turnover day do not overlap,
    /// and a zero-night range overlaps nothing.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_day(&self, day: Day) -> bool {
        self.start <= day && day < self.end
    }

    /// Nights both ranges occupy, `None` when they share none.
    pub fn intersection(&self, other: &DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Self { start, end })
    }

    /// Occupied nights, check-in day first.
    pub fn days(&self) -> impl Iterator<Item = Day> + Clone + use<> {
        let start = self.start;
        (0..self.nights().max(0) as u64).map(move |n| start + Days::new(n))
    }

    /// Same length, moved by `days` (negative moves earlier). `None` on
    /// calendar overflow.
    pub fn shifted(&self, days: i64) -> Option<DateRange> {
        let delta = chrono::Duration::try_days(days)?;
        let start = self.start.checked_add_signed(delta)?;
        let end = self.end.checked_add_signed(delta)?;
        Some(Self { start, end })
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Calendar month shown in the availability grid. Always within
/// `MIN_CALENDAR_YEAR..=MAX_CALENDAR_YEAR`, so the month, the one after it
/// and the grid around it are representable days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawYearMonth", into = "RawYearMonth")]
pub struct YearMonth {
    first: Day,
    end: Day,
}

#[derive(Serialize, Deserialize)]
struct RawYearMonth {
    year: i32,
    month: u32,
}

impl TryFrom<RawYearMonth> for YearMonth {
    type Error = BookingError;

    fn try_from(raw: RawYearMonth) -> Result<Self, Self::Error> {
        YearMonth::new(raw.year, raw.month)
    }
}

impl From<YearMonth> for RawYearMonth {
    fn from(m: YearMonth) -> Self {
        Self {
            year: m.year(),
            month: m.month(),
        }
    }
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, BookingError> {
        let invalid = || BookingError::InvalidDate(format!("{year:04}-{month:02}"));
        if !(MIN_CALENDAR_YEAR..=MAX_CALENDAR_YEAR).contains(&year) {
            return Err(invalid());
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let end = first
            .checked_add_months(Months::new(1))
            .ok_or_else(invalid)?;
        Ok(Self { first, end })
    }

    /// Parses `YYYY-MM`.
    pub fn parse(s: &str) -> Result<Self, BookingError> {
        let invalid = || BookingError::InvalidDate(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = y.parse().map_err(|_| invalid())?;
        let month = m.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    pub fn containing(day: Day) -> Result<Self, BookingError> {
        Self::new(day.year(), day.month())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> Day {
        self.first
    }

    pub fn next(&self) -> Result<Self, BookingError> {
        Self::containing(self.end)
    }

    /// The month as a half-open range: 1st to the 1st of the following month.
    pub fn as_range(&self) -> DateRange {
        DateRange::from_ordered(self.first, self.end)
    }

    pub fn days_in_month(&self) -> i64 {
        self.as_range().nights()
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    CheckedIn,
    Completed,
    #[serde(alias = "canceled")]
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::CheckedIn => "checked_in",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    /// Everything except a cancellation holds the bungalow.
    pub fn is_occupying(&self) -> bool {
        !matches!(self, ReservationStatus::Cancelled)
    }

    /// No further date changes are accepted.
    pub fn is_closed(&self) -> bool {
        matches!(self, ReservationStatus::Completed | ReservationStatus::Cancelled)
    }
}

/// Read-only snapshot of a reservation as delivered by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReservationRecord", into = "ReservationRecord")]
pub struct Reservation {
    pub id: ReservationId,
    pub resource_id: ResourceId,
    pub range: DateRange,
    pub status: ReservationStatus,
    pub guest_count: Option<u32>,
    pub total_price: Option<Decimal>,
}

impl Reservation {
    pub fn new(
        id: ReservationId,
        resource_id: ResourceId,
        range: DateRange,
        status: ReservationStatus,
    ) -> Self {
        Self {
            id,
            resource_id,
            range,
            status,
            guest_count: None,
            total_price: None,
        }
    }

    pub fn is_occupying(&self) -> bool {
        self.status.is_occupying()
    }
}

/// Wire shape of a reservation row: dates stay ISO strings until validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub id: ReservationId,
    #[serde(alias = "resource_id")]
    pub bungalow_id: ResourceId,
    pub check_in_date: String,
    pub check_out_date: String,
    pub status: ReservationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,
}

impl TryFrom<ReservationRecord> for Reservation {
    type Error = BookingError;

    fn try_from(record: ReservationRecord) -> Result<Self, Self::Error> {
        let range = dates::parse(&record.check_in_date, &record.check_out_date)?;
        Ok(Self {
            id: record.id,
            resource_id: record.bungalow_id,
            range,
            status: record.status,
            guest_count: record.guest_count,
            total_price: record.total_price,
        })
    }
}

impl From<Reservation> for ReservationRecord {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            bungalow_id: r.resource_id,
            check_in_date: r.range.start().to_string(),
            check_out_date: r.range.end().to_string(),
            status: r.status,
            guest_count: r.guest_count,
            total_price: r.total_price,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    /// National identity number.
    #[default]
    Tc,
    Passport,
}

/// An occupant beyond the primary customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentSlot {
    pub name: String,
    #[serde(default)]
    pub id_number: String,
    #[serde(default)]
    pub id_type: IdType,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub required: bool,
}

impl ResidentSlot {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    /// Whitespace-only names count as missing.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Nothing typed into any field.
    pub fn is_blank(&self) -> bool {
        !self.has_name() && self.id_number.trim().is_empty() && self.phone.trim().is_empty()
    }
}

/// Additive extra service (breakfast, transfer, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub amount: Decimal,
}

impl LineItem {
    pub fn new(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// Computed price, distinct from whatever price the API finally commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub nights: i64,
    pub nightly_rate: Decimal,
    /// `nightly_rate * nights`, kept for display even when overridden.
    pub computed_total: Decimal,
    pub manual_override: Option<Decimal>,
    pub extras: Vec<LineItem>,
    pub extras_total: Decimal,
    /// Override (or computed total) plus extras.
    pub effective_total: Decimal,
}

impl PriceQuote {
    pub fn is_overridden(&self) -> bool {
        self.manual_override.is_some()
    }

    /// Accommodation part of the effective total, extras excluded.
    pub fn base_total(&self) -> Decimal {
        self.manual_override.unwrap_or(self.computed_total)
    }
}

/// One cell of the availability calendar. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OccupancyDay {
    pub date: Day,
    /// False for the leading/trailing days borrowed from adjacent months.
    pub in_month: bool,
    pub is_occupied: bool,
    pub occupying_reservation_id: Option<ReservationId>,
}
