use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::BookingPolicy;
use crate::model::*;
use crate::observability::observe;

use super::calendar::{self, Occupancy};
use super::conflict::check_no_conflict;
use super::{dates, pricing, roster, BookingError};

/// Pages of the reservation creation flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Step {
    /// Bungalow and dates.
    Stay = 1,
    /// Primary customer and guest count.
    Guest = 2,
    /// Additional residents.
    Residents = 3,
    /// Price and confirmation.
    Review = 4,
}

impl Step {
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn next(self) -> Option<Step> {
        match self {
            Step::Stay => Some(Step::Guest),
            Step::Guest => Some(Step::Residents),
            Step::Residents => Some(Step::Review),
            Step::Review => None,
        }
    }

    pub fn prev(self) -> Option<Step> {
        match self {
            Step::Stay => None,
            Step::Guest => Some(Step::Stay),
            Step::Residents => Some(Step::Guest),
            Step::Review => Some(Step::Residents),
        }
    }
}

/// The guest the reservation is made for; counts as one of the guests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub id_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationDraft {
    pub resource_id: Option<ResourceId>,
    pub range: Option<DateRange>,
    pub guest_count: u32,
    pub customer: Customer,
    pub residents: Vec<ResidentSlot>,
    pub nightly_rate: Decimal,
    pub manual_price: Option<Decimal>,
    pub extras: Vec<LineItem>,
    pub notes: Option<String>,
}

impl Default for ReservationDraft {
    fn default() -> Self {
        Self {
            resource_id: None,
            range: None,
            guest_count: 1,
            customer: Customer::default(),
            residents: Vec::new(),
            nightly_rate: Decimal::ZERO,
            manual_price: None,
            extras: Vec::new(),
            notes: None,
        }
    }
}

/// Create payload for the API. The API re-checks availability atomically
/// before committing; this is only what the client believes is free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRequest {
    pub bungalow_id: ResourceId,
    pub check_in_date: Day,
    pub check_out_date: Day,
    pub nights: i64,
    pub guest_count: u32,
    pub customer: Customer,
    pub residents: Vec<ResidentSlot>,
    pub calculated_price: Decimal,
    pub total_price: Decimal,
    pub extras: Vec<LineItem>,
    pub status: ReservationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Four-step reservation creation flow. Each `advance` validates the current
/// page; editing an earlier page while further along pulls the flow back to
/// that page so it is validated again.
#[derive(Debug, Clone)]
pub struct Wizard {
    step: Step,
    draft: ReservationDraft,
    policy: BookingPolicy,
}

impl Wizard {
    pub fn new(policy: BookingPolicy) -> Self {
        Self {
            step: Step::Stay,
            draft: ReservationDraft::default(),
            policy,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &ReservationDraft {
        &self.draft
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    fn rewind_to(&mut self, step: Step) {
        if self.step > step {
            tracing::debug!(from = self.step.number(), to = step.number(), "wizard rewound");
            self.step = step;
        }
    }

    // ── Step 1 ───────────────────────────────────────────

    pub fn select_resource(&mut self, resource_id: ResourceId, nightly_rate: Decimal) {
        self.draft.resource_id = Some(resource_id);
        self.draft.nightly_rate = nightly_rate;
        self.rewind_to(Step::Stay);
    }

    /// Parse and store the stay. On error the previous stay is kept.
    pub fn set_dates(
        &mut self,
        check_in: &str,
        check_out: &str,
    ) -> Result<DateRange, BookingError> {
        let range = observe(dates::parse(check_in, check_out))?;
        self.draft.range = Some(range);
        self.rewind_to(Step::Stay);
        Ok(range)
    }

    /// Month view of the selected bungalow for picking dates, laid out by the
    /// policy's week start.
    pub fn calendar<'a>(
        &self,
        month: YearMonth,
        existing: &'a [Reservation],
    ) -> Result<Occupancy<'a>, BookingError> {
        let resource_id = self
            .draft
            .resource_id
            .ok_or(BookingError::MissingField("bungalow"))?;
        calendar::project_for(&self.policy, month, resource_id, existing, None)
    }

    // ── Step 2 ───────────────────────────────────────────

    pub fn customer_mut(&mut self) -> &mut Customer {
        &mut self.draft.customer
    }

    /// Resize the resident roster. Returns the slots that were dropped so the
    /// UI can warn when they held data. A count above the policy's
    /// `max_guests` is refused and leaves the draft as it was.
    pub fn set_guest_count(
        &mut self,
        guest_count: u32,
    ) -> Result<Vec<ResidentSlot>, BookingError> {
        if guest_count > self.policy.max_guests {
            return observe(Err(BookingError::LimitExceeded("too many guests")));
        }
        let slots = std::mem::take(&mut self.draft.residents);
        let (kept, discarded) = roster::reconcile_reporting(slots, guest_count);
        self.draft.residents = kept;
        self.draft.guest_count = guest_count;
        self.rewind_to(Step::Guest);
        Ok(discarded)
    }

    // ── Step 3 ───────────────────────────────────────────

    pub fn residents(&self) -> &[ResidentSlot] {
        &self.draft.residents
    }

    /// Slot count is owned by the guest count; only contents are editable.
    pub fn resident_mut(&mut self, index: usize) -> Option<&mut ResidentSlot> {
        self.draft.residents.get_mut(index)
    }

    // ── Step 4 ───────────────────────────────────────────

    pub fn set_manual_price(&mut self, price: Option<Decimal>) {
        self.draft.manual_price = price;
    }

    pub fn add_extra(&mut self, item: LineItem) {
        self.draft.extras.push(item);
    }

    pub fn remove_extra(&mut self, index: usize) -> Option<LineItem> {
        (index < self.draft.extras.len()).then(|| self.draft.extras.remove(index))
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.draft.notes = notes.filter(|n| !n.trim().is_empty());
    }

    // ── Navigation ───────────────────────────────────────

    /// Validate the current page and move to the next one. At the last page
    /// this only re-validates.
    pub fn advance(&mut self, today: Day, existing: &[Reservation]) -> Result<Step, BookingError> {
        observe(self.validate_step(self.step, today, existing))?;
        if let Some(next) = self.step.next() {
            tracing::debug!(from = self.step.number(), to = next.number(), "wizard advanced");
            self.step = next;
        }
        Ok(self.step)
    }

    /// Going back never loses data.
    pub fn back(&mut self) -> Step {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    fn validate_step(
        &self,
        step: Step,
        today: Day,
        existing: &[Reservation],
    ) -> Result<(), BookingError> {
        match step {
            Step::Stay => {
                self.validated_stay(today, existing)?;
                Ok(())
            }
            Step::Guest => self.validate_guest(),
            Step::Residents => roster::check_roster(&self.draft.residents),
            Step::Review => self.quote().map(|_| ()),
        }
    }

    fn validated_stay(
        &self,
        today: Day,
        existing: &[Reservation],
    ) -> Result<(ResourceId, DateRange), BookingError> {
        let resource_id = self
            .draft
            .resource_id
            .ok_or(BookingError::MissingField("bungalow"))?;
        let range = self.draft.range.ok_or(BookingError::MissingField("dates"))?;
        dates::validate(&range, today, &self.policy)?;
        check_no_conflict(&range, resource_id, existing, None)?;
        Ok((resource_id, range))
    }

    fn validate_guest(&self) -> Result<(), BookingError> {
        if self.draft.customer.name.trim().is_empty() {
            return Err(BookingError::MissingField("customer name"));
        }
        if self.draft.guest_count == 0 {
            return Err(BookingError::MissingField("guest count"));
        }
        if self.draft.guest_count > self.policy.max_guests {
            return Err(BookingError::LimitExceeded("too many guests"));
        }
        Ok(())
    }

    /// Current price for the selected stay.
    pub fn quote(&self) -> Result<PriceQuote, BookingError> {
        let range = self.draft.range.ok_or(BookingError::MissingField("dates"))?;
        pricing::quote(
            self.draft.nightly_rate,
            range.nights(),
            self.draft.manual_price,
            &self.draft.extras,
        )
    }

    /// Re-run every page check against the latest snapshot (the conflict check
    /// comes before any pricing) and build the create payload.
    pub fn finish(
        &self,
        today: Day,
        existing: &[Reservation],
    ) -> Result<BookingRequest, BookingError> {
        observe(self.build_request(today, existing))
    }

    fn build_request(
        &self,
        today: Day,
        existing: &[Reservation],
    ) -> Result<BookingRequest, BookingError> {
        let (resource_id, range) = self.validated_stay(today, existing)?;
        self.validate_guest()?;
        roster::check_roster(&self.draft.residents)?;
        let quote = self.quote()?;

        Ok(BookingRequest {
            bungalow_id: resource_id,
            check_in_date: range.start(),
            check_out_date: range.end(),
            nights: quote.nights,
            guest_count: self.draft.guest_count,
            customer: self.draft.customer.clone(),
            residents: self.draft.residents.clone(),
            calculated_price: quote.computed_total,
            total_price: quote.effective_total,
            extras: quote.extras,
            status: ReservationStatus::Pending,
            notes: self.draft.notes.clone(),
        })
    }
}
