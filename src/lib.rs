//! Booking availability and pricing for bungalow reservations.
//!
//! Everything here is synchronous and works on caller-owned snapshots of the
//! reservation list. The conflict check is a client-side pre-filter: the
//! persistence layer must re-check atomically when it writes, since another
//! booker may commit between snapshot and submit.

pub mod config;
pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;

pub use config::BookingPolicy;
pub use engine::{BookingError, ReservationBook};
