//! Booking Wizard
//!
//! Three gated steps (treatments, date and time, contact details) over a
//! persisted draft. A step unlocks only after the one before it has been
//! confirmed with valid content.

mod controller;
mod state;

pub use controller::{BookingConfirmation, BookingSummary, LoadState, WizardController};
pub use state::{WizardState, WizardStep};
