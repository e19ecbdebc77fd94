//! TNL Booking - appointment booking client for TNL Beauty
//!
//! Drives the salon's three-step booking flow from the terminal: pick
//! treatments, pick a date and time from the live calendar, leave contact
//! details, then submit. Progress is saved after every change so an
//! interrupted booking picks up where it stopped.
//!
//! ## Quick Start
//!
//! ```bash
//! # What can be booked
//! tnl-booking services
//! tnl-booking dates
//!
//! # Book, one step at a time or all at once
//! tnl-booking book --service gel-x --date 2024-06-10 --time 14:00 \
//!     --name Jess --email jess@example.com
//! ```

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod draft;
pub mod error;
pub mod logging;
pub mod utils;
pub mod wizard;

// Re-export commonly used types
pub use error::{BookingError, ErrorCode};
