//! Booking request intake

mod service;

pub use service::{BookingService, CreateOutcome};
