//! Conflict detection and alternative-window suggestion

mod service;

pub use service::{overlaps, week_bounds, AvailabilityService};
