//! Drift detection and repair against the external provider

mod service;

pub use service::ReconciliationService;
