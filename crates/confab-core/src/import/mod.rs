//! Recurring meeting import

mod service;

pub use service::ImportService;
