//! External meeting provisioning

mod service;

pub use service::{ProvisionOutcome, ProvisioningService};
