//! # Confab API
//!
//! Command surface consumed by the surrounding CRUD shell.
//!
//! This crate contains:
//! - `AppContext`: the composition root wiring storage, provider clients and
//!   services together
//! - Command functions returning `{success, message}` style responses and
//!   structured batch summaries

pub mod commands;
pub mod context;

pub use commands::CommandResponse;
pub use context::AppContext;
