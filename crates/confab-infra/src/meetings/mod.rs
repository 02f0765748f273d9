//! External meetings API integration
//!
//! Implements the core `MeetingProvider` port against the provider's REST
//! API, one client per resource account, with server-to-server token auth
//! and full call auditing.

mod auth;
mod client;
mod registry;
mod types;

pub use client::MeetingsApiClient;
pub use registry::HttpProviderRegistry;
