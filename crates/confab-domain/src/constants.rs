//! Domain constants

/// Maximum number of alternative windows returned by an availability check.
pub const SUGGESTION_LIMIT: usize = 5;

/// Step size, in minutes, used when scanning the day for alternative windows.
pub const SUGGESTION_STEP_MINUTES: u32 = 30;

/// Base URL for locally synthesized join links issued when provisioning
/// against the external provider fails. Links under this host do not back a
/// real meeting; the missing-meeting repair job replaces them.
pub const FALLBACK_LINK_BASE: &str = "https://meet-fallback.confab.internal/r";

/// Timezone sent with every create-meeting request.
pub const PROVIDER_TIMEZONE: &str = "UTC";
