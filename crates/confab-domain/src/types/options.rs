//! Per-meeting provider options

use serde::{Deserialize, Serialize};

/// Boolean meeting options forwarded to the external provider.
///
/// `join_before_host` and `waiting_room` are mutually exclusive on the
/// provider side; [`MeetingOptions::resolved`] enforces that before a
/// request is sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingOptions {
    #[serde(default)]
    pub join_before_host: bool,
    #[serde(default)]
    pub waiting_room: bool,
}

impl MeetingOptions {
    /// Resolve the exclusivity conflict: when both flags arrive enabled,
    /// `join_before_host` wins and the waiting room is forced off.
    pub fn resolved(self) -> Self {
        if self.join_before_host && self.waiting_room {
            Self { join_before_host: true, waiting_room: false }
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_flags_enabled_drops_waiting_room() {
        let resolved = MeetingOptions { join_before_host: true, waiting_room: true }.resolved();
        assert!(resolved.join_before_host);
        assert!(!resolved.waiting_room);
    }

    #[test]
    fn single_flags_pass_through() {
        let waiting_only = MeetingOptions { join_before_host: false, waiting_room: true };
        assert_eq!(waiting_only.resolved(), waiting_only);

        let join_only = MeetingOptions { join_before_host: true, waiting_room: false };
        assert_eq!(join_only.resolved(), join_only);

        assert_eq!(MeetingOptions::default().resolved(), MeetingOptions::default());
    }
}
