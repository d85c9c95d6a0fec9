//! Location permission states, mirroring what mobile platforms report.

/// Authorization status for location access as reported by the device.
///
/// `Unknown` covers values a future platform might add that this build does
/// not recognise; it is treated like `Undetermined` (prompt again) rather
/// than like a refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationState {
    /// The user has never been asked.
    #[default]
    Undetermined,
    /// Blocked by device policy (parental controls, MDM). The user cannot
    /// change this from a prompt.
    Restricted,
    /// The user explicitly refused. Only a trip to system settings can
    /// change this.
    Denied,
    AuthorizedAlways,
    AuthorizedWhenInUse,
    /// Unrecognised platform value.
    Unknown,
}

impl AuthorizationState {
    /// True when the device will deliver position fixes.
    pub fn is_authorized(self) -> bool {
        matches!(
            self,
            AuthorizationState::AuthorizedAlways | AuthorizationState::AuthorizedWhenInUse
        )
    }

    /// True when asking again is pointless; the user has to go through
    /// system settings instead.
    pub fn is_blocked(self) -> bool {
        matches!(
            self,
            AuthorizationState::Denied | AuthorizationState::Restricted
        )
    }

    /// Short human-readable form for status displays.
    pub fn label(self) -> &'static str {
        match self {
            AuthorizationState::Undetermined => "Not Determined",
            AuthorizationState::Restricted => "Restricted",
            AuthorizationState::Denied => "Denied",
            AuthorizationState::AuthorizedAlways => "Authorized (Always)",
            AuthorizationState::AuthorizedWhenInUse => "Authorized (When in Use)",
            AuthorizationState::Unknown => "Unknown",
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
