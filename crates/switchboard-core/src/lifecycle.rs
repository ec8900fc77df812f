//! Lifecycle state machine - enable/disable eligibility per record.
//!
//! The controller only tracks whether a record's connector is
//! eligible to run. Actually starting a stdio process or opening an
//! SSE connection is the connector supervisor's job; it observes the
//! lifecycle feed (see `event`) and reacts.

use serde::{Deserialize, Serialize};

/// Eligibility state of a record's connector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Disabled,
    Enabled,
}

impl LifecycleState {
    /// Initial state at creation: `Enabled` unless the draft
    /// explicitly opted out.
    pub fn from_flag(enabled: bool) -> Self {
        if enabled { Self::Enabled } else { Self::Disabled }
    }

    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }

    /// Apply a transition. Returns the new state and whether anything
    /// changed; transitioning to the current state is a no-op success.
    pub fn apply(self, transition: Transition) -> (Self, bool) {
        let next = match transition {
            Transition::Enable => Self::Enabled,
            Transition::Disable => Self::Disabled,
        };
        (next, next != self)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Enabled => write!(f, "enabled"),
        }
    }
}

/// Requested lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Enable,
    Disable,
}

/// What the connector supervisor is told about a record. `Removed`
/// carries teardown intent: it is published before the record leaves
/// the store, so a running connector never outlives its owner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorState {
    Enabled,
    Disabled,
    Removed,
}

impl From<LifecycleState> for ConnectorState {
    fn from(state: LifecycleState) -> Self {
        match state {
            LifecycleState::Enabled => Self::Enabled,
            LifecycleState::Disabled => Self::Disabled,
        }
    }
}
