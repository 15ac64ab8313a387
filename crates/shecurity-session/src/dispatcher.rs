//! Alert dispatch states and outcomes.
//!
//! ```text
//! Idle ─activate─▶ AwaitingCredentials           (phone or email blank)
//!      └────────▶ AwaitingLocation               (no position yet)
//!      └────────▶ Dispatching ─▶ Delivered ─▶ Idle
//!                             └▶ Failed    ─▶ Idle
//! ```
//!
//! `AwaitingCredentials` and `AwaitingLocation` are resting states: the next
//! activation re-runs every check from the top. Reset returns to `Idle` from
//! anywhere.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    AwaitingCredentials,
    AwaitingLocation,
    Dispatching,
    Delivered,
    Failed,
}

impl std::fmt::Display for DispatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DispatchState::Idle => "idle",
            DispatchState::AwaitingCredentials => "awaiting_credentials",
            DispatchState::AwaitingLocation => "awaiting_location",
            DispatchState::Dispatching => "dispatching",
            DispatchState::Delivered => "delivered",
            DispatchState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What started an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Manual,
    Voice,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Manual => write!(f, "manual"),
            Trigger::Voice => write!(f, "voice"),
        }
    }
}

/// Result of one activation, carrying the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// Phone or email is blank. Nothing was sent.
    MissingCredentials,
    /// Credentials are fine but no position has resolved yet. Nothing was sent.
    AwaitingLocation,
    /// The endpoint accepted the alert; `message` is its reply, verbatim.
    Delivered { message: String },
    /// The alert could not be delivered.
    Failed { reason: String },
    /// Another activation is still running. Nothing was sent.
    AlreadyInFlight,
}

impl ActivationOutcome {
    /// User-facing notice for this outcome.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            ActivationOutcome::MissingCredentials => {
                "Please enter Emergency Number and Email".to_string()
            }
            ActivationOutcome::AwaitingLocation => {
                "Fetching your location. Activate again once it is found.".to_string()
            }
            ActivationOutcome::Delivered { message } => message.clone(),
            ActivationOutcome::Failed { reason } => format!("Error sending alert: {reason}"),
            ActivationOutcome::AlreadyInFlight => "An alert is already being sent.".to_string(),
        }
    }

    /// `true` if an outbound request was made.
    #[must_use]
    pub fn dispatched(&self) -> bool {
        matches!(
            self,
            ActivationOutcome::Delivered { .. } | ActivationOutcome::Failed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivered_notice_is_verbatim() {
        let outcome = ActivationOutcome::Delivered {
            message: "Alert sent to +91******10".to_string(),
        };
        assert_eq!(outcome.notice(), "Alert sent to +91******10");
    }

    #[test]
    fn failed_notice_includes_reason() {
        let outcome = ActivationOutcome::Failed {
            reason: "connection refused".to_string(),
        };
        assert_eq!(outcome.notice(), "Error sending alert: connection refused");
    }

    #[test]
    fn only_terminal_outcomes_count_as_dispatched() {
        assert!(!ActivationOutcome::MissingCredentials.dispatched());
        assert!(!ActivationOutcome::AwaitingLocation.dispatched());
        assert!(!ActivationOutcome::AlreadyInFlight.dispatched());
        assert!(ActivationOutcome::Failed {
            reason: String::new()
        }
        .dispatched());
    }
}
