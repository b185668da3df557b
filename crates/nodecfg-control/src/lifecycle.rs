//! Configuration-state machine.
//!
//! ```text
//!     ┌─────────────┐   (pattern resolved,    ┌────────────┐
//!     │ configuring │ ─────────────────────▶  │ configured │
//!     └─────────────┘  dependencies created)  └────────────┘
//! ```
//!
//! `configuring` is the initial state and also the state reported for a node
//! with no registered device. The only transition is `configuring` to
//! `configured`; requesting the current state is a no-op.

use nodecfg_store::ConfigState;

use crate::error::{ControlError, Result};

/// What to do with a requested state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The node is already in the requested state.
    NoOp,
    /// Move the node into the contained state.
    Apply(ConfigState),
}

/// True if the requested state equals the current one.
#[must_use]
pub fn is_noop(from: ConfigState, to: ConfigState) -> bool {
    from == to
}

/// Check if a state transition is valid according to the state machine.
#[must_use]
pub const fn is_valid_transition(from: ConfigState, to: ConfigState) -> bool {
    matches!((from, to), (ConfigState::Configuring, ConfigState::Configured))
}

/// [`is_valid_transition`] over raw state names. Unknown names are invalid.
#[must_use]
pub fn is_valid_transition_str(from: &str, to: &str) -> bool {
    match (ConfigState::parse(from), ConfigState::parse(to)) {
        (Some(from), Some(to)) => is_valid_transition(from, to),
        _ => false,
    }
}

/// Parse a requested state name.
///
/// # Errors
///
/// Returns `ControlError::UnsupportedState` for anything other than
/// `configuring` or `configured`.
pub fn parse_requested_state(raw: &str) -> Result<ConfigState> {
    ConfigState::parse(raw).ok_or_else(|| ControlError::UnsupportedState(raw.to_string()))
}

/// Decide how to handle a request to move from `from` to `to`.
///
/// # Errors
///
/// Returns `ControlError::UnsupportedTransition` if the change is neither a
/// no-op nor a valid transition.
pub fn plan_transition(from: ConfigState, to: ConfigState) -> Result<Transition> {
    if is_noop(from, to) {
        Ok(Transition::NoOp)
    } else if is_valid_transition(from, to) {
        Ok(Transition::Apply(to))
    } else {
        Err(ControlError::UnsupportedTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConfigState::{Configured, Configuring};

    #[test]
    fn same_state_is_noop() {
        for state in ConfigState::ALL {
            assert!(is_noop(state, state));
        }
        assert!(!is_noop(Configuring, Configured));
    }

    #[test]
    fn only_forward_transition_is_valid() {
        assert!(is_valid_transition(Configuring, Configured));

        assert!(!is_valid_transition(Configured, Configuring));
        assert!(!is_valid_transition(Configuring, Configuring));
        assert!(!is_valid_transition(Configured, Configured));
    }

    #[test]
    fn raw_names() {
        assert!(is_valid_transition_str("configuring", "configured"));
        assert!(!is_valid_transition_str("configured", "configuring"));
        assert!(!is_valid_transition_str("configuring", "active"));
        assert!(!is_valid_transition_str("", "configured"));
    }

    #[test]
    fn parse_requested() {
        assert_eq!(parse_requested_state("configured").unwrap(), Configured);
        assert!(matches!(
            parse_requested_state("active"),
            Err(ControlError::UnsupportedState(s)) if s == "active"
        ));
    }

    #[test]
    fn plan() {
        assert_eq!(plan_transition(Configuring, Configuring).unwrap(), Transition::NoOp);
        assert_eq!(plan_transition(Configured, Configured).unwrap(), Transition::NoOp);
        assert_eq!(
            plan_transition(Configuring, Configured).unwrap(),
            Transition::Apply(Configured)
        );
    }

    #[test]
    fn plan_rejects_reverse() {
        match plan_transition(Configured, Configuring) {
            Err(ControlError::UnsupportedTransition { from, to }) => {
                assert_eq!(from, Configured);
                assert_eq!(to, Configuring);
            }
            other => panic!("expected UnsupportedTransition, got {other:?}"),
        }
    }
}
