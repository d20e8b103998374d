//! Strategy-name conventions.
//!
//! Every pluggable strategy is addressable by a unique string name carrying a
//! fixed prefix for its kind. Names only matter at the system boundary
//! (topology deserialization and the training-loop entry point), where each
//! kind's `from_name` constructor resolves them; inside the crate strategies
//! are plain enum values.

use crate::error::{NnError, Result};

pub const ACTIVATION_PREFIX: &str = "ac_";
pub const ERROR_FN_PREFIX: &str = "er_";
pub const UPDATE_RULE_PREFIX: &str = "up_";
pub const LABELER_PREFIX: &str = "la_";
pub const METRIC_PREFIX: &str = "me_";
pub const TRAINING_LOOP_PREFIX: &str = "tr_";

/// Rejects a name that does not carry the expected kind prefix.
pub fn check_prefix(name: &str, prefix: &str) -> Result<()> {
    if name.starts_with(prefix) {
        Ok(())
    } else {
        Err(NnError::NameResolution(format!(
            "'{name}' does not carry the '{prefix}' prefix"
        )))
    }
}

/// Error for a name with the right prefix but no registered strategy.
pub(crate) fn unknown(name: &str, kind: &str) -> NnError {
    NnError::NameResolution(format!("no {kind} registered under '{name}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_prefix() {
        assert!(check_prefix("ac_sigmoid", ACTIVATION_PREFIX).is_ok());
    }

    #[test]
    fn rejects_wrong_prefix() {
        let err = check_prefix("up_backpropagation", METRIC_PREFIX);
        assert!(matches!(err, Err(NnError::NameResolution(_))));
    }
}
