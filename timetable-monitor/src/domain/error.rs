//! Domain error types.
//!
//! These errors represent misuse of the domain operations. They are
//! distinct from feed and IO errors.

use super::StopIdentity;

/// Errors from combining stop records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// The two records describe different stop visits. Callers key records
    /// by identity, so this indicates a bug rather than bad feed data.
    #[error("cannot merge stop {change} into stop {base}")]
    IdentityMismatch {
        base: StopIdentity,
        change: StopIdentity,
    },
}
