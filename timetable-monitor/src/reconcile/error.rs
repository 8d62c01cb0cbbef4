//! Reconciliation error types.

use crate::domain::MergeError;
use crate::timetables::FeedError;

/// Errors from refreshing the reconciled view.
///
/// Either way the previous view is left as it was.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("feed fetch failed: {0}")]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Merge(#[from] MergeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_error_display() {
        let err = ReconcileError::from(FeedError::RateLimited);
        assert!(err.to_string().starts_with("feed fetch failed: "));
    }
}
