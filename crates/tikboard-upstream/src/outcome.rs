use tikboard_core::FailureKind;

use crate::error::UpstreamError;

/// Terminal result of one upstream call inside a fan-out.
///
/// Unlike `Result`, an outcome is always merged: a failure contributes an empty
/// slot and a status entry instead of aborting the whole request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Success(T),
    Failure { kind: FailureKind, message: String },
}

impl<T> FetchOutcome<T> {
    #[must_use]
    pub fn from_result(result: Result<T, UpstreamError>) -> Self {
        match result {
            Ok(value) => FetchOutcome::Success(value),
            Err(err) => FetchOutcome::Failure {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }

    /// Outcome of a call abandoned because the consolidation deadline passed.
    #[must_use]
    pub fn deadline_exceeded() -> Self {
        FetchOutcome::Failure {
            kind: FailureKind::Timeout,
            message: "consolidation deadline exceeded".to_owned(),
        }
    }

    /// Splits the outcome into the payload (or `T::default()` on failure) and
    /// the failure kind, if any.
    pub fn into_parts(self) -> (T, Option<FailureKind>)
    where
        T: Default,
    {
        match self {
            FetchOutcome::Success(value) => (value, None),
            FetchOutcome::Failure { kind, .. } => (T::default(), Some(kind)),
        }
    }
}
