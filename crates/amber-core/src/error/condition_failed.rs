use super::Error;

/// Error when a versioned write matched no rows.
///
/// The row was changed or removed by another writer since it was loaded.
#[derive(Debug)]
pub(super) struct ConditionFailedError {
    context: Box<str>,
}

impl std::error::Error for ConditionFailedError {}

impl core::fmt::Display for ConditionFailedError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "condition failed: {}", self.context)
    }
}

impl Error {
    /// Creates a condition failed error.
    pub fn condition_failed(context: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::ConditionFailed(ConditionFailedError {
            context: context.into().into(),
        }))
    }

    /// Returns `true` if this error is a condition failed error.
    pub fn is_condition_failed(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ConditionFailed(_))
    }
}
