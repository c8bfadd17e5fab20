use super::Error;

/// A load by key matched no row.
#[derive(Debug)]
pub(super) struct RecordNotFoundError {
    what: Box<str>,
}

impl std::error::Error for RecordNotFoundError {}

impl core::fmt::Display for RecordNotFoundError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "record not found: {}", self.what)
    }
}

impl Error {
    /// Creates a record not found error naming the model and key.
    pub fn record_not_found(what: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::RecordNotFound(RecordNotFoundError {
            what: what.into().into(),
        }))
    }

    /// Returns `true` if this error is a record not found error.
    pub fn is_record_not_found(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::RecordNotFound(_))
    }
}
