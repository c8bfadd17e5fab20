use super::Error;

/// Error raised by the storage connection.
#[derive(Debug)]
pub(super) struct StorageError {
    inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "storage error: {}", self.inner)?;
        let mut source = self.inner.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl Error {
    /// Wraps an error returned by the storage connection.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::Storage(StorageError {
            inner: Box::new(err),
        }))
    }

    /// Creates a storage error from a message.
    pub fn storage_failed(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Storage(StorageError {
            inner: message.into().into(),
        }))
    }

    /// Returns `true` if this error came from the storage connection.
    pub fn is_storage(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Storage(_))
    }
}
