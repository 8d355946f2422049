use crate::error::PersistenceError;

/// Result of an operation that succeeded in memory but may not have reached
/// disk. `warning` holds the storage failure, if any; the in-memory effect is
/// never rolled back.
#[must_use]
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub warning: Option<PersistenceError>,
}

impl<T> Outcome<T> {
    pub(crate) fn durable(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub(crate) fn with_warning(value: T, warning: PersistenceError) -> Self {
        Self {
            value,
            warning: Some(warning),
        }
    }

    /// `true` when the backing store confirmed the change.
    pub fn is_durable(&self) -> bool {
        self.warning.is_none()
    }

    pub fn into_parts(self) -> (T, Option<PersistenceError>) {
        (self.value, self.warning)
    }
}
