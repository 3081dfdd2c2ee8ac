//! Ports for reading and writing the sport and measure catalog.
//!
//! [`CatalogSource`] loads what the ranking and admin contexts start from;
//! [`SportCatalogWriter`] persists administrator edits. Both are implemented
//! by the SQLite store and by the in-memory test catalog.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

use crate::{Measure, Sport, Variables};

/// Boxed error carried by storage failures.
pub type BoxedStorageError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors raised while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The backing catalog could not be reached.
    #[error("catalog is unavailable: {message}")]
    Unavailable { message: String },
    /// Reading or decoding stored rows failed.
    #[error("failed to read the catalog: {source}")]
    Storage {
        #[source]
        source: BoxedStorageError,
    },
}

impl CatalogError {
    /// Wrap a backend error as [`CatalogError::Storage`].
    pub fn storage(source: impl Into<BoxedStorageError>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }
}

/// Errors raised when persisting an administrator edit.
#[derive(Debug, Error)]
pub enum CatalogMutationError {
    /// A sport with this name already exists.
    #[error("sport '{name}' already exists")]
    Duplicate { name: String },
    /// No sport with this name is stored.
    #[error("sport '{name}' does not exist")]
    NotFound { name: String },
    /// The backend refused the edit.
    #[error("sport '{name}' could not be saved: {message}")]
    Rejected { name: String, message: String },
    /// Writing to the backend failed.
    #[error("failed to store sport '{name}': {source}")]
    Storage {
        name: String,
        #[source]
        source: BoxedStorageError,
    },
}

impl CatalogMutationError {
    /// Wrap a backend error for the sport `name`.
    pub fn storage(name: impl Into<String>, source: impl Into<BoxedStorageError>) -> Self {
        Self::Storage {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Name of the sport the failed edit targeted.
    pub fn sport(&self) -> &str {
        match self {
            Self::Duplicate { name }
            | Self::NotFound { name }
            | Self::Rejected { name, .. }
            | Self::Storage { name, .. } => name,
        }
    }
}

/// Read access to the persisted catalog.
///
/// # Examples
///
/// ```rust
/// use sportfit_core::test_support::MemoryCatalog;
/// use sportfit_core::{CatalogSource, Sport, Variables};
///
/// let catalog = MemoryCatalog::with_sports([Sport::new("judo", Variables::new())]);
/// let sports = catalog.list_sports()?;
/// assert_eq!(sports[0].name(), "judo");
/// # Ok::<(), sportfit_core::CatalogError>(())
/// ```
pub trait CatalogSource {
    /// Return every sport, disabled ones included, in catalog order.
    fn list_sports(&self) -> Result<Vec<Sport>, CatalogError>;

    /// Return the blank template new sports start from.
    ///
    /// Catalogs without a template return a sport with no variables.
    fn sport_template(&self) -> Result<Sport, CatalogError>;

    /// Return the measures users can answer, in display order.
    fn list_measures(&self) -> Result<Vec<Measure>, CatalogError>;
}

/// Write access used by the sport administration flow.
///
/// Every method either fully applies the edit or returns an error and leaves
/// the stored catalog untouched.
pub trait SportCatalogWriter {
    /// Persist a new sport and return it as stored.
    fn create_sport(&self, sport: &Sport, disabled: bool) -> Result<Sport, CatalogMutationError>;

    /// Replace the variables of an existing sport.
    fn update_sport_variables(
        &self,
        name: &str,
        variables: &Variables,
    ) -> Result<(), CatalogMutationError>;

    /// Enable or disable an existing sport.
    fn set_sport_disabled(&self, name: &str, disabled: bool) -> Result<(), CatalogMutationError>;

    /// Remove a sport.
    fn delete_sport(&self, name: &str) -> Result<(), CatalogMutationError>;
}

impl<C: CatalogSource + ?Sized> CatalogSource for &C {
    fn list_sports(&self) -> Result<Vec<Sport>, CatalogError> {
        (**self).list_sports()
    }

    fn sport_template(&self) -> Result<Sport, CatalogError> {
        (**self).sport_template()
    }

    fn list_measures(&self) -> Result<Vec<Measure>, CatalogError> {
        (**self).list_measures()
    }
}

impl<C: CatalogSource + ?Sized> CatalogSource for Arc<C> {
    fn list_sports(&self) -> Result<Vec<Sport>, CatalogError> {
        (**self).list_sports()
    }

    fn sport_template(&self) -> Result<Sport, CatalogError> {
        (**self).sport_template()
    }

    fn list_measures(&self) -> Result<Vec<Measure>, CatalogError> {
        (**self).list_measures()
    }
}

impl<W: SportCatalogWriter + ?Sized> SportCatalogWriter for &W {
    fn create_sport(&self, sport: &Sport, disabled: bool) -> Result<Sport, CatalogMutationError> {
        (**self).create_sport(sport, disabled)
    }

    fn update_sport_variables(
        &self,
        name: &str,
        variables: &Variables,
    ) -> Result<(), CatalogMutationError> {
        (**self).update_sport_variables(name, variables)
    }

    fn set_sport_disabled(&self, name: &str, disabled: bool) -> Result<(), CatalogMutationError> {
        (**self).set_sport_disabled(name, disabled)
    }

    fn delete_sport(&self, name: &str) -> Result<(), CatalogMutationError> {
        (**self).delete_sport(name)
    }
}

impl<W: SportCatalogWriter + ?Sized> SportCatalogWriter for Arc<W> {
    fn create_sport(&self, sport: &Sport, disabled: bool) -> Result<Sport, CatalogMutationError> {
        (**self).create_sport(sport, disabled)
    }

    fn update_sport_variables(
        &self,
        name: &str,
        variables: &Variables,
    ) -> Result<(), CatalogMutationError> {
        (**self).update_sport_variables(name, variables)
    }

    fn set_sport_disabled(&self, name: &str, disabled: bool) -> Result<(), CatalogMutationError> {
        (**self).set_sport_disabled(name, disabled)
    }

    fn delete_sport(&self, name: &str) -> Result<(), CatalogMutationError> {
        (**self).delete_sport(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io;

    #[rstest]
    fn mutation_errors_name_their_sport() {
        let error = CatalogMutationError::storage("judo", io::Error::other("disk full"));
        assert_eq!(error.sport(), "judo");
        assert_eq!(error.to_string(), "failed to store sport 'judo': disk full");
        assert!(StdError::source(&error).is_some());
    }

    #[rstest]
    fn storage_error_keeps_its_source() {
        let error = CatalogError::storage(io::Error::other("locked"));
        assert_eq!(error.to_string(), "failed to read the catalog: locked");
    }
}
