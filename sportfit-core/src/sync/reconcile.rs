//! Compare sports with their templates and reconcile them.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use log::{debug, warn};

use crate::Sport;

use super::diff::SyncDiff;
use super::error::{SyncError, TemplateFetchError};
use super::source::TemplateSource;

/// Outcome of comparing a sport with its template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Local variables match the template exactly.
    InSync,
    /// Local variables differ from the template.
    OutOfSync(SyncDiff),
    /// The template could not be fetched.
    Unknown(TemplateFetchError),
}

impl SyncStatus {
    /// Whether the sport should be offered for syncing.
    ///
    /// An unknown status counts as out of sync so a failed fetch never hides
    /// a sport that may have drifted.
    pub fn needs_sync(&self) -> bool {
        !matches!(self, Self::InSync)
    }
}

/// Sync a sport's variables from a [`TemplateSource`].
///
/// At most one [`SportSync::sync`] per sport runs at a time; a second call
/// for the same sport while the first is fetching is rejected.
///
/// # Examples
/// ```
/// use sportfit_core::test_support::MemoryCatalog;
/// use sportfit_core::{Sport, SportSync, Variables};
///
/// let templates = MemoryCatalog::default();
/// templates.set_template_variables("rowing", Variables::from([("minAge", 18)]));
/// let sync = SportSync::new(templates);
///
/// let rowing = Sport::new("rowing", Variables::from([("minAge", 16)]));
/// assert!(sync.check_out_of_sync(&rowing));
///
/// let synced = sync.sync(&rowing)?;
/// assert_eq!(synced.variables.number("minAge"), Ok(Some(18.0)));
/// assert!(!sync.check_out_of_sync(&synced));
/// # Ok::<(), sportfit_core::SyncError>(())
/// ```
#[derive(Debug)]
pub struct SportSync<T> {
    source: T,
    in_flight: Mutex<HashSet<String>>,
}

impl<T: TemplateSource> SportSync<T> {
    /// Construct a sync component reading templates from `source`.
    pub fn new(source: T) -> Self {
        Self {
            source,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// The template source in use.
    pub fn source(&self) -> &T {
        &self.source
    }

    /// Compare `sport` with its template.
    pub fn status(&self, sport: &Sport) -> SyncStatus {
        match self.source.template_variables(sport.name()) {
            Ok(template) => {
                let diff = SyncDiff::between(&sport.variables, &template);
                if diff.is_empty() {
                    SyncStatus::InSync
                } else {
                    SyncStatus::OutOfSync(diff)
                }
            }
            Err(error) => {
                warn!(
                    "could not fetch template for sport '{}': {error}",
                    sport.name()
                );
                SyncStatus::Unknown(error)
            }
        }
    }

    /// Report whether `sport` differs from its template.
    ///
    /// Fetch failures are logged and reported as `true`. `sport` is never
    /// modified.
    pub fn check_out_of_sync(&self, sport: &Sport) -> bool {
        self.status(sport).needs_sync()
    }

    /// Return `sport` carrying exactly its template's variables.
    ///
    /// The name and disabled switch are kept. Keys missing from the template
    /// are dropped.
    ///
    /// # Errors
    /// Returns [`SyncError::AlreadyInFlight`] when a sync for the same sport
    /// is running and [`SyncError::Fetch`] when the template is unavailable.
    /// In both cases no sport is produced.
    pub fn sync(&self, sport: &Sport) -> Result<Sport, SyncError> {
        let _guard = InFlightGuard::acquire(&self.in_flight, sport.name())?;
        let template = self.source.template_variables(sport.name())?;
        let diff = SyncDiff::between(&sport.variables, &template);
        debug!(
            "synced sport '{}': {} added, {} removed, {} changed",
            sport.name(),
            diff.added.len(),
            diff.removed.len(),
            diff.changed.len()
        );
        Ok(sport.with_variables(template))
    }

    /// Report whether a sync for `sport` is running.
    pub fn is_in_flight(&self, sport: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(sport)
    }
}

/// Marks a sport as syncing until dropped.
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    sport: String,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(in_flight: &'a Mutex<HashSet<String>>, sport: &str) -> Result<Self, SyncError> {
        let inserted = in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(sport.to_owned());
        if !inserted {
            return Err(SyncError::AlreadyInFlight {
                sport: sport.to_owned(),
            });
        }
        Ok(Self {
            in_flight,
            sport: sport.to_owned(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.sport);
    }
}
