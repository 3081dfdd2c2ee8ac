//! Administrator workflow: create, edit, switch, delete and sync sports.
//!
//! [`SportManager`] keeps an admin view of the catalog (disabled sports
//! included) and writes every change through a [`SportCatalogWriter`]
//! before committing it locally. A failed write leaves the local view as it
//! was and raises an error notification.

use log::debug;
use thiserror::Error;

use crate::{
    CatalogError, CatalogMutationError, CatalogSource, Notifier, Severity, Sport,
    SportCatalogWriter, SportKeyError, SportSync, SyncError, SyncStatus, TemplateSource,
    VariableDrafts, VariableValue, sport_key,
};

/// Errors returned by [`SportManager`] operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The requested sport name normalises to nothing.
    #[error(transparent)]
    InvalidSportKey(#[from] SportKeyError),
    /// No sport with this name is loaded.
    #[error("unknown sport '{name}'")]
    UnknownSport { name: String },
    /// The catalog writer refused the change.
    #[error(transparent)]
    Mutation(#[from] CatalogMutationError),
    /// The template could not be synced.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Admin context over the sport catalog.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use sportfit_core::test_support::{MemoryCatalog, RecordingNotifier};
/// use sportfit_core::{SportManager, Variables};
///
/// let catalog = Arc::new(MemoryCatalog::default());
/// let mut manager = SportManager::load(
///     &*catalog,
///     Arc::clone(&catalog),
///     Arc::clone(&catalog),
///     RecordingNotifier::default(),
/// )?;
///
/// manager.stage_variable("table_tennis", "minAge", 8);
/// let created = manager.create_sport("Table Tennis", false)?;
/// assert_eq!(created.name(), "table_tennis");
/// assert_eq!(created.variables.number("minAge"), Ok(Some(8.0)));
/// assert!(catalog.sport("table_tennis").is_some());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SportManager<W, T, N> {
    sports: Vec<Sport>,
    template: Sport,
    writer: W,
    sync: SportSync<T>,
    drafts: VariableDrafts,
    notifier: N,
}

impl<W, T, N> SportManager<W, T, N>
where
    W: SportCatalogWriter,
    T: TemplateSource,
    N: Notifier,
{
    /// Load the admin view and blank template from `source`.
    ///
    /// # Errors
    /// Returns the [`CatalogError`] raised by `source`.
    pub fn load<C>(source: &C, writer: W, templates: T, notifier: N) -> Result<Self, CatalogError>
    where
        C: CatalogSource + ?Sized,
    {
        Ok(Self {
            sports: source.list_sports()?,
            template: source.sport_template()?,
            writer,
            sync: SportSync::new(templates),
            drafts: VariableDrafts::new(),
            notifier,
        })
    }

    /// Reload sports and the blank template, keeping staged drafts.
    ///
    /// # Errors
    /// Returns the [`CatalogError`] raised by `source`; the manager keeps its
    /// previous view in that case.
    pub fn refresh<C>(&mut self, source: &C) -> Result<(), CatalogError>
    where
        C: CatalogSource + ?Sized,
    {
        let sports = source.list_sports()?;
        let template = source.sport_template()?;
        self.sports = sports;
        self.template = template;
        Ok(())
    }

    /// Every loaded sport, disabled ones included.
    pub fn sports(&self) -> &[Sport] {
        &self.sports
    }

    /// Look up a loaded sport by name.
    pub fn sport(&self, name: &str) -> Option<&Sport> {
        self.sports.iter().find(|sport| sport.name() == name)
    }

    /// The blank template new sports start from.
    pub fn template(&self) -> &Sport {
        &self.template
    }

    /// Staged variable edits.
    pub fn drafts(&self) -> &VariableDrafts {
        &self.drafts
    }

    /// The sync component used by [`Self::sync_sport`].
    pub fn sync(&self) -> &SportSync<T> {
        &self.sync
    }

    /// The notifier receiving admin messages.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Stage a variable edit for `sport` without saving it.
    ///
    /// Edits for a sport that is about to be created are staged under its
    /// normalised key.
    pub fn stage_variable(
        &mut self,
        sport: &str,
        key: impl Into<String>,
        value: impl Into<VariableValue>,
    ) {
        self.drafts.stage(sport, key, value);
    }

    /// Drop the edits staged for `name`.
    pub fn discard_drafts(&mut self, name: &str) {
        self.drafts.discard(name);
    }

    /// Save the edits staged for `name`.
    ///
    /// Nothing is written when no edits are staged.
    ///
    /// # Errors
    /// Returns [`AdminError::UnknownSport`] or the writer's failure; staged
    /// edits are kept on failure.
    pub fn apply_drafts(&mut self, name: &str) -> Result<(), AdminError> {
        let result = self.try_apply_drafts(name);
        self.report(result, &format!("Failed to update sport {name}"))?;
        Ok(())
    }

    fn try_apply_drafts(&mut self, name: &str) -> Result<(), AdminError> {
        let sport = self.stored(name)?;
        if !self.drafts.has_pending(name) {
            return Ok(());
        }
        let merged = self.drafts.apply_to(sport);
        self.writer.update_sport_variables(name, &merged)?;
        self.stored_mut(name)?.variables = merged;
        self.drafts.discard(name);
        debug!("saved staged variables for sport '{name}'");
        self.notifier
            .notify(&format!("Sport {name} updated."), Severity::Success);
        Ok(())
    }

    /// Create a sport from the blank template.
    ///
    /// `name` is normalised with [`sport_key`]; edits staged under the
    /// normalised key are applied before the sport is written.
    ///
    /// # Errors
    /// Returns [`AdminError::InvalidSportKey`] for unusable names, or the
    /// writer's failure (for example a duplicate name).
    pub fn create_sport(&mut self, name: &str, disabled: bool) -> Result<Sport, AdminError> {
        let result = self.try_create_sport(name, disabled);
        self.report(result, "Failed to create sport")
    }

    fn try_create_sport(&mut self, name: &str, disabled: bool) -> Result<Sport, AdminError> {
        let key = sport_key(name)?;
        let mut sport = Sport::from_template(&self.template, key.as_str());
        sport.variables = self.drafts.apply_to(&sport);
        let created = self.writer.create_sport(&sport, disabled)?;
        self.drafts.discard(&key);
        self.sports.push(created.clone());
        debug!("created sport '{key}' (disabled: {disabled})");
        self.notifier.notify(
            &format!("Sport '{key}' created successfully!"),
            Severity::Success,
        );
        Ok(created)
    }

    /// Enable or disable `name`.
    ///
    /// # Errors
    /// Returns [`AdminError::UnknownSport`] or the writer's failure.
    pub fn switch_sport(&mut self, name: &str, disabled: bool) -> Result<(), AdminError> {
        let result = self.try_switch_sport(name, disabled);
        self.report(result, &format!("Failed to switch sport {name}"))
    }

    fn try_switch_sport(&mut self, name: &str, disabled: bool) -> Result<(), AdminError> {
        self.stored(name)?;
        self.writer.set_sport_disabled(name, disabled)?;
        self.stored_mut(name)?.disabled = disabled;
        let state = if disabled { "disabled" } else { "enabled" };
        self.notifier
            .notify(&format!("Sport {name} {state}."), Severity::Success);
        Ok(())
    }

    /// Delete `name` and drop its staged edits.
    ///
    /// # Errors
    /// Returns [`AdminError::UnknownSport`] or the writer's failure.
    pub fn delete_sport(&mut self, name: &str) -> Result<(), AdminError> {
        let result = self.try_delete_sport(name);
        self.report(result, &format!("Failed to delete sport {name}"))
    }

    fn try_delete_sport(&mut self, name: &str) -> Result<(), AdminError> {
        self.stored(name)?;
        self.writer.delete_sport(name)?;
        self.sports.retain(|sport| sport.name() != name);
        self.drafts.discard(name);
        self.notifier
            .notify(&format!("Sport {name} deleted."), Severity::Success);
        Ok(())
    }

    /// Compare `name` with its template.
    ///
    /// # Errors
    /// Returns [`AdminError::UnknownSport`] when `name` is not loaded.
    pub fn sync_status(&self, name: &str) -> Result<SyncStatus, AdminError> {
        Ok(self.sync.status(self.stored(name)?))
    }

    /// Whether `name` should be offered for syncing.
    ///
    /// # Errors
    /// Returns [`AdminError::UnknownSport`] when `name` is not loaded.
    pub fn is_out_of_sync(&self, name: &str) -> Result<bool, AdminError> {
        Ok(self.sync.check_out_of_sync(self.stored(name)?))
    }

    /// Replace the variables of `name` with its template and save them.
    ///
    /// # Errors
    /// Returns [`AdminError::UnknownSport`], the [`SyncError`] from fetching
    /// the template, or the writer's failure. The sport is unchanged on
    /// failure.
    pub fn sync_sport(&mut self, name: &str) -> Result<Sport, AdminError> {
        let result = self.try_sync_sport(name);
        self.report(result, &format!("Failed to sync sport {name}"))
    }

    fn try_sync_sport(&mut self, name: &str) -> Result<Sport, AdminError> {
        let synced = self.sync.sync(self.stored(name)?)?;
        self.writer
            .update_sport_variables(name, &synced.variables)?;
        *self.stored_mut(name)? = synced.clone();
        self.notifier.notify(
            &format!("Sport {name} synced, check new variables."),
            Severity::Success,
        );
        Ok(synced)
    }

    fn stored(&self, name: &str) -> Result<&Sport, AdminError> {
        self.sport(name).ok_or_else(|| AdminError::UnknownSport {
            name: name.to_owned(),
        })
    }

    fn stored_mut(&mut self, name: &str) -> Result<&mut Sport, AdminError> {
        self.sports
            .iter_mut()
            .find(|sport| sport.name() == name)
            .ok_or_else(|| AdminError::UnknownSport {
                name: name.to_owned(),
            })
    }

    fn report<R>(&self, result: Result<R, AdminError>, failure: &str) -> Result<R, AdminError> {
        if let Err(error) = &result {
            self.notifier
                .notify(&format!("{failure}: {error}"), Severity::Error);
        }
        result
    }
}
