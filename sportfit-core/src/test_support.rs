//! In-memory collaborators used by unit, behaviour, and doc tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    CatalogError, CatalogMutationError, CatalogSource, EvaluationError, FormulaEvaluator, Measure,
    MeasureValues, Notifier, Severity, Sport, SportCatalogWriter, TemplateFetchError,
    TemplateSource, Variables,
};

#[derive(Debug)]
struct MemoryState {
    sports: Vec<Sport>,
    measures: Vec<Measure>,
    blank: Sport,
    templates: BTreeMap<String, Result<Variables, TemplateFetchError>>,
    read_failure: Option<String>,
    write_failure: Option<String>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            sports: Vec::new(),
            measures: Vec::new(),
            blank: Sport::new("template", Variables::new()),
            templates: BTreeMap::new(),
            read_failure: None,
            write_failure: None,
        }
    }
}

/// In-memory catalog implementing every catalog and template port.
///
/// Failures can be injected per concern so tests can check that callers
/// leave their state untouched when the backend refuses an operation.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: Mutex<MemoryState>,
}

impl MemoryCatalog {
    /// Create a catalog holding `sports` in the given order.
    pub fn with_sports<I>(sports: I) -> Self
    where
        I: IntoIterator<Item = Sport>,
    {
        let catalog = Self::default();
        catalog.lock().sports = sports.into_iter().collect();
        catalog
    }

    /// Set the measures users can answer.
    #[must_use]
    pub fn with_measures<I>(self, measures: I) -> Self
    where
        I: IntoIterator<Item = Measure>,
    {
        self.lock().measures = measures.into_iter().collect();
        self
    }

    /// Set the blank template new sports start from.
    #[must_use]
    pub fn with_blank_template(self, template: Sport) -> Self {
        self.lock().blank = template;
        self
    }

    /// Serve `variables` as the template of `sport`.
    pub fn set_template_variables(&self, sport: &str, variables: Variables) {
        self.lock().templates.insert(sport.to_owned(), Ok(variables));
    }

    /// Fail template fetches for `sport` with `error`.
    pub fn set_template_error(&self, sport: &str, error: TemplateFetchError) {
        self.lock().templates.insert(sport.to_owned(), Err(error));
    }

    /// Fail every read with [`CatalogError::Unavailable`], or stop failing.
    pub fn fail_reads(&self, message: Option<&str>) {
        self.lock().read_failure = message.map(str::to_owned);
    }

    /// Fail every write with [`CatalogMutationError::Rejected`], or stop failing.
    pub fn fail_writes(&self, message: Option<&str>) {
        self.lock().write_failure = message.map(str::to_owned);
    }

    /// Copy of the stored sports.
    pub fn sports(&self) -> Vec<Sport> {
        self.lock().sports.clone()
    }

    /// Copy of the stored sport named `name`.
    pub fn sport(&self, name: &str) -> Option<Sport> {
        self.lock()
            .sports
            .iter()
            .find(|sport| sport.name() == name)
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_read(state: &MemoryState) -> Result<(), CatalogError> {
        match &state.read_failure {
            Some(message) => Err(CatalogError::Unavailable {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn check_write(state: &MemoryState, name: &str) -> Result<(), CatalogMutationError> {
        match &state.write_failure {
            Some(message) => Err(CatalogMutationError::Rejected {
                name: name.to_owned(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn with_stored_sport<F>(&self, name: &str, edit: F) -> Result<(), CatalogMutationError>
    where
        F: FnOnce(&mut Sport),
    {
        let mut state = self.lock();
        Self::check_write(&state, name)?;
        let sport = state
            .sports
            .iter_mut()
            .find(|sport| sport.name() == name)
            .ok_or_else(|| CatalogMutationError::NotFound {
                name: name.to_owned(),
            })?;
        edit(sport);
        Ok(())
    }
}

impl CatalogSource for MemoryCatalog {
    fn list_sports(&self) -> Result<Vec<Sport>, CatalogError> {
        let state = self.lock();
        Self::check_read(&state)?;
        Ok(state.sports.clone())
    }

    fn sport_template(&self) -> Result<Sport, CatalogError> {
        let state = self.lock();
        Self::check_read(&state)?;
        Ok(state.blank.clone())
    }

    fn list_measures(&self) -> Result<Vec<Measure>, CatalogError> {
        let state = self.lock();
        Self::check_read(&state)?;
        Ok(state.measures.clone())
    }
}

impl SportCatalogWriter for MemoryCatalog {
    fn create_sport(&self, sport: &Sport, disabled: bool) -> Result<Sport, CatalogMutationError> {
        let mut state = self.lock();
        Self::check_write(&state, sport.name())?;
        if state.sports.iter().any(|stored| stored.name() == sport.name()) {
            return Err(CatalogMutationError::Duplicate {
                name: sport.name().to_owned(),
            });
        }
        let stored = sport.clone().with_disabled(disabled);
        state.sports.push(stored.clone());
        Ok(stored)
    }

    fn update_sport_variables(
        &self,
        name: &str,
        variables: &Variables,
    ) -> Result<(), CatalogMutationError> {
        self.with_stored_sport(name, |sport| sport.variables = variables.clone())
    }

    fn set_sport_disabled(&self, name: &str, disabled: bool) -> Result<(), CatalogMutationError> {
        self.with_stored_sport(name, |sport| sport.disabled = disabled)
    }

    fn delete_sport(&self, name: &str) -> Result<(), CatalogMutationError> {
        let mut state = self.lock();
        Self::check_write(&state, name)?;
        let index = state
            .sports
            .iter()
            .position(|sport| sport.name() == name)
            .ok_or_else(|| CatalogMutationError::NotFound {
                name: name.to_owned(),
            })?;
        state.sports.remove(index);
        Ok(())
    }
}

impl TemplateSource for MemoryCatalog {
    fn template_variables(&self, sport: &str) -> Result<Variables, TemplateFetchError> {
        self.lock()
            .templates
            .get(sport)
            .cloned()
            .unwrap_or_else(|| {
                Err(TemplateFetchError::NotFound {
                    sport: sport.to_owned(),
                })
            })
    }
}

/// `Notifier` that keeps every message for later assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    /// Every notification received so far, oldest first.
    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent notification.
    pub fn last(&self) -> Option<(String, Severity)> {
        self.messages().pop()
    }

    /// Number of notifications with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.messages()
            .iter()
            .filter(|(_, recorded)| *recorded == severity)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((message.to_owned(), severity));
    }
}

/// Scores `measure - minimum` for each `min<Measure>` variable.
///
/// `minHeight` pairs with the `height` measure. A minimum of zero leaves the
/// measure unconstrained and contributes nothing, as do unanswered measures.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarginEvaluator;

impl FormulaEvaluator for MarginEvaluator {
    fn evaluate(&self, variables: &Variables, values: &MeasureValues) -> Result<f64, EvaluationError> {
        let mut score = 0.0;
        for key in variables.keys() {
            let Some(measure) = measure_for_minimum(key) else {
                continue;
            };
            let minimum = variables.number(key)?.unwrap_or(0.0);
            if minimum == 0.0 {
                continue;
            }
            if let Some(value) = values.number(&measure) {
                score += value - minimum;
            }
        }
        Ok(score)
    }
}

fn measure_for_minimum(key: &str) -> Option<String> {
    let rest = key.strip_prefix("min")?;
    let mut chars = rest.chars();
    let first = chars.next().filter(char::is_ascii_uppercase)?;
    Some(first.to_ascii_lowercase().to_string() + chars.as_str())
}

/// Scores a sport with its own `score` variable, ignoring answers.
#[derive(Debug, Default, Clone, Copy)]
pub struct VariableScoreEvaluator;

impl FormulaEvaluator for VariableScoreEvaluator {
    fn evaluate(&self, variables: &Variables, _values: &MeasureValues) -> Result<f64, EvaluationError> {
        Ok(variables.number("score")?.unwrap_or(0.0))
    }
}
