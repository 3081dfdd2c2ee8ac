//! Pending variable edits made by an administrator before they are saved.

use std::collections::BTreeMap;

use crate::{Sport, VariableValue, Variables};

/// Staged variable edits, keyed by sport name then variable key.
///
/// Drafts never touch a [`Sport`] on their own. [`VariableDrafts::apply_to`]
/// produces the merged variables and [`VariableDrafts::take`] clears the
/// staged edits once the caller has persisted them.
///
/// # Examples
/// ```
/// use sportfit_core::{Sport, VariableDrafts, VariableValue, Variables};
///
/// let judo = Sport::new("judo", Variables::from([("minWeight", 60)]));
/// let mut drafts = VariableDrafts::new();
/// drafts.stage("judo", "minWeight", 66);
/// assert_eq!(
///     drafts.apply_to(&judo).get("minWeight"),
///     Some(&VariableValue::Number(66.0))
/// );
/// drafts.discard("judo");
/// assert!(!drafts.has_pending("judo"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableDrafts {
    staged: BTreeMap<String, Variables>,
}

impl VariableDrafts {
    /// Construct an empty draft set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `value` for variable `key` of sport `sport`.
    ///
    /// Staging the same key twice keeps the later value.
    pub fn stage(
        &mut self,
        sport: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<VariableValue>,
    ) {
        self.staged
            .entry(sport.into())
            .or_default()
            .insert(key, value);
    }

    /// Edits staged for `sport`, if any.
    pub fn pending(&self, sport: &str) -> Option<&Variables> {
        self.staged.get(sport)
    }

    /// Report whether `sport` has staged edits.
    pub fn has_pending(&self, sport: &str) -> bool {
        self.staged.get(sport).is_some_and(|edits| !edits.is_empty())
    }

    /// Remove and return the edits staged for `sport`.
    pub fn take(&mut self, sport: &str) -> Variables {
        self.staged.remove(sport).unwrap_or_default()
    }

    /// Drop every edit staged for `sport`.
    pub fn discard(&mut self, sport: &str) {
        self.staged.remove(sport);
    }

    /// Variables of `sport` with its staged edits laid over them.
    pub fn apply_to(&self, sport: &Sport) -> Variables {
        let mut merged = sport.variables.clone();
        if let Some(edits) = self.staged.get(sport.name()) {
            merged.extend(
                edits
                    .iter()
                    .map(|(key, value)| (key.to_owned(), value.clone())),
            );
        }
        merged
    }
}
