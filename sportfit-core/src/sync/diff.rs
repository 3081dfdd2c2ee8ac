//! Key-level differences between a sport's variables and its template.

use std::collections::BTreeSet;

use crate::Variables;

/// Keys that differ between local variables and a template.
///
/// # Examples
/// ```
/// use sportfit_core::{SyncDiff, Variables};
///
/// let local = Variables::from([("minAge", 16), ("minHeight", 170)]);
/// let template = Variables::from([("minAge", 18), ("minWeight", 60)]);
/// let diff = SyncDiff::between(&local, &template);
///
/// assert!(diff.added.contains("minWeight"));
/// assert!(diff.removed.contains("minHeight"));
/// assert!(diff.changed.contains("minAge"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncDiff {
    /// Keys present in the template but not locally.
    pub added: BTreeSet<String>,
    /// Keys present locally but absent from the template.
    pub removed: BTreeSet<String>,
    /// Keys present on both sides with different values.
    pub changed: BTreeSet<String>,
}

impl SyncDiff {
    /// Compare `local` variables with the `template` ones.
    pub fn between(local: &Variables, template: &Variables) -> Self {
        let mut diff = Self::default();
        for (key, template_value) in template.iter() {
            match local.get(key) {
                None => {
                    diff.added.insert(key.to_owned());
                }
                Some(local_value) if local_value != template_value => {
                    diff.changed.insert(key.to_owned());
                }
                Some(_) => {}
            }
        }
        diff.removed = local
            .keys()
            .filter(|key| !template.contains_key(key))
            .map(str::to_owned)
            .collect();
        diff
    }

    /// Report whether both sides hold the same keys and values.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Total number of differing keys.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn identical_variables_have_empty_diff() {
        let variables = Variables::from([("minAge", 16), ("minHeight", 170)]);
        let diff = SyncDiff::between(&variables, &variables.clone());
        assert!(diff.is_empty());
        assert_eq!(diff.len(), 0);
    }

    #[rstest]
    fn type_changes_count_as_changed() {
        let local = Variables::from([("indoor", "yes")]);
        let template = Variables::from([("indoor", true)]);
        let diff = SyncDiff::between(&local, &template);
        assert_eq!(diff.changed.len(), 1);
        assert!(diff.added.is_empty() && diff.removed.is_empty());
    }

    #[rstest]
    fn empty_template_removes_everything() {
        let local = Variables::from([("minAge", 16)]);
        let diff = SyncDiff::between(&local, &Variables::new());
        assert_eq!(diff.removed.iter().collect::<Vec<_>>(), ["minAge"]);
    }
}
