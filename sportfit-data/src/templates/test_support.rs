//! Test utilities for template sources.
//!
//! This module provides [`StubTemplateSource`], a deterministic test double
//! for [`TemplateSource`] that returns pre-configured responses without
//! making actual HTTP requests.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use sportfit_core::{TemplateFetchError, TemplateSource, Variables};

/// Stub `TemplateSource` for testing.
///
/// The stub answers every sport with the same configured response unless a
/// per-sport override was registered, and records the sports it was asked
/// about.
///
/// # Example
///
/// ```
/// use sportfit_core::{TemplateFetchError, TemplateSource, Variables};
/// use sportfit_data::templates::test_support::StubTemplateSource;
///
/// let source = StubTemplateSource::with_variables(Variables::from([("minAge", 16)]))
///     .with_sport_error(
///         "curling",
///         TemplateFetchError::NotFound { sport: "curling".into() },
///     );
///
/// assert_eq!(source.template_variables("rowing")?.len(), 1);
/// assert!(source.template_variables("curling").is_err());
/// assert_eq!(source.requests(), ["rowing", "curling"]);
/// # Ok::<(), TemplateFetchError>(())
/// ```
#[derive(Debug)]
pub struct StubTemplateSource {
    response: StubResponse,
    overrides: BTreeMap<String, StubResponse>,
    requests: Mutex<Vec<String>>,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Variables(Variables),
    Error(TemplateFetchError),
}

impl StubResponse {
    fn resolve(&self) -> Result<Variables, TemplateFetchError> {
        match self {
            Self::Variables(variables) => Ok(variables.clone()),
            Self::Error(error) => Err(error.clone()),
        }
    }
}

impl StubTemplateSource {
    fn from_response(response: StubResponse) -> Self {
        Self {
            response,
            overrides: BTreeMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a source that returns `variables` for every sport.
    #[must_use]
    pub fn with_variables(variables: Variables) -> Self {
        Self::from_response(StubResponse::Variables(variables))
    }

    /// Create a source that fails every request with `error`.
    #[must_use]
    pub fn with_error(error: TemplateFetchError) -> Self {
        Self::from_response(StubResponse::Error(error))
    }

    /// Answer requests for `sport` with `variables`.
    #[must_use]
    pub fn with_sport(mut self, sport: impl Into<String>, variables: Variables) -> Self {
        self.overrides
            .insert(sport.into(), StubResponse::Variables(variables));
        self
    }

    /// Fail requests for `sport` with `error`.
    #[must_use]
    pub fn with_sport_error(mut self, sport: impl Into<String>, error: TemplateFetchError) -> Self {
        self.overrides
            .insert(sport.into(), StubResponse::Error(error));
        self
    }

    /// Return the sports requested so far, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TemplateSource for StubTemplateSource {
    fn template_variables(&self, sport: &str) -> Result<Variables, TemplateFetchError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sport.to_owned());
        self.overrides
            .get(sport)
            .unwrap_or(&self.response)
            .resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn with_variables_returns_configured_template() {
        let template = Variables::from([("minHeight", 170)]);
        let source = StubTemplateSource::with_variables(template.clone());

        let result = source
            .template_variables("basketball")
            .expect("should succeed");

        assert_eq!(result, template);
    }

    #[rstest]
    fn with_error_returns_configured_error() {
        let source = StubTemplateSource::with_error(TemplateFetchError::Network {
            url: "http://example.com/sports/golf/template".to_owned(),
            message: "connection refused".to_owned(),
        });

        let err = source.template_variables("golf").expect_err("should fail");

        assert!(matches!(err, TemplateFetchError::Network { .. }));
    }

    #[rstest]
    fn overrides_take_precedence() {
        let source = StubTemplateSource::with_variables(Variables::new())
            .with_sport("rowing", Variables::from([("minAge", 16)]));

        assert_eq!(
            source
                .template_variables("rowing")
                .expect("override")
                .len(),
            1
        );
        assert!(
            source
                .template_variables("chess")
                .expect("default")
                .is_empty()
        );
        assert_eq!(source.requests(), ["rowing", "chess"]);
    }
}
