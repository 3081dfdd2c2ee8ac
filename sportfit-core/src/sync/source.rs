//! Template retrieval trait.

use std::sync::Arc;

use crate::Variables;

use super::error::TemplateFetchError;

/// Fetch the authoritative variable set for a sport.
///
/// This is the only operation in the sync flow that may wait on I/O.
/// Implementations decide their own timeout and report it as
/// [`TemplateFetchError::Timeout`].
///
/// # Examples
///
/// ```rust
/// use sportfit_core::{TemplateFetchError, TemplateSource, Variables};
///
/// struct FixedTemplates;
///
/// impl TemplateSource for FixedTemplates {
///     fn template_variables(&self, sport: &str) -> Result<Variables, TemplateFetchError> {
///         match sport {
///             "rowing" => Ok(Variables::from([("minAge", 16)])),
///             _ => Err(TemplateFetchError::NotFound { sport: sport.to_owned() }),
///         }
///     }
/// }
///
/// assert_eq!(FixedTemplates.template_variables("rowing")?.len(), 1);
/// assert!(FixedTemplates.template_variables("golf").is_err());
/// # Ok::<(), TemplateFetchError>(())
/// ```
pub trait TemplateSource {
    /// Return the template variables for the sport named `sport`.
    fn template_variables(&self, sport: &str) -> Result<Variables, TemplateFetchError>;
}

impl<T: TemplateSource + ?Sized> TemplateSource for &T {
    fn template_variables(&self, sport: &str) -> Result<Variables, TemplateFetchError> {
        (**self).template_variables(sport)
    }
}

impl<T: TemplateSource + ?Sized> TemplateSource for Box<T> {
    fn template_variables(&self, sport: &str) -> Result<Variables, TemplateFetchError> {
        (**self).template_variables(sport)
    }
}

impl<T: TemplateSource + ?Sized> TemplateSource for Arc<T> {
    fn template_variables(&self, sport: &str) -> Result<Variables, TemplateFetchError> {
        (**self).template_variables(sport)
    }
}
