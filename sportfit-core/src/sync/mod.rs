//! Keep sport definitions aligned with their authoritative templates.
//!
//! A [`TemplateSource`] supplies the template variables for a sport.
//! [`SportSync`] compares them with the locally held variables, reports a
//! [`SyncStatus`] and, on request, produces the reconciled [`Sport`](crate::Sport).
//! Nothing here persists state; callers write the result back themselves.

mod diff;
mod error;
mod reconcile;
mod source;

pub use diff::SyncDiff;
pub use error::{SyncError, TemplateFetchError};
pub use reconcile::{SportSync, SyncStatus};
pub use source::TemplateSource;
