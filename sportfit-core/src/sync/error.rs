use thiserror::Error;

/// Errors from [`crate::sync::TemplateSource::template_variables`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateFetchError {
    /// No template exists for the sport.
    #[error("no template exists for sport '{sport}'")]
    NotFound { sport: String },
    /// The template service did not answer within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },
    /// The request failed before a response arrived.
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    /// The template service answered with an error status.
    #[error("request to {url} returned HTTP {status}")]
    Http { url: String, status: u16 },
    /// The response body was not a variable map.
    #[error("failed to parse template: {message}")]
    Parse { message: String },
    /// A local template store could not be read.
    #[error("template store is unavailable: {message}")]
    Unavailable { message: String },
}

/// Errors from [`crate::sync::SportSync::sync`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The template could not be fetched; the sport was left unchanged.
    #[error(transparent)]
    Fetch(#[from] TemplateFetchError),
    /// Another sync for the same sport has not finished yet.
    #[error("a sync for sport '{sport}' is already in progress")]
    AlreadyInFlight { sport: String },
}
