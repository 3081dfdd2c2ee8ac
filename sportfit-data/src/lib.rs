//! Remote data adapters for the sportfit engine.
//!
//! Responsibilities:
//! - Provide [`TemplateSource`](sportfit_core::TemplateSource) adapters that
//!   fetch sport definition templates from remote services.
//! - Translate transport failures into the typed
//!   [`TemplateFetchError`](sportfit_core::TemplateFetchError) variants the
//!   sync logic reasons about.
//!
//! Boundaries:
//! - Do not encode sync or ranking rules (live in `sportfit-core`).
//! - Keep the synchronous core embeddable: adapters block on their own
//!   runtime rather than exposing async APIs.
//!
//! Invariants:
//! - Thread-safe by default.
//! - No global mutable state.

pub mod templates;

pub use templates::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpTemplateSource, HttpTemplateSourceConfig,
    TemplateSourceBuildError,
};
