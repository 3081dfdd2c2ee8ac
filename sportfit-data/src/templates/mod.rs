//! HTTP-based template sources for sport definition sync.
//!
//! This module provides [`HttpTemplateSource`], an implementation of
//! [`sportfit_core::TemplateSource`] that fetches the template variables of a
//! sport from `GET {base_url}/sports/{name}/template`. The service answers
//! with a JSON object mapping variable keys to numbers, booleans, or strings.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use sportfit_core::TemplateSource;
//! use sportfit_data::templates::{HttpTemplateSource, HttpTemplateSourceConfig};
//!
//! let config = HttpTemplateSourceConfig::new("https://templates.example.com")
//!     .with_timeout(Duration::from_secs(5))
//!     .with_user_agent("my-app/1.0");
//! let source = HttpTemplateSource::with_config(config)?;
//!
//! let variables = source.template_variables("basketball")?;
//! println!("template defines {} variables", variables.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod provider;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpTemplateSource, HttpTemplateSourceConfig,
    TemplateSourceBuildError,
};
