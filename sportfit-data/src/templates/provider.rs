//! HTTP-based `TemplateSource` for sport definition templates.
//!
//! The [`TemplateSource`] trait is synchronous to keep the core library
//! embeddable in synchronous contexts. This source bridges the async HTTP
//! calls to the sync interface by blocking on a Tokio runtime internally.

use std::time::Duration;

use log::debug;
use reqwest::{Client, StatusCode};
use sportfit_core::{TemplateFetchError, TemplateSource, Variables};
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

/// Error type for [`HttpTemplateSource`] construction failures.
#[derive(Debug)]
pub enum TemplateSourceBuildError {
    /// The base URL could not be parsed.
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Parser error from `url`.
        source: url::ParseError,
    },
    /// The base URL cannot carry path segments (for example `mailto:`).
    UnsupportedBaseUrl(String),
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl std::fmt::Display for TemplateSourceBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBaseUrl { url, source } => {
                write!(f, "invalid template base URL '{url}': {source}")
            }
            Self::UnsupportedBaseUrl(url) => {
                write!(f, "template base URL '{url}' cannot hold a path")
            }
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for TemplateSourceBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidBaseUrl { source, .. } => Some(source),
            Self::UnsupportedBaseUrl(_) => None,
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Default user agent for template requests.
pub const DEFAULT_USER_AGENT: &str = "sportfit-templates/0.1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`HttpTemplateSource`].
#[derive(Debug, Clone)]
pub struct HttpTemplateSourceConfig {
    /// Base URL of the template service (e.g., `"https://templates.example.com"`).
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpTemplateSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpTemplateSourceConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP-based template source.
///
/// The source owns a Tokio runtime that is reused across calls, avoiding the
/// overhead of creating a new runtime per request.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the stored runtime drives the request. Inside a
/// multi-threaded runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]) the caller's handle is used with
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime the
/// stored runtime drives the request on a scoped helper thread, because a
/// runtime cannot be started from a thread that is already running one.
pub struct HttpTemplateSource {
    client: Client,
    config: HttpTemplateSourceConfig,
    base_url: Url,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpTemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTemplateSource")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpTemplateSource {
    /// Create a new source with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TemplateSourceBuildError> {
        Self::with_config(HttpTemplateSourceConfig::new(base_url))
    }

    /// Create a new source with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: HttpTemplateSourceConfig) -> Result<Self, TemplateSourceBuildError> {
        let base_url = Url::parse(&config.base_url).map_err(|source| {
            TemplateSourceBuildError::InvalidBaseUrl {
                url: config.base_url.clone(),
                source,
            }
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TemplateSourceBuildError::UnsupportedBaseUrl(
                config.base_url.clone(),
            ));
        }
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(TemplateSourceBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(TemplateSourceBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            base_url,
            runtime,
        })
    }

    /// Return the configuration the source was built with.
    #[must_use]
    pub fn config(&self) -> &HttpTemplateSourceConfig {
        &self.config
    }

    /// Build the template URL for a sport.
    ///
    /// The URL format is `{base_url}/sports/{name}/template`; the sport name is
    /// percent-encoded as a single path segment.
    pub fn template_url(&self, sport: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["sports", sport, "template"]);
        }
        url
    }

    /// Fetch the template variables asynchronously.
    async fn fetch_template(&self, sport: &str) -> Result<Variables, TemplateFetchError> {
        let url = self.template_url(sport);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(TemplateFetchError::NotFound {
                sport: sport.to_owned(),
            });
        }
        let body = response
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let variables = parse_template(&body)?;
        debug!(
            "fetched {} template variables for {sport} from {url}",
            variables.len()
        );
        Ok(variables)
    }

    /// Convert a reqwest error to a `TemplateFetchError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &Url) -> TemplateFetchError {
        if error.is_timeout() {
            return TemplateFetchError::Timeout {
                url: url.to_string(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return TemplateFetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            };
        }

        TemplateFetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Decode a template body: a JSON object of scalar variables.
fn parse_template(body: &[u8]) -> Result<Variables, TemplateFetchError> {
    serde_json::from_slice(body).map_err(|err| TemplateFetchError::Parse {
        message: err.to_string(),
    })
}

impl TemplateSource for HttpTemplateSource {
    /// Fetch the template variables for `sport`.
    ///
    /// # Runtime requirements
    ///
    /// Callable from plain threads and from within any Tokio runtime; see the
    /// type-level documentation for how each case is driven.
    fn template_variables(&self, sport: &str) -> Result<Variables, TemplateFetchError> {
        let future = self.fetch_template(sport);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            Ok(_) => std::thread::scope(|scope| {
                scope
                    .spawn(|| self.runtime.block_on(future))
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            }),
            Err(_) => self.runtime.block_on(future),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serve one canned HTTP response and report the request line.
    fn serve_once(status: &str, body: &str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let addr = listener.local_addr().expect("listener address");
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept request");
            let mut buffer = [0_u8; 2048];
            let read = stream.read(&mut buffer).expect("read request");
            let request = String::from_utf8_lossy(&buffer[..read]).into_owned();
            let request_line = request.lines().next().unwrap_or_default().to_owned();
            sender.send(request_line).expect("report request line");
            stream
                .write_all(response.as_bytes())
                .expect("write response");
        });
        (format!("http://{addr}"), receiver)
    }

    #[fixture]
    fn source() -> HttpTemplateSource {
        HttpTemplateSource::new("http://templates.example.com").expect("source should build")
    }

    #[rstest]
    fn template_url_appends_sport_path(source: HttpTemplateSource) {
        assert_eq!(
            source.template_url("basketball").as_str(),
            "http://templates.example.com/sports/basketball/template"
        );
    }

    #[rstest]
    #[case::trailing_slash("http://example.com/api/", "http://example.com/api/sports/golf/template")]
    #[case::nested_path("http://example.com/api", "http://example.com/api/sports/golf/template")]
    fn template_url_respects_base_path(#[case] base: &str, #[case] expected: &str) {
        let source = HttpTemplateSource::new(base).expect("source should build");

        assert_eq!(source.template_url("golf").as_str(), expected);
    }

    #[rstest]
    fn template_url_encodes_sport_names(source: HttpTemplateSource) {
        assert_eq!(
            source.template_url("ice hockey/pro").as_str(),
            "http://templates.example.com/sports/ice%20hockey%2Fpro/template"
        );
    }

    #[rstest]
    #[case::not_a_url("templates")]
    #[case::cannot_be_base("mailto:admin@example.com")]
    fn rejects_unusable_base_urls(#[case] base: &str) {
        let err = HttpTemplateSource::new(base).expect_err("base URL is unusable");

        assert!(matches!(
            err,
            TemplateSourceBuildError::InvalidBaseUrl { .. }
                | TemplateSourceBuildError::UnsupportedBaseUrl(_)
        ));
    }

    #[rstest]
    fn parses_scalar_variables() {
        let variables =
            parse_template(br#"{"minHeight": 170, "indoor": true, "surface": "court"}"#)
                .expect("template parses");

        assert_eq!(variables.number("minHeight"), Ok(Some(170.0)));
        assert_eq!(variables.len(), 3);
    }

    #[rstest]
    #[case::array(b"[1, 2]".as_slice())]
    #[case::nested(br#"{"limits": {"min": 1}}"#.as_slice())]
    #[case::truncated(br#"{"minHeight": "#.as_slice())]
    fn rejects_malformed_templates(#[case] body: &[u8]) {
        let err = parse_template(body).expect_err("template is malformed");

        assert!(matches!(err, TemplateFetchError::Parse { .. }));
    }

    #[rstest]
    fn fetches_template_over_http() {
        let (base, requests) = serve_once("200 OK", r#"{"minAge": 16, "minHeight": 175}"#);
        let source = HttpTemplateSource::new(base).expect("source should build");

        let variables = source.template_variables("rowing").expect("template fetched");

        assert_eq!(variables.number("minAge"), Ok(Some(16.0)));
        assert_eq!(
            requests.recv().expect("request line"),
            "GET /sports/rowing/template HTTP/1.1"
        );
    }

    #[rstest]
    fn missing_template_is_not_found() {
        let (base, _requests) = serve_once("404 Not Found", "{}");
        let source = HttpTemplateSource::new(base).expect("source should build");

        let err = source.template_variables("curling").expect_err("no template");

        assert_eq!(
            err,
            TemplateFetchError::NotFound {
                sport: "curling".to_owned()
            }
        );
    }

    #[rstest]
    fn server_errors_report_status() {
        let (base, _requests) = serve_once("503 Service Unavailable", "{}");
        let source = HttpTemplateSource::new(base).expect("source should build");

        let err = source.template_variables("rowing").expect_err("server failed");

        assert!(matches!(err, TemplateFetchError::Http { status: 503, .. }));
    }

    #[rstest]
    fn slow_service_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let addr = listener.local_addr().expect("listener address");
        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                thread::sleep(Duration::from_secs(2));
                drop(stream);
            }
        });
        let config = HttpTemplateSourceConfig::new(format!("http://{addr}"))
            .with_timeout(Duration::from_millis(200));
        let source = HttpTemplateSource::with_config(config).expect("source should build");

        let err = source.template_variables("rowing").expect_err("request times out");

        assert!(matches!(err, TemplateFetchError::Timeout { .. }));
    }

    #[rstest]
    fn refused_connection_is_a_network_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
            listener.local_addr().expect("listener address")
        };
        let source = HttpTemplateSource::new(format!("http://{addr}")).expect("source should build");

        let err = source.template_variables("rowing").expect_err("nothing listens");

        assert!(matches!(err, TemplateFetchError::Network { .. }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn works_inside_multi_thread_runtime() {
        let (base, _requests) = serve_once("200 OK", r#"{"minAge": 16}"#);
        let source = HttpTemplateSource::new(base).expect("source should build");

        let variables = source.template_variables("rowing").expect("template fetched");

        assert_eq!(variables.number("minAge"), Ok(Some(16.0)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn works_inside_current_thread_runtime() {
        let (base, _requests) = serve_once("200 OK", r#"{"minAge": 16}"#);
        let source = HttpTemplateSource::new(base).expect("source should build");

        let variables = source.template_variables("rowing").expect("template fetched");

        assert_eq!(variables.number("minAge"), Ok(Some(16.0)));
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = HttpTemplateSourceConfig::new("http://example.com")
            .with_timeout(Duration::from_secs(3))
            .with_user_agent("test-agent/1.0");

        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(
            HttpTemplateSourceConfig::default().timeout,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
    }
}
