//! Strategy-level error types shared across flows, providers, and transports.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used wherever the concrete source type is transport- or host-specific.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint answered with something the login cannot use.
	#[error(transparent)]
	TokenEndpoint(#[from] TokenEndpointError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// User-info lookup failed.
	#[error(transparent)]
	Profile(#[from] ProfileError),

	/// Provider rejected the grant (e.g., bad code, denied consent, state mismatch).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider- or strategy-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider- or strategy-supplied reason string.
		reason: String,
	},
	/// The host application's verify callback refused the authenticated user.
	#[error("Verify callback failed: {source}")]
	Verify {
		/// Error returned by the callback.
		#[source]
		source: BoxError,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A derived provider endpoint is not a valid URL.
	#[error("The {endpoint} endpoint is not a valid URL: {url}.")]
	InvalidEndpoint {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Raw endpoint string derived from the configured domain.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Callback URL cannot be parsed.
	#[error("Callback URL is invalid: {url}.")]
	InvalidRedirect {
		/// Raw callback URL from the options.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token-endpoint responses that neither carry tokens nor map to a grant or client rejection.
#[derive(Debug, ThisError)]
pub enum TokenEndpointError {
	/// Provider returned an OAuth error outside the grant/client categories.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Provider- or strategy-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Body is not a JSON object.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Exchange succeeded but the body held no `access_token` to fetch the profile with.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
	/// Transport reported a failure it could only describe as text.
	#[error("HTTP client failed while calling the token endpoint: {0}.")]
	Other(String),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Any failure while calling or decoding the user-info endpoint.
///
/// The display text always starts with `Could not parse user account.` followed by the
/// rendered source chain, so callers matching on the message keep working regardless of
/// which step failed.
#[derive(Debug, ThisError)]
#[error("Could not parse user account. {message}")]
pub struct ProfileError {
	/// Rendered source chain captured at wrap time.
	pub message: String,
	/// Original failure.
	#[source]
	pub source: BoxError,
}
impl ProfileError {
	/// Wraps a request, transport, or decoding failure.
	pub fn wrap(source: impl Into<BoxError>) -> Self {
		let source = source.into();
		let message = render_chain(&*source);

		Self { message, source }
	}
}

fn render_chain(err: &(dyn std::error::Error + 'static)) -> String {
	let mut buf = err.to_string();
	let mut next = err.source();

	while let Some(cause) = next {
		buf.push_str(": ");
		buf.push_str(&cause.to_string());

		next = cause.source();
	}

	buf
}
