//! Provider strategy hooks that plug provider specifics into the generic flows.
//!
//! A strategy owns everything that differs between providers: the endpoint set, the
//! user-info call and its payload mapping, how a token response is split, and how token
//! errors are classified. Flows only ever see the trait, never a concrete provider.

// self
use crate::{
	_prelude::*,
	auth::{Profile, TokenSecret, TokenSet},
	provider::ProviderDescriptor,
};

/// Boxed future returned by [`ProviderStrategy::user_profile`].
pub type ProfileFuture<'a> = Pin<Box<dyn Future<Output = Result<Profile>> + 'a + Send>>;

/// Capability interface a generic OAuth 2.0 flow invokes on a provider adapter.
///
/// Implementors are required to be `Send + Sync` so flows can share them behind an `Arc`.
/// `classify_token_error` defaults to [`classify_default`]; override it only when a provider
/// reports errors in a non-standard way.
pub trait ProviderStrategy: Send + Sync {
	/// Descriptor carrying the strategy name and derived endpoints.
	fn descriptor(&self) -> &ProviderDescriptor;

	/// Fetches and normalizes the profile of the user owning `access_token`.
	fn user_profile<'a>(&'a self, access_token: &'a TokenSecret) -> ProfileFuture<'a>;

	/// Splits a raw token-endpoint body into named tokens plus extra parameters.
	fn token_response(&self, body: &[u8]) -> Result<TokenSet>;

	/// Maps token endpoint failures into the crate's error taxonomy.
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		classify_default(ctx)
	}
}

/// How a token-endpoint OAuth error surfaces to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// Provider rejected the authorization grant (bad, reused, or denied code).
	InvalidGrant,
	/// Client authentication or registration is wrong.
	InvalidClient,
	/// Anything else; reported as [`TokenEndpointError::Unexpected`].
	///
	/// [`TokenEndpointError::Unexpected`]: crate::error::TokenEndpointError::Unexpected
	Unexpected,
}

/// OAuth error fields and status code of a failed token exchange.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// Provider-supplied OAuth `error` field.
	pub oauth_error: Option<String>,
	/// Provider-supplied OAuth `error_description` field.
	pub error_description: Option<String>,
}
impl ProviderErrorContext {
	/// Adds an HTTP status code (e.g., 400, 401, 500).
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth error code string returned by the provider.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}
}

/// Default classification: the OAuth `error` code first, then the HTTP status.
///
/// Gitea reports `unauthorized_client` for a wrong secret and `invalid_grant` or
/// `invalid_request` for a stale or foreign code.
pub fn classify_default(ctx: &ProviderErrorContext) -> ProviderErrorKind {
	match ctx.oauth_error.as_deref().map(str::to_ascii_lowercase).as_deref() {
		Some("invalid_grant" | "access_denied" | "invalid_request") =>
			ProviderErrorKind::InvalidGrant,
		Some("invalid_client" | "unauthorized_client" | "unsupported_grant_type") =>
			ProviderErrorKind::InvalidClient,
		_ => match ctx.http_status {
			Some(400) => ProviderErrorKind::InvalidGrant,
			Some(401) => ProviderErrorKind::InvalidClient,
			_ => ProviderErrorKind::Unexpected,
		},
	}
}
