//! Provider descriptor data structures shared by all flows.

// self
use crate::{_prelude::*, auth::ProviderId, error::ConfigError};

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	#[default]
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
	/// Public clients that prove possession via PKCE only.
	NoneWithPkce,
}

/// Endpoint set declared by a provider descriptor.
///
/// Endpoints are kept as the raw strings derived from the configured domain; nothing is
/// validated until a flow needs a parsed [`Url`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint end-users are redirected to.
	pub authorization: String,
	/// Token endpoint used for code exchanges.
	pub token: String,
	/// User-info endpoint queried with the access token.
	pub user_info: String,
}
impl ProviderEndpoints {
	/// Appends fixed path suffixes to `domain`.
	pub fn from_domain(
		domain: &str,
		authorization_path: &str,
		token_path: &str,
		user_info_path: &str,
	) -> Self {
		Self {
			authorization: format!("{domain}{authorization_path}"),
			token: format!("{domain}{token_path}"),
			user_info: format!("{domain}{user_info_path}"),
		}
	}

	/// Parses the authorization endpoint.
	pub fn authorization_url(&self) -> Result<Url, ConfigError> {
		parse_endpoint("authorization", &self.authorization)
	}

	/// Parses the token endpoint.
	pub fn token_url(&self) -> Result<Url, ConfigError> {
		parse_endpoint("token", &self.token)
	}
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier; doubles as the strategy name.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Preferred client authentication mechanism.
	pub preferred_client_auth_method: ClientAuthMethod,
}
impl ProviderDescriptor {
	/// Creates a descriptor using the default client authentication method.
	pub fn new(id: ProviderId, endpoints: ProviderEndpoints) -> Self {
		Self { id, endpoints, preferred_client_auth_method: ClientAuthMethod::default() }
	}

	/// Overrides the preferred client authentication method.
	pub fn with_client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.preferred_client_auth_method = method;

		self
	}
}

fn parse_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint {
		endpoint,
		url: raw.to_owned(),
		source,
	})
}
