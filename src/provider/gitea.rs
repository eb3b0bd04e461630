//! Gitea strategy: endpoint derivation for self-hosted instances and `/api/v1/user` mapping.
//!
//! Gitea has no fixed host, so every endpoint is formed by appending a fixed path to the
//! configured domain. The domain is not validated; a malformed value only fails once a
//! flow needs to parse one of the derived URLs.

// crates.io
use oauth2::{
	AsyncHttpClient, HttpRequest,
	http::{
		Method,
		header::{ACCEPT, AUTHORIZATION, USER_AGENT},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{Profile, ProfileName, ProfileValue, ProviderId, TokenSecret, TokenSet},
	error::{BoxError, ProfileError, TokenEndpointError},
	http::{ResponseMetadataSlot, TokenHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{
		ClientAuthMethod, ProfileFuture, ProviderDescriptor, ProviderEndpoints, ProviderStrategy,
	},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Strategy name registered by [`GiteaStrategy`].
pub const GITEA_PROVIDER: &str = "gitea";
/// User agent sent to the user-info endpoint when none is configured.
pub const DEFAULT_USER_AGENT: &str = "Remix Auth";

const AUTHORIZATION_PATH: &str = "/login/oauth/authorize";
const TOKEN_PATH: &str = "/login/oauth/access_token";
const USER_INFO_PATH: &str = "/api/v1/user";

/// Configuration for a Gitea OAuth application.
///
/// Built once at application startup, either through [`GiteaOptions::new`] or by deserializing
/// the host's configuration file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiteaOptions {
	/// OAuth application client identifier.
	pub client_id: String,
	/// OAuth application client secret.
	pub client_secret: TokenSecret,
	/// Redirect URI registered with the Gitea application.
	pub callback_url: String,
	/// Base URL of the Gitea instance, e.g. `https://gitea.example.com`.
	pub domain: String,
	/// Optional `User-Agent` for user-info calls.
	#[serde(default)]
	pub user_agent: Option<String>,
}
impl GiteaOptions {
	/// Creates options without a custom user agent.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		callback_url: impl Into<String>,
		domain: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			callback_url: callback_url.into(),
			domain: domain.into(),
			user_agent: None,
		}
	}

	/// Sets the `User-Agent` sent to the user-info endpoint.
	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}

	/// Derives the Gitea endpoint set from [`GiteaOptions::domain`].
	pub fn endpoints(&self) -> ProviderEndpoints {
		ProviderEndpoints::from_domain(&self.domain, AUTHORIZATION_PATH, TOKEN_PATH, USER_INFO_PATH)
	}
}
impl Debug for GiteaOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GiteaOptions")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.field("callback_url", &self.callback_url)
			.field("domain", &self.domain)
			.field("user_agent", &self.user_agent)
			.finish()
	}
}

/// Gitea adapter implementing [`ProviderStrategy`].
///
/// Holds the derived descriptor, the user agent, and the transport used for user-info
/// calls. It keeps no per-request state, so one instance can serve concurrent logins.
pub struct GiteaStrategy<C>
where
	C: ?Sized + TokenHttpClient,
{
	descriptor: ProviderDescriptor,
	user_agent: String,
	http_client: Arc<C>,
}
impl<C> GiteaStrategy<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a strategy that issues user-info calls through `http_client`.
	pub fn with_http_client(options: &GiteaOptions, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			descriptor: ProviderDescriptor::new(gitea_provider_id(), options.endpoints()),
			user_agent: options.user_agent.clone().unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
			http_client: http_client.into(),
		}
	}

	/// Overrides how the client authenticates at the token endpoint.
	pub fn with_client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.descriptor = self.descriptor.with_client_auth_method(method);

		self
	}

	/// User agent sent to the user-info endpoint.
	pub fn user_agent(&self) -> &str {
		&self.user_agent
	}

	/// Builds the authenticated `GET` against the user-info endpoint.
	pub fn user_info_request(
		&self,
		access_token: &TokenSecret,
	) -> Result<HttpRequest, oauth2::http::Error> {
		oauth2::http::Request::builder()
			.method(Method::GET)
			.uri(self.descriptor.endpoints.user_info.as_str())
			.header(ACCEPT, "application/json")
			.header(AUTHORIZATION, format!("Bearer {}", access_token.expose()))
			.header(USER_AGENT, self.user_agent.as_str())
			.body(Vec::new())
	}

	async fn fetch_user(
		&self,
		access_token: &TokenSecret,
		span: &FlowSpan,
	) -> Result<JsonValue, BoxError> {
		let request = self.user_info_request(access_token)?;
		let handle = self.http_client.with_metadata(ResponseMetadataSlot::default());

		span.debug("Calling the Gitea user-info endpoint.");

		let response = handle.call(request).await?;

		span.debug(if response.status().is_success() {
			"User-info endpoint answered."
		} else {
			"User-info endpoint answered with an error status; mapping the body anyway."
		});

		Ok(serde_json::from_slice(response.body())?)
	}
}
#[cfg(feature = "reqwest")]
impl GiteaStrategy<ReqwestHttpClient> {
	/// Creates a strategy backed by a default reqwest client.
	pub fn new(options: &GiteaOptions) -> Self {
		Self::with_http_client(options, ReqwestHttpClient::default())
	}
}
impl<C> Debug for GiteaStrategy<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GiteaStrategy")
			.field("descriptor", &self.descriptor)
			.field("user_agent", &self.user_agent)
			.finish()
	}
}
impl<C> ProviderStrategy for GiteaStrategy<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn descriptor(&self) -> &ProviderDescriptor {
		&self.descriptor
	}

	fn user_profile<'a>(&'a self, access_token: &'a TokenSecret) -> ProfileFuture<'a> {
		const KIND: FlowKind = FlowKind::UserProfile;

		let span = FlowSpan::new(KIND, "user_profile");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		Box::pin(span.clone().instrument(async move {
			let result = self
				.fetch_user(access_token, &span)
				.await
				.map(map_profile)
				.map_err(|e| Error::from(ProfileError::wrap(e)));

			match &result {
				Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
				Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
			}

			result
		}))
	}

	fn token_response(&self, body: &[u8]) -> Result<TokenSet> {
		let tokens = TokenSet::from_json(body)
			.map_err(|source| TokenEndpointError::MalformedResponse { source, status: None })?;
		let span = FlowSpan::new(FlowKind::TokenExchange, "token_response");

		span.debug(if tokens.access_token.is_some() {
			"Retrieved an access token."
		} else {
			"Token response carried no access token."
		});
		span.debug(if tokens.refresh_token.is_some() {
			"Retrieved a refresh token."
		} else {
			"Token response carried no refresh token."
		});

		Ok(tokens)
	}
}

/// Maps a Gitea `/api/v1/user` payload into a [`Profile`].
///
/// `full_name` is copied into all three name parts; Gitea exposes no structured name.
/// `id` is stringified from any JSON scalar. Absent fields, and string fields carrying
/// another JSON type, become `None`.
pub fn map_profile(raw: JsonValue) -> Profile {
	let text = |key: &str| raw.get(key).and_then(JsonValue::as_str).map(str::to_owned);
	let id = match raw.get("id") {
		Some(JsonValue::String(id)) => Some(id.clone()),
		Some(JsonValue::Number(id)) => Some(id.to_string()),
		Some(JsonValue::Bool(id)) => Some(id.to_string()),
		_ => None,
	};
	let full_name = text("full_name");

	Profile {
		provider: gitea_provider_id(),
		id,
		display_name: text("login"),
		name: ProfileName {
			family_name: full_name.clone(),
			given_name: full_name.clone(),
			middle_name: full_name,
		},
		emails: vec![ProfileValue::new(text("email"))],
		photos: vec![ProfileValue::new(text("avatar_url"))],
		raw,
	}
}

fn gitea_provider_id() -> ProviderId {
	ProviderId::from_static(GITEA_PROVIDER)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn maps_user_payload_into_profile() {
		let raw = serde_json::json!({
			"id": 42,
			"login": "alice",
			"full_name": "Alice A",
			"email": "a@x.com",
			"avatar_url": "http://x/a.png",
			"is_admin": false
		});
		let profile = map_profile(raw.clone());

		assert_eq!(profile.provider.as_ref(), "gitea");
		assert_eq!(profile.id.as_deref(), Some("42"));
		assert_eq!(profile.display_name.as_deref(), Some("alice"));
		assert_eq!(profile.name.family_name.as_deref(), Some("Alice A"));
		assert_eq!(profile.name.given_name, profile.name.family_name);
		assert_eq!(profile.name.middle_name, profile.name.family_name);
		assert_eq!(profile.primary_email(), Some("a@x.com"));
		assert_eq!(profile.primary_photo(), Some("http://x/a.png"));
		assert_eq!(profile.raw, raw);
	}

	#[test]
	fn missing_fields_propagate_as_none() {
		let profile = map_profile(serde_json::json!({ "login": "ghost" }));

		assert!(profile.id.is_none());
		assert_eq!(profile.name, ProfileName::default());
		assert_eq!(profile.emails, vec![ProfileValue::default()]);
		assert_eq!(profile.photos.len(), 1);
	}

	#[test]
	fn scalar_ids_are_stringified() {
		for (id, expected) in [
			(serde_json::json!("42"), "42"),
			(serde_json::json!(42), "42"),
			(serde_json::json!(4.5), "4.5"),
			(serde_json::json!(true), "true"),
		] {
			let profile = map_profile(serde_json::json!({ "id": id, "login": "alice" }));

			assert_eq!(profile.id.as_deref(), Some(expected));
			assert_eq!(profile.display_name.as_deref(), Some("alice"));
		}

		assert!(map_profile(serde_json::json!({ "id": null })).id.is_none());
		assert!(map_profile(serde_json::json!({ "id": [1] })).id.is_none());
	}

	#[test]
	fn wrong_typed_text_fields_become_none() {
		let raw = serde_json::json!({
			"id": 7,
			"login": 12,
			"full_name": ["Alice"],
			"email": { "primary": "a@x.com" },
			"avatar_url": false
		});
		let profile = map_profile(raw.clone());

		assert_eq!(profile.id.as_deref(), Some("7"));
		assert!(profile.display_name.is_none());
		assert_eq!(profile.name, ProfileName::default());
		assert!(profile.primary_email().is_none());
		assert!(profile.primary_photo().is_none());
		assert_eq!(profile.raw, raw);

		let profile = map_profile(serde_json::json!("not an object"));

		assert!(profile.id.is_none());
		assert_eq!(profile.emails, vec![ProfileValue::default()]);
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn endpoints_and_headers_follow_options() {
		let options = GiteaOptions::new("id", "secret", "https://app.example.com/cb", "https://git.example.com");
		let strategy = GiteaStrategy::new(&options);
		let endpoints = &strategy.descriptor().endpoints;

		assert_eq!(endpoints.authorization, "https://git.example.com/login/oauth/authorize");
		assert_eq!(endpoints.token, "https://git.example.com/login/oauth/access_token");
		assert_eq!(endpoints.user_info, "https://git.example.com/api/v1/user");
		assert_eq!(strategy.user_agent(), DEFAULT_USER_AGENT);

		let request = strategy
			.user_info_request(&TokenSecret::new("AT"))
			.expect("User-info request should build.");

		let header = |name| request.headers().get(name).and_then(|value| value.to_str().ok());

		assert_eq!(request.method(), &Method::GET);
		assert_eq!(request.uri().to_string(), "https://git.example.com/api/v1/user");
		assert_eq!(header(ACCEPT), Some("application/json"));
		assert_eq!(header(AUTHORIZATION), Some("Bearer AT"));
		assert_eq!(header(USER_AGENT), Some("Remix Auth"));

		let strategy = GiteaStrategy::new(&options.with_user_agent("my-app/1.0"));

		assert_eq!(strategy.user_agent(), "my-app/1.0");
	}

	#[test]
	fn options_deserialize_and_redact_secret() {
		let options: GiteaOptions = serde_json::from_str(
			r#"{"client_id":"id","client_secret":"s3cr3t","callback_url":"https://app/cb","domain":"https://git"}"#,
		)
		.expect("Options should deserialize without a user agent.");

		assert!(options.user_agent.is_none());
		assert_eq!(options.client_secret.expose(), "s3cr3t");
		assert!(!format!("{options:?}").contains("s3cr3t"));
	}
}
