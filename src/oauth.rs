//! Internal OAuth client facade over the `oauth2` crate.
//!
//! The facade owns the configured `oauth2` client and performs the authorization-code
//! exchange. It returns the raw token-endpoint body so the provider strategy decides how the
//! response is split. The client decodes successful responses into [`RawTokenResponse`],
//! which accepts any JSON object, so a body without `token_type` or `access_token` still
//! reaches the strategy.

pub use oauth2;

// crates.io
use oauth2::{
	AccessToken, AuthType, AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret,
	EndpointNotSet, EndpointSet, HttpClientError, PkceCodeVerifier, RedirectUrl, RefreshToken,
	RequestTokenError, Scope, StandardRevocableToken, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse, BasicTokenType,
	},
};
use serde::{Deserializer, Serializer};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TokenEndpointError, TransportError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::{ClientAuthMethod, ProviderErrorContext, ProviderErrorKind, ProviderStrategy},
};

type ConfiguredClient = Client<
	BasicErrorResponse,
	RawTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		strategy: &dyn ProviderStrategy,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		_strategy: &dyn ProviderStrategy,
		_meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) if inner.is_builder() =>
				ConfigError::from(*inner).into(),
			HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Other(message).into(),
			other => TransportError::Other(other.to_string()).into(),
		}
	}
}

/// Successful token response kept as the untouched JSON object.
///
/// Only the accessors `oauth2` requires are derived from it; absent fields fall back to
/// empty values instead of failing the exchange.
struct RawTokenResponse {
	fields: JsonMap<String, JsonValue>,
	access_token: AccessToken,
	token_type: BasicTokenType,
	refresh_token: Option<RefreshToken>,
}
impl RawTokenResponse {
	fn from_fields(fields: JsonMap<String, JsonValue>) -> Self {
		let text = |key: &str| fields.get(key).and_then(JsonValue::as_str).map(str::to_owned);
		let access_token = AccessToken::new(text("access_token").unwrap_or_default());
		let token_type = match text("token_type") {
			Some(kind) if kind.eq_ignore_ascii_case("bearer") => BasicTokenType::Bearer,
			Some(kind) => BasicTokenType::Extension(kind),
			None => BasicTokenType::Extension(String::new()),
		};
		let refresh_token = text("refresh_token").map(RefreshToken::new);

		Self { fields, access_token, token_type, refresh_token }
	}
}
impl Debug for RawTokenResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RawTokenResponse")
			.field("keys", &self.fields.keys().collect::<Vec<_>>())
			.finish()
	}
}
impl<'de> Deserialize<'de> for RawTokenResponse {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		JsonMap::deserialize(deserializer).map(Self::from_fields)
	}
}
impl Serialize for RawTokenResponse {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		self.fields.serialize(serializer)
	}
}
impl TokenResponse for RawTokenResponse {
	type TokenType = BasicTokenType;

	fn access_token(&self) -> &AccessToken {
		&self.access_token
	}

	fn token_type(&self) -> &Self::TokenType {
		&self.token_type
	}

	fn expires_in(&self) -> Option<std::time::Duration> {
		self.fields
			.get("expires_in")
			.and_then(JsonValue::as_u64)
			.map(std::time::Duration::from_secs)
	}

	fn refresh_token(&self) -> Option<&RefreshToken> {
		self.refresh_token.as_ref()
	}

	fn scopes(&self) -> Option<&Vec<Scope>> {
		None
	}
}

pub(crate) struct BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_strategy(
		strategy: &dyn ProviderStrategy,
		client_id: &str,
		client_secret: Option<&str>,
		redirect_uri: &Url,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self> {
		let descriptor = strategy.descriptor();
		let auth_url = AuthUrl::from_url(descriptor.endpoints.authorization_url()?);
		let token_url = TokenUrl::from_url(descriptor.endpoints.token_url()?);
		let secret =
			if matches!(descriptor.preferred_client_auth_method, ClientAuthMethod::NoneWithPkce) {
				None
			} else {
				client_secret.map(|value| ClientSecret::new(value.to_owned()))
			};
		let mut oauth_client: ConfiguredClient = Client::new(ClientId::new(client_id.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(RedirectUrl::from_url(redirect_uri.clone()));

		if let Some(secret) = secret {
			oauth_client = oauth_client.set_client_secret(secret);
		}
		if !matches!(descriptor.preferred_client_auth_method, ClientAuthMethod::ClientSecretBasic)
		{
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self { oauth_client, http_client, error_mapper })
	}

	/// Exchanges `code` and returns the raw token-endpoint body.
	pub(crate) async fn exchange_authorization_code(
		&self,
		strategy: &dyn ProviderStrategy,
		code: &str,
		pkce_verifier: &str,
	) -> Result<Vec<u8>> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_owned()))
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(strategy, meta.take(), err, self.error_mapper.as_ref()))?;

		// Transports that skip body capture hand back the decoded object instead.
		match meta.take().and_then(|captured| captured.body) {
			Some(body) => Ok(body),
			None => serde_json::to_vec(&response).map_err(|e| {
				Error::from(TokenEndpointError::Unexpected {
					message: format!("Token response could not be re-encoded: {e}"),
					status: None,
				})
			}),
		}
	}
}

fn map_request_error<E, M>(
	strategy: &dyn ProviderStrategy,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();
	let status = meta_ref.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(strategy, response, status),
		RequestTokenError::Request(error) => mapper.map_transport_error(strategy, meta_ref, error),
		RequestTokenError::Parse(source, _body) =>
			TokenEndpointError::MalformedResponse { source, status }.into(),
		RequestTokenError::Other(message) => TokenEndpointError::Unexpected { message, status }.into(),
	}
}

fn map_server_response_error(
	strategy: &dyn ProviderStrategy,
	response: BasicErrorResponse,
	status: Option<u16>,
) -> Error {
	let code = response.error().as_ref().to_owned();
	let mut ctx = ProviderErrorContext::default().with_oauth_error(code.clone());

	if let Some(description) = response.error_description() {
		ctx = ctx.with_error_description(description.clone());
	}
	if let Some(status) = status {
		ctx = ctx.with_http_status(status);
	}

	let message = match response.error_description() {
		Some(description) => format!("Token endpoint returned `{code}`: {description}"),
		None => format!("Token endpoint returned `{code}`"),
	};

	match strategy.classify_token_error(&ctx) {
		ProviderErrorKind::InvalidGrant => Error::InvalidGrant { reason: message },
		ProviderErrorKind::InvalidClient => Error::InvalidClient { reason: message },
		ProviderErrorKind::Unexpected => TokenEndpointError::Unexpected { message, status }.into(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn raw_token_response_accepts_missing_fields() {
		let response: RawTokenResponse =
			serde_json::from_str(r#"{"access_token":"AT","refresh_token":"RT","scope":7}"#)
				.expect("Token bodies without token_type should decode.");

		assert_eq!(response.access_token().secret(), "AT");
		assert_eq!(response.refresh_token().map(|token| token.secret().as_str()), Some("RT"));
		assert_eq!(response.token_type(), &BasicTokenType::Extension(String::new()));
		assert!(response.expires_in().is_none());
		assert!(!format!("{response:?}").contains("\"AT\""));
		assert_eq!(
			serde_json::to_value(&response).expect("Raw response should re-encode."),
			serde_json::json!({ "access_token": "AT", "refresh_token": "RT", "scope": 7 })
		);

		let response: RawTokenResponse = serde_json::from_str(r#"{"token_type":"Bearer","expires_in":60}"#)
			.expect("Token bodies without access_token should decode.");

		assert!(response.access_token().secret().is_empty());
		assert_eq!(response.token_type(), &BasicTokenType::Bearer);
		assert_eq!(response.expires_in(), Some(std::time::Duration::from_secs(60)));
		assert!(serde_json::from_str::<RawTokenResponse>("[1]").is_err());
	}

	#[cfg(feature = "reqwest")]
	mod reqwest_backed {
		// self
		use super::*;
		use crate::{
			http::ReqwestHttpClient,
			provider::{GiteaOptions, GiteaStrategy},
		};

		fn strategy(domain: &str, method: ClientAuthMethod) -> GiteaStrategy<ReqwestHttpClient> {
			let options =
				GiteaOptions::new("client-id", "secret", "https://app.example.com/cb", domain);

			GiteaStrategy::new(&options).with_client_auth_method(method)
		}

		fn facade(
			strategy: &GiteaStrategy<ReqwestHttpClient>,
		) -> Result<BasicFacade<ReqwestHttpClient, ReqwestTransportErrorMapper>> {
			let redirect =
				Url::parse("https://app.example.com/cb").expect("Failed to parse redirect URI.");

			BasicFacade::from_strategy(
				strategy,
				"client-id",
				Some("secret"),
				&redirect,
				Arc::new(ReqwestHttpClient::default()),
				Arc::new(ReqwestTransportErrorMapper),
			)
		}

		#[test]
		fn builds_clients_for_every_auth_method() {
			for method in [
				ClientAuthMethod::ClientSecretBasic,
				ClientAuthMethod::ClientSecretPost,
				ClientAuthMethod::NoneWithPkce,
			] {
				assert!(facade(&strategy("https://gitea.example.com", method)).is_ok());
			}
		}

		#[test]
		fn unparsable_domains_surface_config_errors() {
			let err = facade(&strategy("gitea.example.com", ClientAuthMethod::ClientSecretPost))
				.err()
				.expect("Relative endpoints should be rejected when building the client.");

			assert!(matches!(
				err,
				Error::Config(ConfigError::InvalidEndpoint { endpoint: "authorization", .. })
			));
		}

		#[test]
		fn server_errors_are_classified_by_strategy() {
			let strategy =
				strategy("https://gitea.example.com", ClientAuthMethod::ClientSecretPost);
			let decode = |body: &str| -> BasicErrorResponse {
				serde_json::from_str(body).expect("Error response fixture should decode.")
			};
			let err = map_server_response_error(
				&strategy,
				decode(r#"{"error":"unauthorized_client","error_description":"invalid client secret"}"#),
				Some(400),
			);

			assert!(matches!(err, Error::InvalidClient { .. }));

			let err = map_server_response_error(
				&strategy,
				decode(r#"{"error":"server_error"}"#),
				Some(500),
			);

			assert!(matches!(
				err,
				Error::TokenEndpoint(TokenEndpointError::Unexpected { status: Some(500), .. })
			));
		}
	}
}
