//! Flow orchestration that drives a [`ProviderStrategy`] through one authorization-code
//! round trip.

pub mod auth_code_pkce;

pub use auth_code_pkce::*;

// self
use crate::{_prelude::*, http::TokenHttpClient, oauth::TransportErrorMapper, provider::ProviderStrategy};
#[cfg(feature = "reqwest")]
use crate::{
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::{GiteaOptions, GiteaStrategy},
};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport stack.
pub type ReqwestBroker = Broker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Drives the authorization-code flow against a single provider strategy.
///
/// The broker owns the HTTP client used for the token exchange, the transport error mapper,
/// the client credentials, and the strategy. Everything provider-specific (endpoints,
/// profile mapping, token splitting) is delegated to the strategy. The broker holds no
/// per-login state; the [`AuthorizationSession`] returned by
/// [`Broker::start_authorization`] is owned by the caller until the callback arrives.
#[derive(Clone)]
pub struct Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for the token exchange.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Provider adapter supplying endpoints, profile mapping, and token splitting.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Optional client secret for confidential authentication methods.
	pub client_secret: Option<String>,
	/// Redirect URI registered with the provider; parsed when a flow starts.
	pub callback_url: String,
}
impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a broker that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		strategy: Arc<dyn ProviderStrategy>,
		client_id: impl Into<String>,
		callback_url: impl Into<String>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			strategy,
			client_id: client_id.into(),
			client_secret: None,
			callback_url: callback_url.into(),
		}
	}

	/// Sets or replaces the client secret used for confidential client auth modes.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}
}
#[cfg(feature = "reqwest")]
impl Broker<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a broker for a Gitea instance from its options.
	///
	/// The strategy and the broker share one reqwest client for the token exchange and the
	/// user-info call.
	pub fn gitea(options: &GiteaOptions) -> Self {
		let http_client = Arc::new(ReqwestHttpClient::default());
		let strategy = Arc::new(GiteaStrategy::<ReqwestHttpClient>::with_http_client(
			options,
			http_client.clone(),
		));

		Self::with_http_client(
			strategy,
			options.client_id.clone(),
			options.callback_url.clone(),
			http_client,
			Arc::new(ReqwestTransportErrorMapper),
		)
		.with_client_secret(options.client_secret.expose())
	}
}
impl<C, M> Debug for Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("descriptor", self.strategy.descriptor())
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("callback_url", &self.callback_url)
			.finish()
	}
}
