//! Authorization Code + PKCE login: redirect construction, callback validation, code
//! exchange, and profile retrieval.
//!
//! [`Broker::start_authorization`] returns an [`AuthorizationSession`] that the caller keeps
//! until the provider redirects back. [`Broker::authenticate`] then checks the callback,
//! exchanges the code, splits the token response through the strategy, and fetches the
//! profile with the new access token.

mod callback;
mod session;

pub use callback::*;
pub use session::*;

// self
use crate::{
	_prelude::*,
	auth::TokenSet,
	error::{BoxError, ConfigError, TokenEndpointError},
	flows::Broker,
	http::TokenHttpClient,
	oauth::{BasicFacade, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the authorize redirect with a fresh `state` and PKCE pair.
	///
	/// Fails with [`ConfigError`] when the derived authorization endpoint or the configured
	/// callback URL cannot be parsed.
	pub fn start_authorization(&self) -> Result<AuthorizationSession> {
		const KIND: FlowKind = FlowKind::Authorize;

		let _guard = FlowSpan::new(KIND, "start_authorization").entered();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = self.build_authorization_session();

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Completes the login for `callback`, returning tokens plus profile.
	///
	/// `session` must be the value [`Broker::start_authorization`] produced for this login.
	pub async fn authenticate(
		&self,
		session: &AuthorizationSession,
		callback: &CallbackParams,
	) -> Result<VerifyParams> {
		const KIND: FlowKind = FlowKind::TokenExchange;

		let span = FlowSpan::new(KIND, "authenticate");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result: Result<TokenSet> = span
			.instrument(async {
				let code = callback.authorization_code(session)?;
				let facade: BasicFacade<C, M> = BasicFacade::from_strategy(
					self.strategy.as_ref(),
					&self.client_id,
					self.client_secret.as_deref(),
					&session.redirect_uri,
					self.http_client.clone(),
					self.transport_mapper.clone(),
				)?;
				let body = facade
					.exchange_authorization_code(
						self.strategy.as_ref(),
						code,
						session.pkce_verifier(),
					)
					.await?;
				let tokens = self.strategy.token_response(&body)?;

				Ok(tokens)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		let tokens = result?;
		let access_token =
			tokens.access_token.as_ref().ok_or(TokenEndpointError::MissingAccessToken)?;
		let profile = self.strategy.user_profile(access_token).await?;

		Ok(VerifyParams { tokens, profile })
	}

	/// Runs [`Broker::authenticate`] and hands the result to the application's `verify`
	/// callback.
	///
	/// Whatever `verify` returns becomes the login result; its errors surface as
	/// [`Error::Verify`].
	pub async fn authenticate_with<F, Fut, U, E>(
		&self,
		session: &AuthorizationSession,
		callback: &CallbackParams,
		verify: F,
	) -> Result<U>
	where
		F: FnOnce(VerifyParams) -> Fut,
		Fut: Future<Output = Result<U, E>>,
		E: Into<BoxError>,
	{
		let params = self.authenticate(session, callback).await?;

		verify(params).await.map_err(|e| Error::Verify { source: e.into() })
	}

	fn build_authorization_session(&self) -> Result<AuthorizationSession> {
		let authorization_endpoint = self.strategy.descriptor().endpoints.authorization_url()?;
		let redirect_uri = Url::parse(&self.callback_url).map_err(|source| {
			ConfigError::InvalidRedirect { url: self.callback_url.clone(), source }
		})?;

		Ok(session::build_session(authorization_endpoint, &self.client_id, redirect_uri))
	}
}
