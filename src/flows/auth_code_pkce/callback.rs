// self
use crate::{
	_prelude::*,
	auth::{Profile, TokenSet},
	flows::AuthorizationSession,
};

/// Query parameters Gitea appends to the redirect URI.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackParams {
	/// Authorization code to exchange.
	pub code: Option<String>,
	/// State value echoed back by the provider.
	pub state: Option<String>,
	/// OAuth error code when the user or the provider rejected the request.
	pub error: Option<String>,
	/// Human-readable companion to [`CallbackParams::error`].
	pub error_description: Option<String>,
}
impl CallbackParams {
	/// Extracts the callback parameters from the full redirect URL.
	///
	/// Unknown parameters are ignored; empty values count as absent. When a key repeats the
	/// first occurrence wins.
	pub fn from_url(url: &Url) -> Self {
		let mut params = Self::default();

		for (key, value) in url.query_pairs() {
			let slot = match key.as_ref() {
				"code" => &mut params.code,
				"state" => &mut params.state,
				"error" => &mut params.error,
				"error_description" => &mut params.error_description,
				_ => continue,
			};

			if slot.is_none() && !value.is_empty() {
				*slot = Some(value.into_owned());
			}
		}

		params
	}

	/// Rejects provider errors, a missing or foreign `state`, and a missing `code`.
	///
	/// The `state` check is [`AuthorizationSession::validate_state`]. Returns the
	/// authorization code on success.
	pub(super) fn authorization_code(&self, session: &AuthorizationSession) -> Result<&str> {
		if let Some(error) = &self.error {
			let reason = match &self.error_description {
				Some(description) => format!("Provider returned `{error}`: {description}"),
				None => format!("Provider returned `{error}`"),
			};

			return Err(Error::InvalidGrant { reason });
		}

		match self.state.as_deref() {
			Some(state) => session.validate_state(state)?,
			None =>
				return Err(Error::InvalidGrant { reason: "Missing state on callback".into() }),
		}

		self.code
			.as_deref()
			.ok_or_else(|| Error::InvalidGrant { reason: "Missing authorization code".into() })
	}
}

/// Result of a completed login: the split token response plus the mapped profile.
///
/// Handed to the application's verify callback by [`Broker::authenticate_with`].
///
/// [`Broker::authenticate_with`]: crate::flows::Broker::authenticate_with
#[derive(Clone, Debug)]
pub struct VerifyParams {
	/// Token-endpoint response split into access token, refresh token, and extras.
	pub tokens: TokenSet,
	/// Normalized profile fetched with the access token.
	pub profile: Profile,
}
