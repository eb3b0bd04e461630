//! Token-endpoint response split into named secrets plus opaque extra parameters.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Tokens returned by a successful code exchange.
///
/// Only `access_token` and `refresh_token` are lifted out of the body; every other field is
/// kept verbatim in [`TokenSet::extra_params`]. Nothing is validated, so a provider that omits
/// a field simply yields `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenSet {
	/// Access token secret.
	pub access_token: Option<TokenSecret>,
	/// Refresh token secret.
	pub refresh_token: Option<TokenSecret>,
	/// Remaining response fields (`token_type`, `expires_in`, ...).
	pub extra_params: JsonMap<String, JsonValue>,
}
impl TokenSet {
	/// Decodes a raw token-endpoint body and splits it.
	pub fn from_json(
		body: &[u8],
	) -> Result<Self, serde_path_to_error::Error<serde_json::error::Error>> {
		let mut de = serde_json::Deserializer::from_slice(body);
		let fields: JsonMap<String, JsonValue> = serde_path_to_error::deserialize(&mut de)?;

		Ok(Self::from_fields(fields))
	}

	/// Splits an already-decoded JSON object.
	pub fn from_fields(mut fields: JsonMap<String, JsonValue>) -> Self {
		let access_token = fields.remove("access_token").and_then(into_secret);
		let refresh_token = fields.remove("refresh_token").and_then(into_secret);

		Self { access_token, refresh_token, extra_params: fields }
	}

	/// Returns the `token_type` extra parameter when it is a string.
	pub fn token_type(&self) -> Option<&str> {
		self.extra_params.get("token_type").and_then(JsonValue::as_str)
	}

	/// Returns the `expires_in` extra parameter as a duration when it is an integer.
	pub fn expires_in(&self) -> Option<Duration> {
		self.extra_params.get("expires_in").and_then(JsonValue::as_i64).map(Duration::seconds)
	}
}

fn into_secret(value: JsonValue) -> Option<TokenSecret> {
	match value {
		JsonValue::Null => None,
		JsonValue::String(secret) => Some(TokenSecret::new(secret)),
		other => Some(TokenSecret::new(other.to_string())),
	}
}
