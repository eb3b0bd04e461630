//! Normalized user profile handed to the host's verify callback.

// self
use crate::{_prelude::*, auth::ProviderId};

/// Provider-neutral identity record built from a user-info payload.
///
/// Vendor-derived scalars are optional: a payload that omits a field yields `None` rather
/// than an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
	/// Strategy that produced the profile.
	pub provider: ProviderId,
	/// Stable provider-side user identifier, stringified.
	pub id: Option<String>,
	/// Human-facing handle (the login name for Gitea).
	pub display_name: Option<String>,
	/// Name parts.
	pub name: ProfileName,
	/// Email addresses.
	pub emails: Vec<ProfileValue>,
	/// Avatar URLs.
	pub photos: Vec<ProfileValue>,
	/// The untouched user-info payload.
	#[serde(rename = "_json")]
	pub raw: JsonValue,
}
impl Profile {
	/// First email value, if any.
	pub fn primary_email(&self) -> Option<&str> {
		self.emails.first().and_then(|email| email.value.as_deref())
	}

	/// First photo value, if any.
	pub fn primary_photo(&self) -> Option<&str> {
		self.photos.first().and_then(|photo| photo.value.as_deref())
	}
}

/// Split name parts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileName {
	/// Family name.
	pub family_name: Option<String>,
	/// Given name.
	pub given_name: Option<String>,
	/// Middle name.
	pub middle_name: Option<String>,
}

/// Single-value wrapper used for emails and photos.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileValue {
	/// Wrapped value.
	pub value: Option<String>,
}
impl ProfileValue {
	/// Wraps an optional value.
	pub fn new(value: Option<String>) -> Self {
		Self { value }
	}
}
