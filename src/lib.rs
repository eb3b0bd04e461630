//! Gitea OAuth 2.0 strategy: derive endpoints for a self-hosted instance, exchange authorization
//! codes through the `oauth2` crate, and normalize `/api/v1/user` payloads into profiles.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		flows::Broker,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{GiteaOptions, GiteaStrategy},
	};

	/// Broker type alias used by reqwest-backed integration tests.
	pub type ReqwestTestBroker = Broker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Options pointing at a mock Gitea instance served from `domain`.
	pub fn test_gitea_options(domain: &str) -> GiteaOptions {
		GiteaOptions::new("client-it", "secret-it", "https://app.example.com/callback", domain)
	}

	/// Builds a Gitea strategy backed by the insecure test transport.
	pub fn build_reqwest_test_strategy(options: &GiteaOptions) -> GiteaStrategy<ReqwestHttpClient> {
		GiteaStrategy::with_http_client(options, test_reqwest_http_client())
	}

	/// Constructs a [`Broker`] wired to a [`GiteaStrategy`] that shares the insecure reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_broker(options: GiteaOptions) -> ReqwestTestBroker {
		let http_client = Arc::new(test_reqwest_http_client());
		let strategy = Arc::new(GiteaStrategy::<ReqwestHttpClient>::with_http_client(
			&options,
			http_client.clone(),
		));

		Broker::with_http_client(
			strategy,
			options.client_id.clone(),
			options.callback_url.clone(),
			http_client,
			Arc::new(ReqwestTransportErrorMapper),
		)
		.with_client_secret(options.client_secret.expose())
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use time::Duration;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
