//! Builds a Gitea login redirect, persists the session, and parses the simulated callback.
//!
//! Set `GITEA_DOMAIN`, `GITEA_CLIENT_ID`, and `GITEA_CLIENT_SECRET` to point at a real
//! instance; the demo falls back to placeholder values otherwise.

// std
use std::{collections::HashMap, env};
// crates.io
use color_eyre::Result;
// self
use oauth2_gitea::{
	flows::{AuthorizationSession, CallbackParams, ReqwestBroker},
	provider::GiteaOptions,
	url::Url,
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let var = |key: &str, fallback: &str| env::var(key).unwrap_or_else(|_| fallback.to_owned());
	let options = GiteaOptions::new(
		var("GITEA_CLIENT_ID", "demo-client"),
		var("GITEA_CLIENT_SECRET", "demo-secret"),
		"https://app.example.com/auth/gitea/callback",
		var("GITEA_DOMAIN", "https://gitea.example.com"),
	)
	.with_user_agent("gitea-login-demo");
	let broker = ReqwestBroker::gitea(&options);
	let session = broker.start_authorization()?;

	println!("Send your user to {}.", &session.authorize_url);
	println!(
		"PKCE challenge ({:?}): {}.",
		session.code_challenge_method(),
		session.code_challenge()
	);

	let mut sessions = HashMap::new();

	sessions.insert(session.state.clone(), serde_json::to_string(&session)?);

	// Gitea redirects back with `code` and `state` appended to the callback URL.
	let mut redirect = session.redirect_uri.clone();

	redirect.query_pairs_mut().append_pair("code", "demo-code").append_pair("state", &session.state);

	let callback = CallbackParams::from_url(&Url::parse(redirect.as_str())?);
	let returned_state = callback.state.clone().unwrap_or_default();

	match sessions.remove(&returned_state) {
		Some(stashed) => {
			let stashed: AuthorizationSession = serde_json::from_str(&stashed)?;

			stashed.validate_state(&returned_state)?;
			println!("Callback carries code `{}`.", callback.code.as_deref().unwrap_or_default());
			println!("Call `broker.authenticate(&session, &callback)` to finish the login.");
		},
		None => eprintln!("State `{returned_state}` was not recognized."),
	}

	Ok(())
}
