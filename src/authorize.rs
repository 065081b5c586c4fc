//! Implicit-flow authorization request construction.
//!
//! Every request carries a freshly generated `nonce` and `state` drawn from
//! `[A-Za-z0-9]`. [`rand::rng`] is backed by the operating system CSPRNG, so no
//! reduced-security fallback path exists here.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	provider::{Provider, ProviderConfig},
};

/// Length of generated `nonce` and `state` values.
pub const RANDOM_LEN: usize = 24;

/// Fully specified authorization request for one sign-in attempt.
///
/// Constructed fresh per attempt; `nonce` and `state` are never reused. The
/// popup coordinator keys incoming messages off their source discriminator
/// rather than comparing the returned `state`, so callers wanting CSRF-style
/// verification should compare [`AuthorizationRequest::state`] against the
/// `state` relayed by the callback page themselves.
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
	/// Provider the request targets.
	pub provider: Provider,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Redirect URI the fragment response is delivered to.
	pub redirect_uri: Url,
	/// Scope string requested from the provider.
	pub scope: &'static str,
	/// Freshly generated nonce binding the returned token to this request.
	pub nonce: String,
	/// Freshly generated state value for request-forgery mitigation.
	pub state: String,
}
impl AuthorizationRequest {
	/// Creates a request with fresh randomness for the provider + configuration pair.
	pub fn new(provider: Provider, config: &ProviderConfig) -> Self {
		Self {
			provider,
			client_id: config.client_id.clone(),
			redirect_uri: config.redirect_uri.clone(),
			scope: provider.scope(),
			nonce: random_string(RANDOM_LEN),
			state: random_string(RANDOM_LEN),
		}
	}

	/// Builds the fully qualified authorization URL.
	///
	/// Pure construction: no network or window activity happens here.
	pub fn authorize_url(&self) -> Url {
		let mut url = self.provider.authorization_endpoint();

		{
			let mut pairs = url.query_pairs_mut();

			pairs.append_pair("client_id", &self.client_id);
			pairs.append_pair("redirect_uri", self.redirect_uri.as_str());
			pairs.append_pair("response_type", "id_token");
			pairs.append_pair("response_mode", "fragment");
			pairs.append_pair("scope", self.scope);

			if matches!(self.provider, Provider::Google) {
				pairs.append_pair("prompt", "select_account");
			}

			pairs.append_pair("nonce", &self.nonce);
			pairs.append_pair("state", &self.state);
		}

		url
	}
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
