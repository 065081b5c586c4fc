//! Identity providers, their wire discriminators, and per-provider configuration.
//!
//! The two supported providers differ only in endpoint, scope string, and the
//! discriminator values their callback messages carry; everything else in the
//! protocol is shared. Configuration is always injected - the crate ships no
//! production client ids or redirect URIs.

// self
use crate::{_prelude::*, error::ConfigError};

/// Wire source attached by the login service to backend-mediated callback envelopes.
pub const SERVICE_SOURCE: &str = "unifyn-login-service";

/// Identity providers supported by the popup flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
	/// Google implicit-flow sign-in.
	Google,
	/// Apple implicit-flow sign-in (popup or vendor-SDK path).
	Apple,
}
impl Provider {
	/// Returns the provider's authorization endpoint.
	pub fn authorization_endpoint(self) -> Url {
		let raw = match self {
			Provider::Google => "https://accounts.google.com/o/oauth2/v2/auth",
			Provider::Apple => "https://appleid.apple.com/auth/authorize",
		};

		Url::parse(raw).expect("Static authorization endpoints must parse.")
	}

	/// Returns the scope string requested from the provider.
	pub const fn scope(self) -> &'static str {
		match self {
			Provider::Google => "openid email profile",
			Provider::Apple => "name email",
		}
	}

	/// Returns the token-source discriminator used by direct relay messages.
	pub const fn token_source(self) -> TokenSource {
		match self {
			Provider::Google => TokenSource::GoogleIdToken,
			Provider::Apple => TokenSource::AppleIdToken,
		}
	}

	/// Returns the `type` discriminator used by backend-mediated envelopes.
	pub const fn callback_kind(self) -> &'static str {
		match self {
			Provider::Google => "google-signin-callback",
			Provider::Apple => "apple-signin-callback",
		}
	}

	/// Resolves a backend envelope `type` discriminator back to a provider.
	pub fn from_callback_kind(kind: &str) -> Option<Self> {
		match kind {
			"google-signin-callback" => Some(Provider::Google),
			"apple-signin-callback" => Some(Provider::Apple),
			_ => None,
		}
	}

	/// Human-readable provider label used in user-facing status messages.
	pub const fn label(self) -> &'static str {
		match self {
			Provider::Google => "Google",
			Provider::Apple => "Apple",
		}
	}
}
impl Display for Provider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.label())
	}
}

/// Token-source discriminator carried by direct relay messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenSource {
	/// `google-id-token` relays.
	#[serde(rename = "google-id-token")]
	GoogleIdToken,
	/// `apple-id-token` relays.
	#[serde(rename = "apple-id-token")]
	AppleIdToken,
}
impl TokenSource {
	/// Returns the wire representation of the discriminator.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenSource::GoogleIdToken => "google-id-token",
			TokenSource::AppleIdToken => "apple-id-token",
		}
	}

	/// Parses a wire discriminator.
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"google-id-token" => Some(TokenSource::GoogleIdToken),
			"apple-id-token" => Some(TokenSource::AppleIdToken),
			_ => None,
		}
	}

	/// Returns the provider this source belongs to.
	pub const fn provider(self) -> Provider {
		match self {
			TokenSource::GoogleIdToken => Provider::Google,
			TokenSource::AppleIdToken => Provider::Apple,
		}
	}
}
impl Display for TokenSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl std::error::Error for TokenSource {}

/// Injected per-provider configuration (client id + redirect URI).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Redirect URI the provider sends the fragment response to.
	pub redirect_uri: Url,
}
impl ProviderConfig {
	/// Creates a configuration after validating the client id is non-empty.
	pub fn new(client_id: impl Into<String>, redirect_uri: Url) -> Result<Self, ConfigError> {
		let client_id = client_id.into();

		if client_id.trim().is_empty() {
			return Err(ConfigError::EmptyClientId);
		}

		Ok(Self { client_id, redirect_uri })
	}

	/// Creates a configuration from a string redirect URI.
	pub fn parse(
		client_id: impl Into<String>,
		redirect_uri: impl AsRef<str>,
	) -> Result<Self, ConfigError> {
		let redirect_uri = Url::parse(redirect_uri.as_ref())
			.map_err(|source| ConfigError::InvalidRedirect { source })?;

		Self::new(client_id, redirect_uri)
	}
}
