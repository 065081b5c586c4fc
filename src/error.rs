//! Sign-in error types shared across the authorize, popup, callback, and SDK paths.

// self
use crate::{
	_prelude::*,
	provider::{Provider, TokenSource},
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical sign-in error exposed by public APIs.
///
/// Every failure of a sign-in attempt surfaces as exactly one of these variants;
/// nothing in the crate retries automatically and nothing panics outside tests.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; raised before any popup or network activity.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Vendor SDK acquisition path failure.
	#[error(transparent)]
	Sdk(#[from] SdkError),
	/// Login-service exchange failure.
	#[error(transparent)]
	Api(#[from] ApiError),

	/// Popup creation returned no window handle; the host page was redirected instead.
	#[error("Popup blocked; redirected to provider in this tab.")]
	PopupBlocked,
	/// Popup creation or navigation threw; the host page was redirected instead.
	#[error("Unable to open popup; redirected to provider in this tab.")]
	PopupOpenFailed {
		/// Host-reported failure detail.
		reason: String,
	},
	/// The identity provider (or the backend relay) reported an explicit error.
	#[error("{reason}")]
	Provider {
		/// Provider-supplied `error_description`, falling back to `error`.
		reason: String,
	},
	/// Popup closed before any valid message arrived.
	///
	/// The protocol cannot distinguish a deliberate user close from a popup that
	/// closed itself after a failed internal redirect; both surface here.
	#[error("Popup closed before completing sign-in.")]
	PrematureClose,
	/// Message matched the expected source but carried neither a token nor an error.
	#[error("Callback message for {source} carried neither an id_token nor an error.")]
	MalformedPayload {
		/// Token source the message claimed to relay.
		source: TokenSource,
	},
}

/// Configuration and validation failures raised before any side effect.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// No [`ProviderConfig`](crate::provider::ProviderConfig) was registered for the provider.
	#[error("{provider} sign-in is not configured.")]
	MissingProviderConfig {
		/// Provider the caller attempted to sign in with.
		provider: Provider,
	},
	/// Client identifier was empty or whitespace.
	#[error("Client identifier cannot be empty.")]
	EmptyClientId,
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Failures specific to the vendor-SDK acquisition path.
#[derive(Debug, ThisError)]
pub enum SdkError {
	/// The sign-in script failed to fetch.
	#[error("Failed to load the sign-in script: {reason}.")]
	ScriptLoad {
		/// Host-reported load failure detail.
		reason: String,
	},
	/// The vendor global was absent after the script loaded.
	#[error("Vendor sign-in object is unavailable after script load.")]
	Unavailable,
	/// The SDK rejected its initialization parameters.
	#[error("Vendor SDK initialization failed: {reason}.")]
	Init {
		/// SDK-reported initialization failure detail.
		reason: String,
	},
	/// The SDK sign-in call resolved without an identity token.
	#[error("Sign-in response did not include an identity token.")]
	MissingToken,
}

/// Failures raised by the login-service envelope client.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Underlying HTTP transport reported a network failure.
	#[error("Network error occurred while calling the login service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Login service answered with a non-success HTTP status.
	#[error("Login service request failed ({status}).")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Service-supplied message, when the body carried one.
		message: Option<String>,
	},
	/// Login service returned malformed JSON.
	#[error("Login service returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Envelope status was `error`.
	#[error("Login service rejected the sign-in: {reason}.")]
	Rejected {
		/// Service-supplied reason string.
		reason: String,
	},
	/// Envelope status was `ok` but the payload field was absent.
	#[error("Login service response was missing its payload.")]
	MissingPayload,
}
impl ApiError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ApiError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
