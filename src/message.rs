//! Tagged-union parsing for the three cross-window callback payload shapes.
//!
//! Every postMessage body on the page reaches the coordinator, so parsing treats
//! its input as untrusted: shapes are tried in priority order (backend-mediated
//! service envelope first, then the direct relay format) and anything that fails
//! both validators is reported as unrecognized rather than an error, letting
//! unrelated traffic pass through harmlessly.

// self
use crate::{
	_prelude::*,
	provider::{Provider, SERVICE_SOURCE, TokenSource},
};

/// Payload carried by a backend-mediated callback envelope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePayload {
	/// Identity token, when the sign-in succeeded.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id_token: Option<String>,
	/// Provider error code, when the sign-in failed.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	/// Human-readable error description, when supplied.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceEnvelope {
	#[serde(rename = "type")]
	kind: String,
	source: String,
	#[serde(default)]
	payload: ServicePayload,
}

/// Direct relay message posted by the same-origin callback page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMessage {
	/// Token-source discriminator.
	pub source: TokenSource,
	/// Identity token, when the sign-in succeeded.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id_token: Option<String>,
	/// Provider error description, when the sign-in failed.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	/// Round-tripped `state` value from the authorization request.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub state: Option<String>,
}

/// Delivery channel a callback message arrived over.
///
/// The channel decides who closes the popup: the backend-mediated callback page
/// closes its own window after relaying, while direct relays leave the close to
/// the coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayChannel {
	/// Backend-mediated service envelope.
	Service,
	/// Direct same-origin relay from the callback page.
	Direct,
}

/// Structurally valid callback message, parsed from untrusted postMessage data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackMessage {
	/// Backend-mediated envelope for one provider.
	Service {
		/// Provider the envelope's `type` discriminator named.
		provider: Provider,
		/// Relayed payload.
		payload: ServicePayload,
	},
	/// Direct relay from the same-origin callback page.
	Relay(RelayMessage),
}
impl CallbackMessage {
	/// Attempts to parse postMessage data against the known shapes in priority order.
	///
	/// Returns `None` for anything that matches neither shape; callers must treat
	/// that as a no-op, not a failure.
	pub fn parse(data: &Value) -> Option<Self> {
		if let Some(message) = Self::parse_service(data) {
			return Some(message);
		}

		Self::parse_relay(data)
	}

	fn parse_service(data: &Value) -> Option<Self> {
		let envelope = serde_json::from_value::<ServiceEnvelope>(data.clone()).ok()?;

		if envelope.source != SERVICE_SOURCE {
			return None;
		}

		let provider = Provider::from_callback_kind(&envelope.kind)?;

		Some(Self::Service { provider, payload: envelope.payload })
	}

	fn parse_relay(data: &Value) -> Option<Self> {
		serde_json::from_value::<RelayMessage>(data.clone()).ok().map(Self::Relay)
	}

	/// Returns the token source the message claims to carry.
	pub fn source(&self) -> TokenSource {
		match self {
			Self::Service { provider, .. } => provider.token_source(),
			Self::Relay(relay) => relay.source,
		}
	}

	/// Returns the channel the message arrived over.
	pub const fn channel(&self) -> RelayChannel {
		match self {
			Self::Service { .. } => RelayChannel::Service,
			Self::Relay(_) => RelayChannel::Direct,
		}
	}

	/// Reduces the message to its sign-in outcome.
	///
	/// Exactly one of `id_token`/`error` is meaningful per payload; an error field
	/// always wins, and a message carrying neither is malformed.
	pub fn into_outcome(self) -> CallbackOutcome {
		match self {
			Self::Service { payload, .. } => match (payload.error, payload.id_token) {
				(Some(error), _) => CallbackOutcome::Rejected {
					reason: payload.error_description.unwrap_or(error),
				},
				(None, Some(token)) => CallbackOutcome::Token(token),
				(None, None) => CallbackOutcome::Malformed,
			},
			Self::Relay(relay) => match (relay.error, relay.id_token) {
				(Some(error), _) => CallbackOutcome::Rejected { reason: error },
				(None, Some(token)) => CallbackOutcome::Token(token),
				(None, None) => CallbackOutcome::Malformed,
			},
		}
	}
}

/// Final outcome extracted from a structurally valid callback message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackOutcome {
	/// Sign-in succeeded with this identity token.
	Token(String),
	/// Provider (or the backend relay) reported an explicit error.
	Rejected {
		/// Provider-supplied reason, preferring `error_description` over `error`.
		reason: String,
	},
	/// The message matched an expected shape but carried neither token nor error.
	Malformed,
}
