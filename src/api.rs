//! Login-service exchange client for resolved identity tokens.
//!
//! Once the popup flow resolves an `id_token`, the application hands it to the
//! backend's `/auth/google` or `/auth/apple` endpoint. Every login-service
//! response follows the `{ "s": "ok" | "error", "d": <payload> }` envelope
//! convention, parsed here with path-aware JSON errors. The exchange itself is
//! plumbing around the popup core; this module is the crate's default
//! implementation of it, gated on the `reqwest` feature.

// self
use crate::{_prelude::*, error::ApiError};

/// Envelope status discriminator used by all login-service endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
	/// Request succeeded; the payload lives in `d`.
	Ok,
	/// Request failed; `d` may carry a `message`.
	Error,
}

/// Uniform JSON envelope wrapping every login-service response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
	/// Envelope status.
	pub s: EnvelopeStatus,
	/// Wrapped payload.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub d: Option<T>,
}
impl<T> ApiEnvelope<T> {
	/// Unwraps the payload, mapping error envelopes and missing payloads.
	pub fn into_payload(self) -> Result<T, ApiError>
	where
		T: ServiceDetail,
	{
		match self.s {
			EnvelopeStatus::Ok => self.d.ok_or(ApiError::MissingPayload),
			EnvelopeStatus::Error => Err(ApiError::Rejected {
				reason: self
					.d
					.as_ref()
					.and_then(ServiceDetail::message)
					.unwrap_or_else(|| "Unknown login service error.".into()),
			}),
		}
	}
}

/// Payloads that can surface a service-supplied message.
pub trait ServiceDetail {
	/// Returns the service-supplied message, when the payload carries one.
	fn message(&self) -> Option<String>;
}
impl ServiceDetail for Value {
	fn message(&self) -> Option<String> {
		self.get("message")
			.or_else(|| self.get("error"))
			.and_then(Value::as_str)
			.map(ToOwned::to_owned)
	}
}

/// Parses an envelope body with path-aware error reporting.
pub fn parse_envelope<T>(body: &str) -> Result<ApiEnvelope<T>, ApiError>
where
	T: for<'de> Deserialize<'de> + Default,
{
	let mut deserializer = serde_json::Deserializer::from_str(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ApiError::Parse { source })
}

#[cfg(feature = "reqwest")]
pub use reqwest_client::*;
#[cfg(feature = "reqwest")]
mod reqwest_client {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	/// Reqwest-backed client for the login service's social-auth endpoints.
	#[derive(Clone, Debug)]
	pub struct LoginApiClient {
		base_url: Url,
		client: ReqwestClient,
	}
	impl LoginApiClient {
		/// Creates a client for the given API base URL with a default transport.
		pub fn new(base_url: Url) -> Self {
			Self::with_client(base_url, ReqwestClient::default())
		}

		/// Creates a client that reuses a caller-provided transport.
		pub fn with_client(base_url: Url, client: ReqwestClient) -> Self {
			Self { base_url, client }
		}

		/// Exchanges a Google identity token for an application session payload.
		pub async fn auth_with_google(
			&self,
			id_token: &str,
			mobile: Option<&str>,
		) -> Result<Value, ApiError> {
			self.exchange("auth/google", id_token, mobile).await
		}

		/// Exchanges an Apple identity token for an application session payload.
		pub async fn auth_with_apple(
			&self,
			id_token: &str,
			mobile: Option<&str>,
		) -> Result<Value, ApiError> {
			self.exchange("auth/apple", id_token, mobile).await
		}

		async fn exchange(
			&self,
			path: &str,
			id_token: &str,
			mobile: Option<&str>,
		) -> Result<Value, ApiError> {
			let url = self
				.base_url
				.join(path)
				.map_err(|e| ApiError::network(JoinError(e)))?;
			let mut body = json!({ "token": id_token });

			if let Some(mobile) = mobile {
				body["mobile"] = Value::String(mobile.into());
			}

			let response = self.client.post(url).json(&body).send().await?;
			let status = response.status().as_u16();
			let text = response.text().await?;

			if !(200..300).contains(&status) {
				let message = parse_envelope::<Value>(&text)
					.ok()
					.and_then(|envelope| envelope.d.as_ref().and_then(ServiceDetail::message));

				return Err(ApiError::Status { status, message });
			}

			parse_envelope::<Value>(&text)?.into_payload()
		}
	}

	#[derive(Debug, ThisError)]
	#[error("Exchange endpoint path is invalid.")]
	struct JoinError(#[source] url::ParseError);
}
