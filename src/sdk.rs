//! Vendor-SDK acquisition path for Apple sign-in.
//!
//! The adapter lazily loads the vendor script and initializes the SDK exactly
//! once per adapter lifetime. Readiness is guarded by a single async mutex, so
//! concurrent sign-in calls queue on the same in-flight load instead of
//! injecting the script twice; once ready, subsequent calls reuse the
//! initialized SDK instance directly.

// self
use crate::{
	_prelude::*,
	error::SdkError,
	provider::{Provider, ProviderConfig},
};

/// Boxed future type returned by SDK host traits.
pub type SdkFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SdkError>> + Send + 'a>>;

/// Initialization parameters passed to the vendor SDK.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppleSdkConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Scope string requested from the provider.
	pub scope: String,
	/// Redirect URI registered with the provider.
	pub redirect_uri: Url,
	/// Requests the SDK's popup mode instead of a full-page redirect.
	pub use_popup: bool,
}
impl AppleSdkConfig {
	/// Builds the standard popup-mode configuration from a provider configuration.
	pub fn popup(config: &ProviderConfig) -> Self {
		Self {
			client_id: config.client_id.clone(),
			scope: Provider::Apple.scope().into(),
			redirect_uri: config.redirect_uri.clone(),
			use_popup: true,
		}
	}
}

/// Handle to the loaded vendor SDK global.
pub trait AppleAuthSdk
where
	Self: 'static + Send + Sync,
{
	/// Initializes the SDK. Called at most once per adapter lifetime.
	fn init(&self, config: &AppleSdkConfig) -> Result<(), SdkError>;

	/// Invokes the SDK's sign-in entry point and resolves with its raw response.
	fn sign_in(&self) -> SdkFuture<'_, Value>;
}

/// Abstraction over script injection and the vendor global's availability.
pub trait ScriptHost
where
	Self: 'static + Send + Sync,
{
	/// SDK handle type surfaced after the script loads.
	type Sdk: AppleAuthSdk;

	/// Fetches and evaluates the vendor script.
	fn load_script(&self) -> SdkFuture<'_, ()>;

	/// Returns the vendor SDK global, when present.
	fn sdk(&self) -> Option<Arc<Self::Sdk>>;
}

/// Lazily-initialized, single-flight adapter around the vendor sign-in SDK.
pub struct AppleSdkAdapter<S>
where
	S: ScriptHost,
{
	host: Arc<S>,
	config: AppleSdkConfig,
	ready: AsyncMutex<Option<Arc<S::Sdk>>>,
}
impl<S> AppleSdkAdapter<S>
where
	S: ScriptHost,
{
	/// Creates an adapter; nothing is loaded until the first sign-in call.
	pub fn new(host: Arc<S>, config: AppleSdkConfig) -> Self {
		Self { host, config, ready: AsyncMutex::new(None) }
	}

	/// Signs in through the vendor SDK and extracts the identity token.
	pub async fn sign_in(&self) -> Result<String, SdkError> {
		let sdk = self.ensure_ready().await?;
		let response = sdk.sign_in().await?;

		extract_id_token(&response).ok_or(SdkError::MissingToken)
	}

	/// Loads and initializes the SDK on first use, reusing it afterwards.
	///
	/// A failed load or init leaves the adapter unready, so the next caller
	/// retries from scratch rather than replaying a cached rejection.
	pub async fn ensure_ready(&self) -> Result<Arc<S::Sdk>, SdkError> {
		let mut ready = self.ready.lock().await;

		if let Some(sdk) = ready.as_ref() {
			return Ok(sdk.clone());
		}

		self.host.load_script().await?;

		let sdk = self.host.sdk().ok_or(SdkError::Unavailable)?;

		sdk.init(&self.config)?;

		#[cfg(feature = "tracing")]
		tracing::debug!(client_id = %self.config.client_id, "Vendor SDK loaded and initialized.");

		*ready = Some(sdk.clone());

		Ok(sdk)
	}
}
impl<S> Debug for AppleSdkAdapter<S>
where
	S: ScriptHost,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AppleSdkAdapter").field("config", &self.config).finish()
	}
}

fn extract_id_token(response: &Value) -> Option<String> {
	response.get("authorization")?.get("id_token")?.as_str().map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn id_token_extraction_requires_the_authorization_envelope() {
		let response = json!({ "authorization": { "id_token": "eyAB", "code": "c1" } });

		assert_eq!(extract_id_token(&response).as_deref(), Some("eyAB"));
		assert_eq!(extract_id_token(&json!({ "id_token": "eyAB" })), None);
		assert_eq!(extract_id_token(&json!({ "authorization": {} })), None);
		assert_eq!(extract_id_token(&json!({ "authorization": { "id_token": 42 } })), None);
	}
}
