//! High-level sign-in facade combining configuration, URL construction, and the popup flow.
//!
//! [`SignInClient`] is the crate's public entry point: configure it with the
//! provider credentials the application injects, then await
//! [`SignInClient::google_sign_in`] or [`SignInClient::apple_sign_in`] and react
//! to the resolved identity token or the rejection. Configuration problems fail
//! before any popup or navigation side effect.

// self
use crate::{
	_prelude::*,
	authorize::AuthorizationRequest,
	error::ConfigError,
	host::HostWindow,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	popup::{AttemptMetrics, PopupCoordinator},
	provider::{Provider, ProviderConfig},
};

/// Popup sign-in facade for one host window.
pub struct SignInClient<H>
where
	H: HostWindow,
{
	coordinator: PopupCoordinator<H>,
	google: Option<ProviderConfig>,
	apple: Option<ProviderConfig>,
}
impl<H> SignInClient<H>
where
	H: HostWindow,
{
	/// Creates an unconfigured client for the host window.
	pub fn new(host: Arc<H>) -> Self {
		Self { coordinator: PopupCoordinator::new(host), google: None, apple: None }
	}

	/// Registers the Google provider configuration.
	pub fn with_google(mut self, config: ProviderConfig) -> Self {
		self.google = Some(config);

		self
	}

	/// Registers the Apple provider configuration.
	pub fn with_apple(mut self, config: ProviderConfig) -> Self {
		self.apple = Some(config);

		self
	}

	/// Overrides the coordinator's closed-popup poll interval.
	pub fn with_poll_interval(mut self, poll_interval: StdDuration) -> Self {
		self.coordinator = self.coordinator.with_poll_interval(poll_interval);

		self
	}

	/// Returns the shared attempt counters.
	pub fn metrics(&self) -> Arc<AttemptMetrics> {
		self.coordinator.metrics.clone()
	}

	/// Signs in with Google and resolves with the identity token.
	pub async fn google_sign_in(&self) -> Result<String> {
		self.sign_in(Provider::Google, FlowKind::GoogleSignIn).await
	}

	/// Signs in with Apple through the popup path and resolves with the identity token.
	pub async fn apple_sign_in(&self) -> Result<String> {
		self.sign_in(Provider::Apple, FlowKind::AppleSignIn).await
	}

	/// Returns the registered configuration for a provider.
	pub fn provider_config(&self, provider: Provider) -> Result<&ProviderConfig> {
		let config = match provider {
			Provider::Google => self.google.as_ref(),
			Provider::Apple => self.apple.as_ref(),
		};

		config.ok_or_else(|| ConfigError::MissingProviderConfig { provider }.into())
	}

	async fn sign_in(&self, provider: Provider, kind: FlowKind) -> Result<String> {
		let span = FlowSpan::new(kind, "sign_in");

		obs::record_flow_outcome(kind, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let config = self.provider_config(provider)?;
				let request = AuthorizationRequest::new(provider, config);
				let authorize_url = request.authorize_url();

				#[cfg(feature = "tracing")]
				tracing::debug!(%provider, url = %authorize_url, "Built authorization URL.");

				self.coordinator.acquire_token(provider.token_source(), &authorize_url).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(kind, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(kind, FlowOutcome::Failure),
		}

		result
	}
}
impl<H> Debug for SignInClient<H>
where
	H: HostWindow,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignInClient")
			.field("coordinator", &self.coordinator)
			.field("google_configured", &self.google.is_some())
			.field("apple_configured", &self.apple.is_some())
			.finish()
	}
}
