//! Fragment parsing and opener relay for the popped-up callback page.
//!
//! [`CallbackReconciler::run`] implements the callback page contract: read the
//! URL fragment, post at most one message back to the opener scoped to the
//! page's own origin, and close the window after a fixed delay regardless of
//! outcome so a detached opener never leaves an orphaned popup behind. A
//! throwing `postMessage` must never prevent the close attempt.

// crates.io
use tokio::time::sleep;
// self
use crate::{_prelude::*, message::RelayMessage, provider::Provider};

/// Delay between relaying and closing the callback window.
pub const DEFAULT_CLOSE_DELAY: StdDuration = StdDuration::from_millis(600);

/// Relay failure reported by a [`CallbackPage`] implementation.
#[derive(Debug, ThisError)]
#[error("Opener rejected the relayed message: {reason}.")]
pub struct RelayError {
	/// Host-reported failure detail.
	pub reason: String,
}

/// Abstraction over the browser surface the callback page runs on.
///
/// All DOM access is behind this trait so the reconciler stays total in
/// environments where `window`, `opener`, or both are unavailable.
pub trait CallbackPage
where
	Self: 'static + Send + Sync,
{
	/// Returns the raw URL fragment (`window.location.hash`), leading `#` included.
	fn fragment(&self) -> String;

	/// Returns the page's own origin; relayed messages are scoped to it.
	fn origin(&self) -> String;

	/// Reports whether an opener window reference exists.
	fn has_opener(&self) -> bool;

	/// Posts a message to the opener, scoped to `target_origin`.
	fn post_to_opener(&self, data: Value, target_origin: &str) -> Result<(), RelayError>;

	/// Displays a local status message to the user.
	fn display(&self, message: &str);

	/// Closes the callback window itself. Must tolerate repeated calls.
	fn close(&self);
}

/// Parameters extracted from the provider's fragment response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FragmentParams {
	/// Identity token, when present.
	pub id_token: Option<String>,
	/// Round-tripped `state` value; empty string when absent.
	pub state: String,
	/// Provider error code, when present.
	pub error: Option<String>,
	/// Provider error description, when present.
	pub error_description: Option<String>,
}
impl FragmentParams {
	/// Parses a URL fragment (not the query string) into its known parameters.
	pub fn parse(fragment: &str) -> Self {
		let trimmed = fragment.strip_prefix('#').unwrap_or(fragment);
		let mut params = Self::default();

		for (key, value) in url::form_urlencoded::parse(trimmed.as_bytes()) {
			match key.as_ref() {
				"id_token" => params.id_token = Some(value.into_owned()),
				"state" => params.state = value.into_owned(),
				"error" => params.error = Some(value.into_owned()),
				"error_description" => params.error_description = Some(value.into_owned()),
				_ => {},
			}
		}

		params
	}
}

/// What the reconciler relayed to the opener, reported for observability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayDisposition {
	/// An identity token was relayed.
	Token,
	/// A provider error was relayed.
	Error,
	/// The fragment carried no token; nothing was relayed and the opener will
	/// surface the outcome via its closed-popup detection.
	Nothing,
}

/// Runs inside the popped-up window and relays the fragment response to the opener.
pub struct CallbackReconciler<P>
where
	P: CallbackPage,
{
	provider: Provider,
	page: P,
	close_delay: StdDuration,
}
impl<P> CallbackReconciler<P>
where
	P: CallbackPage,
{
	/// Creates a reconciler for the provider's callback route.
	pub fn new(provider: Provider, page: P) -> Self {
		Self { provider, page, close_delay: DEFAULT_CLOSE_DELAY }
	}

	/// Overrides the self-close delay.
	pub fn with_close_delay(mut self, close_delay: StdDuration) -> Self {
		self.close_delay = close_delay;

		self
	}

	/// Parses the fragment, relays at most one message, then closes the window.
	pub async fn run(&self) -> RelayDisposition {
		let params = FragmentParams::parse(&self.page.fragment());
		let disposition = self.relay(&params);

		sleep(self.close_delay).await;
		self.page.close();

		disposition
	}

	fn relay(&self, params: &FragmentParams) -> RelayDisposition {
		let source = self.provider.token_source();

		if let Some(error) = &params.error {
			let reason = params.error_description.clone().unwrap_or_else(|| error.clone());

			self.page.display(&format!("{} sign-in failed: {reason}", self.provider));
			self.post(RelayMessage {
				source,
				id_token: None,
				error: Some(reason),
				state: Some(params.state.clone()),
			});

			RelayDisposition::Error
		} else if let Some(id_token) = &params.id_token {
			self.page.display(&format!(
				"{} sign-in successful. You can close this window.",
				self.provider
			));
			self.post(RelayMessage {
				source,
				id_token: Some(id_token.clone()),
				error: None,
				state: Some(params.state.clone()),
			});

			RelayDisposition::Token
		} else {
			self.page.display("No id_token found in callback.");

			RelayDisposition::Nothing
		}
	}

	fn post(&self, message: RelayMessage) {
		if !self.page.has_opener() {
			#[cfg(feature = "tracing")]
			tracing::warn!("No opener window available; callback message dropped.");

			return;
		}

		let data = match serde_json::to_value(&message) {
			Ok(data) => data,
			Err(_e) => {
				#[cfg(feature = "tracing")]
				tracing::warn!(error = %_e, "Failed to serialize callback message.");

				return;
			},
		};

		// A failed post must never prevent the scheduled window close.
		if let Err(_e) = self.page.post_to_opener(data, &self.page.origin()) {
			#[cfg(feature = "tracing")]
			tracing::warn!(error = %_e, "Opener rejected the callback message.");
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn fragment_parsing_reads_known_parameters() {
		let params = FragmentParams::parse("#id_token=xyz&state=s1");

		assert_eq!(params.id_token.as_deref(), Some("xyz"));
		assert_eq!(params.state, "s1");
		assert_eq!(params.error, None);

		let params = FragmentParams::parse("error=access_denied&error_description=User%20cancelled");

		assert_eq!(params.id_token, None);
		assert_eq!(params.error.as_deref(), Some("access_denied"));
		assert_eq!(params.error_description.as_deref(), Some("User cancelled"));
		assert_eq!(params.state, "");
	}

	#[test]
	fn fragment_parsing_ignores_unknown_parameters_and_empty_input() {
		let params = FragmentParams::parse("#id_token=xyz&authuser=0&hd=example.com");

		assert_eq!(params.id_token.as_deref(), Some("xyz"));
		assert_eq!(FragmentParams::parse(""), FragmentParams::default());
		assert_eq!(FragmentParams::parse("#"), FragmentParams::default());
	}
}
