//! Popup lifecycle coordination with origin-filtered message dispatch.
//!
//! [`PopupCoordinator::acquire_token`] drives exactly one sign-in attempt at a
//! time: it opens a centered popup, navigates it to the authorization URL, and
//! then races the host's message stream against a closed-popup liveness poll.
//! The first decisive event settles the attempt; leaving the select loop drops
//! both the message subscription and the poll timer in the same step, so a late
//! duplicate message can never alter an already-settled outcome.

mod attempt;
mod metrics;

pub use attempt::SignInAttempt;
pub use metrics::AttemptMetrics;

// crates.io
use tokio::time::{MissedTickBehavior, interval};
// self
use crate::{
	_prelude::*,
	host::{HostWindow, PopupFeatures, PopupHandle, PopupOpenError},
	message::{CallbackMessage, CallbackOutcome},
	provider::TokenSource,
};

/// Default interval for polling the popup's closed flag.
pub const DEFAULT_POLL_INTERVAL: StdDuration = StdDuration::from_millis(300);

/// Coordinates popup-based sign-in attempts against one host window.
pub struct PopupCoordinator<H>
where
	H: HostWindow,
{
	/// Host window the coordinator opens popups from.
	pub host: Arc<H>,
	/// Shared counters for attempt outcomes.
	pub metrics: Arc<AttemptMetrics>,
	poll_interval: StdDuration,
	attempt_guard: AsyncMutex<()>,
}
impl<H> PopupCoordinator<H>
where
	H: HostWindow,
{
	/// Creates a coordinator with the default 300 ms liveness poll.
	pub fn new(host: Arc<H>) -> Self {
		Self {
			host,
			metrics: Default::default(),
			poll_interval: DEFAULT_POLL_INTERVAL,
			attempt_guard: AsyncMutex::new(()),
		}
	}

	/// Overrides the closed-popup poll interval.
	pub fn with_poll_interval(mut self, poll_interval: StdDuration) -> Self {
		self.poll_interval = poll_interval;

		self
	}

	/// Runs one sign-in attempt and resolves with the relayed identity token.
	///
	/// At most one attempt is in flight per coordinator; concurrent callers queue
	/// on an async guard. There is no programmatic cancellation - the attempt ends
	/// when a matching message arrives or the user closes the popup.
	pub async fn acquire_token(
		&self,
		expected_source: TokenSource,
		authorize_url: &Url,
	) -> Result<String> {
		let _inflight = self.attempt_guard.lock().await;

		self.metrics.record_attempt();

		// Subscribe before the popup can possibly post anything back.
		let mut messages = self.host.subscribe_messages();
		let origin = self.host.origin();
		let attempt = match self.open_attempt(expected_source, authorize_url) {
			Ok(attempt) => attempt,
			Err(e) => {
				self.metrics.record_failure();

				return Err(e);
			},
		};

		#[cfg(feature = "tracing")]
		tracing::debug!(source = %expected_source, "Popup opened; awaiting callback message.");

		let mut liveness = interval(self.poll_interval);

		liveness.set_missed_tick_behavior(MissedTickBehavior::Delay);

		let result = loop {
			tokio::select! {
				received = messages.recv() => {
					let Some(message) = received else {
						// Host dropped its message fan-out; indistinguishable from a
						// closed popup from the caller's perspective.
						break Err(Error::PrematureClose);
					};

					if message.origin != origin {
						#[cfg(feature = "tracing")]
						tracing::warn!(origin = %message.origin, "Ignoring message from foreign origin.");

						continue;
					}

					let Some(parsed) = CallbackMessage::parse(&message.data) else {
						continue;
					};

					if parsed.source() != expected_source {
						continue;
					}

					break Self::settle(parsed, expected_source);
				},
				_ = liveness.tick() => {
					if attempt.popup_closed() {
						self.metrics.record_premature_close();

						break Err(Error::PrematureClose);
					}
				},
			}
		};

		attempt.close_popup_if_open();

		#[cfg(feature = "tracing")]
		tracing::debug!(
			source = %expected_source,
			elapsed = %attempt.elapsed(),
			ok = result.is_ok(),
			"Sign-in attempt settled.",
		);

		match &result {
			Ok(_) => self.metrics.record_success(),
			Err(_) => self.metrics.record_failure(),
		}

		result
	}

	fn open_attempt(
		&self,
		expected_source: TokenSource,
		authorize_url: &Url,
	) -> Result<SignInAttempt<H::Popup>> {
		let features = PopupFeatures::centered(&self.host.viewport());
		let popup = match self.host.open_popup(expected_source.as_str(), &features) {
			Ok(popup) => popup,
			Err(PopupOpenError::Blocked) => {
				// Last resort: continue the flow in this tab. The caller should treat
				// the pending navigation as the de facto outcome of the attempt.
				self.host.navigate_current(authorize_url);

				return Err(Error::PopupBlocked);
			},
			Err(PopupOpenError::Failed { reason }) => {
				self.host.navigate_current(authorize_url);

				return Err(Error::PopupOpenFailed { reason });
			},
		};

		popup.focus();

		if let Err(e) = popup.navigate(authorize_url) {
			popup.close();
			self.host.navigate_current(authorize_url);

			return Err(Error::PopupOpenFailed { reason: e.to_string() });
		}

		Ok(SignInAttempt::new(expected_source, popup))
	}

	fn settle(message: CallbackMessage, expected_source: TokenSource) -> Result<String> {
		match message.into_outcome() {
			CallbackOutcome::Token(token) => Ok(token),
			CallbackOutcome::Rejected { reason } => Err(Error::Provider { reason }),
			CallbackOutcome::Malformed => Err(Error::MalformedPayload { source: expected_source }),
		}
	}
}
impl<H> Debug for PopupCoordinator<H>
where
	H: HostWindow,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PopupCoordinator")
			.field("origin", &self.host.origin())
			.field("poll_interval", &self.poll_interval)
			.finish()
	}
}
