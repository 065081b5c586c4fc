//! Window-host primitives the popup protocol runs against.
//!
//! The module exposes [`HostWindow`] and [`PopupHandle`] so the coordinator can
//! drive any windowing environment - a WASM binding over `window.open` and
//! `postMessage`, or the in-process mocks used by the crate's own tests -
//! without depending on one. Hosts fan incoming cross-window messages out to
//! subscribers, typically by embedding a [`MessageHub`].

/// Popup sizing and placement math.
pub mod geometry;

pub use geometry::*;

// crates.io
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
// self
use crate::_prelude::*;

/// Cross-window message as observed by the opener.
///
/// The message channel is an unscoped, shared resource: every script on the page
/// receives all traffic, so consumers must validate `origin` and shape before
/// acting on `data`.
#[derive(Clone, Debug)]
pub struct WindowMessage {
	/// Origin of the sending window.
	pub origin: String,
	/// Untrusted message body.
	pub data: Value,
}
impl WindowMessage {
	/// Creates a message for the given origin and body.
	pub fn new(origin: impl Into<String>, data: Value) -> Self {
		Self { origin: origin.into(), data }
	}
}

/// Failure modes of popup creation.
#[derive(Debug, ThisError)]
pub enum PopupOpenError {
	/// The host returned no window handle (popup blocker).
	#[error("Popup creation returned no window handle.")]
	Blocked,
	/// Popup creation threw inside the host.
	#[error("Popup creation failed: {reason}.")]
	Failed {
		/// Host-reported failure detail.
		reason: String,
	},
}

/// Abstraction over the opener window the sign-in flow runs in.
///
/// The trait is the coordinator's only dependency on a windowing stack.
/// Implementations must be `Send + Sync + 'static` so coordinators can be shared
/// behind `Arc` without additional wrappers.
pub trait HostWindow
where
	Self: 'static + Send + Sync,
{
	/// Popup handle type produced by [`HostWindow::open_popup`].
	type Popup: PopupHandle;

	/// Returns the opener's own origin; messages from any other origin are ignored.
	fn origin(&self) -> String;

	/// Returns the current viewport and screen-offset geometry.
	fn viewport(&self) -> Viewport;

	/// Opens a blank popup window with the given name and features.
	fn open_popup(
		&self,
		name: &str,
		features: &PopupFeatures,
	) -> Result<Self::Popup, PopupOpenError>;

	/// Navigates the host page itself; used as the popup-blocked fallback.
	fn navigate_current(&self, url: &Url);

	/// Subscribes to the host's cross-window message stream.
	///
	/// Each subscription observes every message delivered to the host from the
	/// moment of subscription onward.
	fn subscribe_messages(&self) -> UnboundedReceiver<WindowMessage>;
}

/// Handle to a popup window, exclusively owned by one sign-in attempt.
pub trait PopupHandle
where
	Self: 'static + Send + Sync,
{
	/// Navigates the popup to the authorization URL.
	fn navigate(&self, url: &Url) -> Result<(), PopupOpenError>;

	/// Brings the popup to the foreground.
	fn focus(&self);

	/// Reports whether the popup has been closed.
	///
	/// Browsers fire no reliable cross-window close event, so this flag is the
	/// only cancellation signal and is polled on a fixed interval.
	fn is_closed(&self) -> bool;

	/// Closes the popup. Must be a no-op (never a panic) when already closed.
	fn close(&self);
}

/// Fan-out registry for host implementations that broadcast window messages.
///
/// A host embeds one hub, calls [`MessageHub::broadcast`] from its message-event
/// binding, and serves [`HostWindow::subscribe_messages`] from
/// [`MessageHub::subscribe`]. Subscribers that dropped their receiver are pruned
/// on the next broadcast.
#[derive(Debug, Default)]
pub struct MessageHub(Mutex<Vec<UnboundedSender<WindowMessage>>>);
impl MessageHub {
	/// Registers a new subscriber and returns its receiving end.
	pub fn subscribe(&self) -> UnboundedReceiver<WindowMessage> {
		let (tx, rx) = unbounded_channel();

		self.0.lock().push(tx);

		rx
	}

	/// Delivers a message to every live subscriber.
	pub fn broadcast(&self, message: WindowMessage) {
		self.0.lock().retain(|tx| tx.send(message.clone()).is_ok());
	}

	/// Returns the number of live subscribers (stale ones included until pruned).
	pub fn subscriber_count(&self) -> usize {
		self.0.lock().len()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[tokio::test]
	async fn hub_broadcasts_to_every_subscriber_and_prunes_dropped_ones() {
		let hub = MessageHub::default();
		let mut first = hub.subscribe();
		let second = hub.subscribe();

		hub.broadcast(WindowMessage::new("https://app.example.com", json!({ "n": 1 })));

		assert_eq!(
			first.recv().await.expect("First subscriber should receive the message.").origin,
			"https://app.example.com"
		);

		drop(second);
		hub.broadcast(WindowMessage::new("https://app.example.com", json!({ "n": 2 })));

		assert_eq!(hub.subscriber_count(), 1);
	}
}
