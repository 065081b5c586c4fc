//! Popup-based OAuth 2.0 implicit-flow sign-in - provider authorize URLs, cross-window
//! callback reconciliation, and single-resolution popup coordination behind pluggable
//! window hosts.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod authorize;
pub mod callback;
pub mod error;
pub mod host;
pub mod message;
pub mod obs;
pub mod popup;
pub mod provider;
pub mod sdk;
pub mod signin;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Mock window hosts and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
	// crates.io
	use tokio::sync::mpsc::UnboundedReceiver;
	// self
	use crate::{
		callback::{CallbackPage, RelayError},
		error::SdkError,
		host::{HostWindow, MessageHub, PopupFeatures, PopupHandle, PopupOpenError, Viewport,
			WindowMessage},
		provider::ProviderConfig,
		sdk::{AppleAuthSdk, AppleSdkConfig, ScriptHost, SdkFuture},
		signin::SignInClient,
	};

	/// Origin used by the mock host and every same-origin test message.
	pub const TEST_ORIGIN: &str = "https://app.example.com";

	/// Builds a valid provider configuration fixture for the given callback path.
	pub fn test_provider_config(path: &str) -> ProviderConfig {
		ProviderConfig::parse("client-test", format!("{TEST_ORIGIN}{path}"))
			.expect("Test provider configuration should be valid.")
	}

	/// Builds a fully configured [`SignInClient`] over a [`MockHost`] with a fast poll.
	pub fn build_test_client(host: Arc<MockHost>) -> SignInClient<MockHost> {
		SignInClient::new(host)
			.with_google(test_provider_config("/auth/callback/google"))
			.with_apple(test_provider_config("/auth/callback/apple"))
			.with_poll_interval(StdDuration::from_millis(10))
	}

	#[derive(Debug, Default)]
	struct MockPopupState {
		closed: AtomicBool,
		close_calls: AtomicU64,
		focus_calls: AtomicU64,
		fail_navigation: AtomicBool,
		navigations: Mutex<Vec<Url>>,
	}

	/// Popup handle whose lifecycle tests can inspect and drive.
	#[derive(Clone, Debug, Default)]
	pub struct MockPopup(Arc<MockPopupState>);
	impl MockPopup {
		/// Simulates the user closing the popup window.
		pub fn simulate_user_close(&self) {
			self.0.closed.store(true, Ordering::SeqCst);
		}

		/// Makes the next navigation attempt fail.
		pub fn fail_navigation(&self) {
			self.0.fail_navigation.store(true, Ordering::SeqCst);
		}

		/// Returns how many times `close` was invoked.
		pub fn close_calls(&self) -> u64 {
			self.0.close_calls.load(Ordering::SeqCst)
		}

		/// Returns how many times `focus` was invoked.
		pub fn focus_calls(&self) -> u64 {
			self.0.focus_calls.load(Ordering::SeqCst)
		}

		/// Returns every URL the popup was navigated to.
		pub fn navigations(&self) -> Vec<Url> {
			self.0.navigations.lock().clone()
		}
	}
	impl PopupHandle for MockPopup {
		fn navigate(&self, url: &Url) -> Result<(), PopupOpenError> {
			if self.0.fail_navigation.load(Ordering::SeqCst) {
				return Err(PopupOpenError::Failed { reason: "navigation refused".into() });
			}

			self.0.navigations.lock().push(url.clone());

			Ok(())
		}

		fn focus(&self) {
			self.0.focus_calls.fetch_add(1, Ordering::SeqCst);
		}

		fn is_closed(&self) -> bool {
			self.0.closed.load(Ordering::SeqCst)
		}

		fn close(&self) {
			self.0.close_calls.fetch_add(1, Ordering::SeqCst);
			self.0.closed.store(true, Ordering::SeqCst);
		}
	}

	/// In-process [`HostWindow`] double recording popups, redirects, and messages.
	#[derive(Debug)]
	pub struct MockHost {
		hub: MessageHub,
		viewport: Viewport,
		block_popups: AtomicBool,
		popups: Mutex<Vec<MockPopup>>,
		redirects: Mutex<Vec<Url>>,
	}
	impl MockHost {
		/// Creates a host with a desktop-sized viewport.
		pub fn new() -> Arc<Self> {
			Arc::new(Self {
				hub: MessageHub::default(),
				viewport: Viewport::new(1280, 800, 0, 0),
				block_popups: AtomicBool::new(false),
				popups: Mutex::new(Vec::new()),
				redirects: Mutex::new(Vec::new()),
			})
		}

		/// Makes subsequent popup creation fail like a popup blocker.
		pub fn block_popups(&self) {
			self.block_popups.store(true, Ordering::SeqCst);
		}

		/// Delivers a message to every subscriber, as the browser would.
		pub fn post_message(&self, origin: &str, data: Value) {
			self.hub.broadcast(WindowMessage::new(origin, data));
		}

		/// Returns the most recently opened popup.
		pub fn last_popup(&self) -> Option<MockPopup> {
			self.popups.lock().last().cloned()
		}

		/// Returns every full-page redirect the host performed.
		pub fn redirects(&self) -> Vec<Url> {
			self.redirects.lock().clone()
		}

		/// Waits until a popup exists, so tests can interact with it.
		pub async fn wait_for_popup(&self) -> MockPopup {
			loop {
				if let Some(popup) = self.last_popup() {
					return popup;
				}

				tokio::task::yield_now().await;
			}
		}
	}
	impl HostWindow for MockHost {
		type Popup = MockPopup;

		fn origin(&self) -> String {
			TEST_ORIGIN.into()
		}

		fn viewport(&self) -> Viewport {
			self.viewport
		}

		fn open_popup(
			&self,
			_name: &str,
			_features: &PopupFeatures,
		) -> Result<Self::Popup, PopupOpenError> {
			if self.block_popups.load(Ordering::SeqCst) {
				return Err(PopupOpenError::Blocked);
			}

			let popup = MockPopup::default();

			self.popups.lock().push(popup.clone());

			Ok(popup)
		}

		fn navigate_current(&self, url: &Url) {
			self.redirects.lock().push(url.clone());
		}

		fn subscribe_messages(&self) -> UnboundedReceiver<WindowMessage> {
			self.hub.subscribe()
		}
	}

	/// In-process [`CallbackPage`] double recording posts, displays, and closes.
	#[derive(Debug)]
	pub struct MockCallbackPage {
		fragment: String,
		has_opener: bool,
		fail_posts: AtomicBool,
		posts: Mutex<Vec<(Value, String)>>,
		displays: Mutex<Vec<String>>,
		close_calls: AtomicU64,
	}
	impl MockCallbackPage {
		/// Creates a page loaded with the given URL fragment and an opener present.
		pub fn new(fragment: impl Into<String>) -> Arc<Self> {
			Self::build(fragment, true)
		}

		/// Creates a page without an opener window reference.
		pub fn without_opener(fragment: impl Into<String>) -> Arc<Self> {
			Self::build(fragment, false)
		}

		fn build(fragment: impl Into<String>, has_opener: bool) -> Arc<Self> {
			Arc::new(Self {
				fragment: fragment.into(),
				has_opener,
				fail_posts: AtomicBool::new(false),
				posts: Mutex::new(Vec::new()),
				displays: Mutex::new(Vec::new()),
				close_calls: AtomicU64::new(0),
			})
		}

		/// Makes every post to the opener fail like a throwing `postMessage`.
		pub fn fail_posts(&self) {
			self.fail_posts.store(true, Ordering::SeqCst);
		}

		/// Returns every posted `(data, target_origin)` pair.
		pub fn posts(&self) -> Vec<(Value, String)> {
			self.posts.lock().clone()
		}

		/// Returns every displayed status message.
		pub fn displays(&self) -> Vec<String> {
			self.displays.lock().clone()
		}

		/// Returns how many times the page closed itself.
		pub fn close_calls(&self) -> u64 {
			self.close_calls.load(Ordering::SeqCst)
		}
	}
	impl CallbackPage for Arc<MockCallbackPage> {
		fn fragment(&self) -> String {
			self.fragment.clone()
		}

		fn origin(&self) -> String {
			TEST_ORIGIN.into()
		}

		fn has_opener(&self) -> bool {
			self.has_opener
		}

		fn post_to_opener(&self, data: Value, target_origin: &str) -> Result<(), RelayError> {
			if self.fail_posts.load(Ordering::SeqCst) {
				return Err(RelayError { reason: "postMessage threw".into() });
			}

			self.posts.lock().push((data, target_origin.into()));

			Ok(())
		}

		fn display(&self, message: &str) {
			self.displays.lock().push(message.into());
		}

		fn close(&self) {
			self.close_calls.fetch_add(1, Ordering::SeqCst);
		}
	}

	/// Scripted [`AppleAuthSdk`] double.
	#[derive(Debug)]
	pub struct MockAppleSdk {
		response: Value,
		fail_init: AtomicBool,
		init_calls: AtomicU64,
		sign_in_calls: AtomicU64,
	}
	impl MockAppleSdk {
		/// Creates an SDK double that answers sign-ins with the given response.
		pub fn new(response: Value) -> Arc<Self> {
			Arc::new(Self {
				response,
				fail_init: AtomicBool::new(false),
				init_calls: AtomicU64::new(0),
				sign_in_calls: AtomicU64::new(0),
			})
		}

		/// Makes initialization fail.
		pub fn fail_init(&self) {
			self.fail_init.store(true, Ordering::SeqCst);
		}

		/// Returns how many times `init` ran.
		pub fn init_calls(&self) -> u64 {
			self.init_calls.load(Ordering::SeqCst)
		}

		/// Returns how many times `sign_in` ran.
		pub fn sign_in_calls(&self) -> u64 {
			self.sign_in_calls.load(Ordering::SeqCst)
		}
	}
	impl AppleAuthSdk for MockAppleSdk {
		fn init(&self, _config: &AppleSdkConfig) -> Result<(), SdkError> {
			self.init_calls.fetch_add(1, Ordering::SeqCst);

			if self.fail_init.load(Ordering::SeqCst) {
				return Err(SdkError::Init { reason: "invalid client".into() });
			}

			Ok(())
		}

		fn sign_in(&self) -> SdkFuture<'_, Value> {
			self.sign_in_calls.fetch_add(1, Ordering::SeqCst);

			let response = self.response.clone();

			Box::pin(async move { Ok(response) })
		}
	}

	/// Scripted [`ScriptHost`] double tracking load attempts.
	#[derive(Debug)]
	pub struct MockScriptHost {
		sdk: Option<Arc<MockAppleSdk>>,
		fail_load: AtomicBool,
		load_calls: AtomicU64,
		load_delay: StdDuration,
	}
	impl MockScriptHost {
		/// Creates a host whose script load exposes the given SDK global.
		pub fn new(sdk: Option<Arc<MockAppleSdk>>) -> Arc<Self> {
			Arc::new(Self {
				sdk,
				fail_load: AtomicBool::new(false),
				load_calls: AtomicU64::new(0),
				load_delay: StdDuration::from_millis(10),
			})
		}

		/// Makes script loading fail.
		pub fn fail_load(&self) {
			self.fail_load.store(true, Ordering::SeqCst);
		}

		/// Returns how many times the script was loaded.
		pub fn load_calls(&self) -> u64 {
			self.load_calls.load(Ordering::SeqCst)
		}
	}
	impl ScriptHost for MockScriptHost {
		type Sdk = MockAppleSdk;

		fn load_script(&self) -> SdkFuture<'_, ()> {
			self.load_calls.fetch_add(1, Ordering::SeqCst);

			let fail = self.fail_load.load(Ordering::SeqCst);
			let delay = self.load_delay;

			Box::pin(async move {
				tokio::time::sleep(delay).await;

				if fail {
					return Err(SdkError::ScriptLoad { reason: "network unreachable".into() });
				}

				Ok(())
			})
		}

		fn sdk(&self) -> Option<Arc<Self::Sdk>> {
			self.sdk.clone()
		}
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
