#![cfg(feature = "test")]

// std
use std::collections::HashMap;
// crates.io
use serde_json::json;
use tokio::{task::JoinHandle, time::Instant};
// self
use popup_oauth::{
	_preludet::*,
	authorize::RANDOM_LEN,
	error::ConfigError,
	provider::{Provider, TokenSource},
	signin::SignInClient,
};

fn spawn_google_sign_in(client: &Arc<SignInClient<MockHost>>) -> JoinHandle<Result<String>> {
	let client = client.clone();

	tokio::spawn(async move { client.google_sign_in().await })
}

async fn settle_first_tick() {
	// The liveness interval fires once immediately; let it pass so tests control
	// when the closed flag is observed.
	tokio::time::sleep(StdDuration::from_millis(30)).await;
}

#[tokio::test]
async fn google_sign_in_resolves_with_the_relayed_token() {
	let host = MockHost::new();
	let client = Arc::new(build_test_client(host.clone()));
	let handle = spawn_google_sign_in(&client);
	let popup = host.wait_for_popup().await;

	assert_eq!(popup.focus_calls(), 1);

	let navigations = popup.navigations();

	assert_eq!(navigations.len(), 1);

	let pairs: HashMap<_, _> = navigations[0].query_pairs().into_owned().collect();

	assert_eq!(pairs.get("client_id"), Some(&"client-test".into()));
	assert_eq!(
		pairs.get("redirect_uri"),
		Some(&format!("{TEST_ORIGIN}/auth/callback/google"))
	);
	assert_eq!(pairs.get("response_type"), Some(&"id_token".into()));
	assert_eq!(pairs.get("response_mode"), Some(&"fragment".into()));
	assert_eq!(pairs.get("scope"), Some(&"openid email profile".into()));
	assert!(pairs.get("nonce").is_some_and(|nonce| nonce.len() >= RANDOM_LEN));
	assert!(pairs.get("state").is_some_and(|state| state.len() >= RANDOM_LEN));

	host.post_message(
		TEST_ORIGIN,
		json!({ "source": "google-id-token", "id_token": "eyAB", "state": "s1" }),
	);

	let token = handle
		.await
		.expect("Sign-in task should not panic.")
		.expect("Sign-in should resolve with the relayed token.");

	assert_eq!(token, "eyAB");
	assert_eq!(popup.close_calls(), 1, "The coordinator must close the popup exactly once.");
	assert_eq!(client.metrics().attempts(), 1);
	assert_eq!(client.metrics().successes(), 1);
}

#[tokio::test]
async fn provider_errors_reject_with_the_reported_reason() {
	let host = MockHost::new();
	let client = Arc::new(build_test_client(host.clone()));
	let handle = spawn_google_sign_in(&client);
	let popup = host.wait_for_popup().await;

	host.post_message(TEST_ORIGIN, json!({ "source": "google-id-token", "error": "access_denied" }));

	let err = handle
		.await
		.expect("Sign-in task should not panic.")
		.expect_err("Provider errors must reject the attempt.");

	assert!(matches!(err, Error::Provider { ref reason } if reason == "access_denied"));
	assert_eq!(popup.close_calls(), 1);
	assert_eq!(client.metrics().failures(), 1);
}

#[tokio::test]
async fn foreign_origin_messages_leave_the_attempt_pending() {
	let host = MockHost::new();
	let client = Arc::new(build_test_client(host.clone()));
	let handle = spawn_google_sign_in(&client);
	let _popup = host.wait_for_popup().await;

	host.post_message(
		"https://evil.example.net",
		json!({ "source": "google-id-token", "id_token": "forged" }),
	);
	tokio::time::sleep(StdDuration::from_millis(50)).await;

	assert!(!handle.is_finished(), "Foreign-origin messages must be silently ignored.");

	host.post_message(
		TEST_ORIGIN,
		json!({ "source": "google-id-token", "id_token": "genuine" }),
	);

	let token = handle
		.await
		.expect("Sign-in task should not panic.")
		.expect("Same-origin message should still resolve the attempt.");

	assert_eq!(token, "genuine");
}

#[tokio::test]
async fn unrecognized_and_mismatched_shapes_pass_through_harmlessly() {
	let host = MockHost::new();
	let client = Arc::new(build_test_client(host.clone()));
	let handle = spawn_google_sign_in(&client);
	let _popup = host.wait_for_popup().await;

	// Unrelated postMessage traffic and a message for the other provider.
	host.post_message(TEST_ORIGIN, json!({ "event": "analytics", "name": "page_view" }));
	host.post_message(TEST_ORIGIN, json!({ "source": "apple-id-token", "id_token": "wrong" }));
	host.post_message(TEST_ORIGIN, json!({ "source": "google-id-token", "id_token": "right" }));

	let token = handle
		.await
		.expect("Sign-in task should not panic.")
		.expect("The matching message should resolve the attempt.");

	assert_eq!(token, "right");
}

#[tokio::test]
async fn only_the_first_valid_message_takes_effect() {
	let host = MockHost::new();
	let client = Arc::new(build_test_client(host.clone()));
	let handle = spawn_google_sign_in(&client);
	let popup = host.wait_for_popup().await;

	host.post_message(TEST_ORIGIN, json!({ "source": "google-id-token", "id_token": "first" }));
	host.post_message(TEST_ORIGIN, json!({ "source": "google-id-token", "id_token": "second" }));

	let token = handle
		.await
		.expect("Sign-in task should not panic.")
		.expect("The first valid message should resolve the attempt.");

	assert_eq!(token, "first");
	assert_eq!(popup.close_calls(), 1);
	assert_eq!(client.metrics().successes(), 1);
}

#[tokio::test]
async fn closing_the_popup_rejects_within_one_poll_interval() {
	let host = MockHost::new();
	let client = Arc::new(build_test_client(host.clone()));
	let handle = spawn_google_sign_in(&client);
	let popup = host.wait_for_popup().await;

	settle_first_tick().await;

	let closed_at = Instant::now();

	popup.simulate_user_close();

	let err = handle
		.await
		.expect("Sign-in task should not panic.")
		.expect_err("A closed popup must reject the attempt.");

	assert!(matches!(err, Error::PrematureClose));
	assert!(
		closed_at.elapsed() < StdDuration::from_millis(300),
		"Detection latency must stay within one poll interval.",
	);
	assert_eq!(client.metrics().premature_closes(), 1);
}

#[tokio::test]
async fn blocked_popups_fall_back_to_a_full_page_redirect() {
	let host = MockHost::new();

	host.block_popups();

	let client = Arc::new(build_test_client(host.clone()));
	let err = client.google_sign_in().await.expect_err("Blocked popups must reject.");

	assert!(matches!(err, Error::PopupBlocked));

	let redirects = host.redirects();

	assert_eq!(redirects.len(), 1, "The host page must be redirected to the provider.");
	assert_eq!(redirects[0].host_str(), Some("accounts.google.com"));
	assert_eq!(client.metrics().failures(), 1);
}

#[tokio::test]
async fn backend_envelopes_resolve_without_double_closing_the_popup() {
	let host = MockHost::new();
	let client = Arc::new(
		SignInClient::new(host.clone())
			.with_google(test_provider_config("/auth/callback/google"))
			.with_poll_interval(StdDuration::from_secs(5)),
	);
	let handle = spawn_google_sign_in(&client);
	let popup = host.wait_for_popup().await;

	settle_first_tick().await;

	// The backend-mediated callback page closes its own window after relaying.
	popup.simulate_user_close();
	host.post_message(
		TEST_ORIGIN,
		json!({
			"type": "google-signin-callback",
			"source": "unifyn-login-service",
			"payload": { "id_token": "envl" },
		}),
	);

	let token = handle
		.await
		.expect("Sign-in task should not panic.")
		.expect("Backend envelopes should resolve the attempt.");

	assert_eq!(token, "envl");
	assert_eq!(popup.close_calls(), 0, "An already-closed popup must not be closed again.");
}

#[tokio::test]
async fn matched_messages_without_token_or_error_are_malformed() {
	let host = MockHost::new();
	let client = Arc::new(build_test_client(host.clone()));
	let handle = spawn_google_sign_in(&client);
	let _popup = host.wait_for_popup().await;

	host.post_message(TEST_ORIGIN, json!({ "source": "google-id-token", "state": "s1" }));

	let err = handle
		.await
		.expect("Sign-in task should not panic.")
		.expect_err("A matched message without token or error must reject.");

	assert!(matches!(err, Error::MalformedPayload { source: TokenSource::GoogleIdToken }));
}

#[tokio::test]
async fn apple_popup_sign_in_uses_its_own_discriminators() {
	let host = MockHost::new();
	let client = Arc::new(build_test_client(host.clone()));
	let handle = {
		let client = client.clone();

		tokio::spawn(async move { client.apple_sign_in().await })
	};
	let popup = host.wait_for_popup().await;
	let navigations = popup.navigations();

	assert_eq!(navigations[0].host_str(), Some("appleid.apple.com"));

	host.post_message(TEST_ORIGIN, json!({ "source": "apple-id-token", "id_token": "apl" }));

	let token = handle
		.await
		.expect("Sign-in task should not panic.")
		.expect("Apple sign-in should resolve with the relayed token.");

	assert_eq!(token, "apl");
}

#[tokio::test]
async fn unconfigured_providers_fail_before_any_side_effect() {
	let host = MockHost::new();
	let client = SignInClient::new(host.clone());
	let err = client.apple_sign_in().await.expect_err("Missing configuration must reject.");

	assert!(matches!(
		err,
		Error::Config(ConfigError::MissingProviderConfig { provider: Provider::Apple })
	));
	assert!(host.last_popup().is_none(), "No popup may be opened without configuration.");
	assert!(host.redirects().is_empty(), "No redirect may happen without configuration.");
}
