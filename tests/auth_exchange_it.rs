#![cfg(all(feature = "reqwest", feature = "test"))]

// crates.io
use httpmock::prelude::*;
// self
use popup_oauth::{_preludet::*, api::LoginApiClient, error::ApiError};

fn client(server: &MockServer) -> LoginApiClient {
	LoginApiClient::new(
		Url::parse(&server.url("/api/")).expect("Mock base URL should parse successfully."),
	)
}

#[tokio::test]
async fn google_exchange_unwraps_the_session_payload() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/auth/google")
				.header("content-type", "application/json")
				.json_body(serde_json::json!({ "token": "eyAB" }));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{ "s": "ok", "d": { "session": "c0ffee" } }"#);
		})
		.await;
	let payload = client(&server)
		.auth_with_google("eyAB", None)
		.await
		.expect("Exchange should unwrap the session payload.");

	mock.assert_async().await;

	assert_eq!(payload["session"], "c0ffee");
}

#[tokio::test]
async fn apple_exchange_forwards_the_optional_mobile_number() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/auth/apple")
				.json_body(serde_json::json!({ "token": "eyAB", "mobile": "+15550100" }));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{ "s": "ok", "d": {} }"#);
		})
		.await;

	client(&server)
		.auth_with_apple("eyAB", Some("+15550100"))
		.await
		.expect("Exchange should accept an empty payload object.");

	mock.assert_async().await;
}

#[tokio::test]
async fn error_envelopes_reject_with_the_service_reason() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/google");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{ "s": "error", "d": { "message": "Token expired." } }"#);
		})
		.await;
	let err = client(&server)
		.auth_with_google("stale", None)
		.await
		.expect_err("Error envelopes must reject.");

	assert!(matches!(err, ApiError::Rejected { ref reason } if reason == "Token expired."));
}

#[tokio::test]
async fn non_success_statuses_surface_with_the_body_message() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/google");
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{ "s": "error", "d": { "message": "Invalid token." } }"#);
		})
		.await;
	let err = client(&server)
		.auth_with_google("bad", None)
		.await
		.expect_err("Non-success statuses must reject.");

	assert!(matches!(
		err,
		ApiError::Status { status: 401, message: Some(ref message) } if message == "Invalid token."
	));
}

#[tokio::test]
async fn malformed_bodies_reject_with_a_parse_error() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/google");
			then.status(200).header("content-type", "text/html").body("<html>gateway</html>");
		})
		.await;
	let err = client(&server)
		.auth_with_google("eyAB", None)
		.await
		.expect_err("Malformed bodies must reject.");

	assert!(matches!(err, ApiError::Parse { .. }));
}
