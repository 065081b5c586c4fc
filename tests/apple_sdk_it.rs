#![cfg(feature = "test")]

// crates.io
use serde_json::json;
// self
use popup_oauth::{
	_preludet::*,
	error::SdkError,
	sdk::{AppleSdkAdapter, AppleSdkConfig},
};

fn popup_config() -> AppleSdkConfig {
	AppleSdkConfig::popup(&test_provider_config("/auth/callback/apple"))
}

#[tokio::test]
async fn sdk_sign_in_extracts_the_identity_token() {
	let sdk = MockAppleSdk::new(json!({ "authorization": { "id_token": "eyAB", "code": "c1" } }));
	let host = MockScriptHost::new(Some(sdk.clone()));
	let adapter = AppleSdkAdapter::new(host.clone(), popup_config());
	let token = adapter.sign_in().await.expect("SDK sign-in should resolve with the token.");

	assert_eq!(token, "eyAB");
	assert_eq!(host.load_calls(), 1);
	assert_eq!(sdk.init_calls(), 1);
	assert_eq!(sdk.sign_in_calls(), 1);
}

#[tokio::test]
async fn concurrent_sign_ins_share_one_load_and_one_init() {
	let sdk = MockAppleSdk::new(json!({ "authorization": { "id_token": "eyAB" } }));
	let host = MockScriptHost::new(Some(sdk.clone()));
	let adapter = Arc::new(AppleSdkAdapter::new(host.clone(), popup_config()));
	let tasks: Vec<_> = (0..8)
		.map(|_| {
			let adapter = adapter.clone();

			tokio::spawn(async move { adapter.sign_in().await })
		})
		.collect();

	for task in tasks {
		let token = task
			.await
			.expect("SDK sign-in task should not panic.")
			.expect("Every concurrent sign-in should resolve.");

		assert_eq!(token, "eyAB");
	}

	assert_eq!(host.load_calls(), 1, "The script must be injected exactly once.");
	assert_eq!(sdk.init_calls(), 1, "Initialization must run at most once.");
	assert_eq!(sdk.sign_in_calls(), 8);
}

#[tokio::test]
async fn repeat_sign_ins_reuse_the_initialized_sdk() {
	let sdk = MockAppleSdk::new(json!({ "authorization": { "id_token": "eyAB" } }));
	let host = MockScriptHost::new(Some(sdk.clone()));
	let adapter = AppleSdkAdapter::new(host.clone(), popup_config());

	for _ in 0..3 {
		adapter.sign_in().await.expect("Repeated sign-ins should resolve.");
	}

	assert_eq!(host.load_calls(), 1);
	assert_eq!(sdk.init_calls(), 1);
}

#[tokio::test]
async fn script_load_failures_surface_and_do_not_cache_a_rejection() {
	let sdk = MockAppleSdk::new(json!({ "authorization": { "id_token": "eyAB" } }));
	let host = MockScriptHost::new(Some(sdk));
	let adapter = AppleSdkAdapter::new(host.clone(), popup_config());

	host.fail_load();

	let err = adapter.sign_in().await.expect_err("A failed script load must reject.");

	assert!(matches!(err, SdkError::ScriptLoad { .. }));

	// The adapter stays unready, so recovery is a fresh load rather than a
	// replayed rejection.
	assert_eq!(host.load_calls(), 1);
}

#[tokio::test]
async fn absent_vendor_global_maps_to_unavailable() {
	let host = MockScriptHost::new(None);
	let adapter = AppleSdkAdapter::new(host, popup_config());
	let err = adapter.sign_in().await.expect_err("A missing vendor global must reject.");

	assert!(matches!(err, SdkError::Unavailable));
}

#[tokio::test]
async fn responses_without_a_token_map_to_missing_token() {
	let sdk = MockAppleSdk::new(json!({ "authorization": { "code": "c1" } }));
	let host = MockScriptHost::new(Some(sdk));
	let adapter = AppleSdkAdapter::new(host, popup_config());
	let err = adapter.sign_in().await.expect_err("A token-less response must reject.");

	assert!(matches!(err, SdkError::MissingToken));
}

#[tokio::test]
async fn init_failures_surface_to_the_caller() {
	let sdk = MockAppleSdk::new(json!({ "authorization": { "id_token": "eyAB" } }));

	sdk.fail_init();

	let host = MockScriptHost::new(Some(sdk));
	let adapter = AppleSdkAdapter::new(host, popup_config());
	let err = adapter.sign_in().await.expect_err("A failed initialization must reject.");

	assert!(matches!(err, SdkError::Init { .. }));
}
