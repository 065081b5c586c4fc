//! Optional observability helpers for sign-in flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `popup_oauth.flow` with the `flow` (sign-in
//!   path) and `stage` (call site) fields, plus debug/warn events from the coordinator and
//!   reconciler.
//! - Enable `metrics` to increment the `popup_oauth_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Sign-in flow kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Google popup sign-in.
	GoogleSignIn,
	/// Apple popup sign-in.
	AppleSignIn,
	/// Apple vendor-SDK sign-in.
	AppleSdk,
	/// Backend identity-token exchange.
	TokenExchange,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::GoogleSignIn => "google_sign_in",
			FlowKind::AppleSignIn => "apple_sign_in",
			FlowKind::AppleSdk => "apple_sdk",
			FlowKind::TokenExchange => "token_exchange",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a sign-in helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
