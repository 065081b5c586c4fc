// self
use crate::{_prelude::*, host::PopupHandle, provider::TokenSource};

/// One in-flight sign-in attempt.
///
/// The attempt exclusively owns its popup handle: no other component may close
/// or navigate the popup while the attempt is alive. The record is dropped when
/// the attempt resolves, rejects, or the popup is detected closed.
pub struct SignInAttempt<P>
where
	P: PopupHandle,
{
	/// Token source the attempt expects its callback message to carry.
	pub expected_source: TokenSource,
	/// Instant the attempt was started.
	pub started_at: OffsetDateTime,
	popup: P,
}
impl<P> SignInAttempt<P>
where
	P: PopupHandle,
{
	/// Binds a freshly opened popup to an attempt.
	pub fn new(expected_source: TokenSource, popup: P) -> Self {
		Self { expected_source, started_at: OffsetDateTime::now_utc(), popup }
	}

	/// Returns the owned popup handle.
	pub fn popup(&self) -> &P {
		&self.popup
	}

	/// Reports whether the popup has been closed.
	pub fn popup_closed(&self) -> bool {
		self.popup.is_closed()
	}

	/// Closes the popup unless it already closed itself.
	///
	/// The backend-mediated callback page closes its own window after relaying,
	/// so the attempt must never double-close; [`PopupHandle::close`] is required
	/// to tolerate the race where the flag flips between check and close.
	pub fn close_popup_if_open(&self) {
		if !self.popup.is_closed() {
			self.popup.close();
		}
	}

	/// Returns how long the attempt has been running.
	pub fn elapsed(&self) -> time::Duration {
		OffsetDateTime::now_utc() - self.started_at
	}
}
impl<P> Debug for SignInAttempt<P>
where
	P: PopupHandle,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignInAttempt")
			.field("expected_source", &self.expected_source)
			.field("started_at", &self.started_at)
			.field("popup_closed", &self.popup.is_closed())
			.finish()
	}
}
