// self
use crate::_prelude::*;

/// Maximum popup width in CSS pixels.
pub const MAX_POPUP_WIDTH: u32 = 480;
/// Maximum popup height in CSS pixels.
pub const MAX_POPUP_HEIGHT: u32 = 700;

/// Opener viewport dimensions plus dual-screen offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
	/// Inner width of the opener window.
	pub inner_width: u32,
	/// Inner height of the opener window.
	pub inner_height: u32,
	/// Horizontal screen offset (`screenLeft`) of the opener.
	pub screen_left: i32,
	/// Vertical screen offset (`screenTop`) of the opener.
	pub screen_top: i32,
}
impl Viewport {
	/// Creates a viewport description.
	pub const fn new(inner_width: u32, inner_height: u32, screen_left: i32, screen_top: i32) -> Self {
		Self { inner_width, inner_height, screen_left, screen_top }
	}
}

/// Computed popup window features.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PopupFeatures {
	/// Popup width.
	pub width: u32,
	/// Popup height.
	pub height: u32,
	/// Absolute left position.
	pub left: i32,
	/// Absolute top position.
	pub top: i32,
}
impl PopupFeatures {
	/// Computes popup features centered on the opener.
	///
	/// Dimensions are capped at 480x700 and scaled to 90% of the viewport when it
	/// is smaller, then centered relative to the opener including its screen
	/// offsets.
	pub fn centered(viewport: &Viewport) -> Self {
		let width = MAX_POPUP_WIDTH.min(viewport.inner_width * 9 / 10);
		let height = MAX_POPUP_HEIGHT.min(viewport.inner_height * 9 / 10);
		let left = (viewport.inner_width / 2) as i32 - (width / 2) as i32 + viewport.screen_left;
		let top = (viewport.inner_height / 2) as i32 - (height / 2) as i32 + viewport.screen_top;

		Self { width, height, left, top }
	}

	/// Renders the `window.open` feature string for these dimensions.
	pub fn feature_string(&self) -> String {
		format!(
			"scrollbars=yes, width={}, height={}, top={}, left={}",
			self.width, self.height, self.top, self.left
		)
	}
}
impl Display for PopupFeatures {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.feature_string())
	}
}
