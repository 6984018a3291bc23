use crate::{Keyval, Modifiers};

/// A hardware key position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keycode(pub u16);

/// One position at which a keyval lives in a layout: hardware keycode plus
/// the group and shift level selecting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeymapKey {
	pub keycode: Keycode,
	pub group: u8,
	pub level: u8,
}

impl KeymapKey {
	pub const fn new(keycode: Keycode, group: u8, level: u8) -> Self {
		Self { keycode, group, level }
	}
}

/// A raw key event as the windowing layer delivers it. `keyval` is the
/// symbol the platform already resolved for the event; positional lookup
/// re-translates from `keycode` and ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
	pub keycode: Keycode,
	pub state: Modifiers,
	pub group: u8,
	pub keyval: Keyval,
	pub is_release: bool,
}

impl KeyEvent {
	pub const fn press(keycode: Keycode, state: Modifiers, group: u8, keyval: Keyval) -> Self {
		Self { keycode, state, group, keyval, is_release: false }
	}

	pub const fn release(keycode: Keycode, state: Modifiers, group: u8, keyval: Keyval) -> Self {
		Self { keycode, state, group, keyval, is_release: true }
	}
}

/// Result of feeding (keycode, state, group) through a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
	/// The resolved symbol.
	pub keyval: Keyval,
	/// The group the resolution actually used after wrapping.
	pub effective_group: u8,
	/// The shift level the resolution actually used.
	pub level: u8,
	/// State bits the translation consumed to select the symbol. A consumed
	/// bit no longer distinguishes accelerators for this event.
	pub consumed: Modifiers,
}
