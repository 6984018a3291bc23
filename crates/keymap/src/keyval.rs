use std::fmt;

/// A logical key symbol in the X11 keysym value space.
///
/// Latin-1 printable characters are their own codepoint, other Unicode
/// characters are `codepoint | 0x0100_0000`, and function keys use the
/// dedicated constants below. The zero value means "no key".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyval(u32);

/// Offset applied to non-Latin-1 Unicode codepoints.
const UNICODE_OFFSET: u32 = 0x0100_0000;

impl Keyval {
	pub const NONE: Self = Self(0);
	pub const SPACE: Self = Self(0x20);
	pub const ISO_LEFT_TAB: Self = Self(0xfe20);
	pub const BACKSPACE: Self = Self(0xff08);
	pub const TAB: Self = Self(0xff09);
	pub const RETURN: Self = Self(0xff0d);
	pub const ESCAPE: Self = Self(0xff1b);
	pub const HOME: Self = Self(0xff50);
	pub const LEFT: Self = Self(0xff51);
	pub const UP: Self = Self(0xff52);
	pub const RIGHT: Self = Self(0xff53);
	pub const DOWN: Self = Self(0xff54);
	pub const PAGE_UP: Self = Self(0xff55);
	pub const PAGE_DOWN: Self = Self(0xff56);
	pub const END: Self = Self(0xff57);
	pub const INSERT: Self = Self(0xff63);
	pub const KP_ENTER: Self = Self(0xff8d);
	pub const F1: Self = Self(0xffbe);
	pub const F2: Self = Self(0xffbf);
	pub const F3: Self = Self(0xffc0);
	pub const F4: Self = Self(0xffc1);
	pub const F5: Self = Self(0xffc2);
	pub const F6: Self = Self(0xffc3);
	pub const F7: Self = Self(0xffc4);
	pub const F8: Self = Self(0xffc5);
	pub const F9: Self = Self(0xffc6);
	pub const F10: Self = Self(0xffc7);
	pub const F11: Self = Self(0xffc8);
	pub const F12: Self = Self(0xffc9);
	pub const DELETE: Self = Self(0xffff);
	pub const VOID: Self = Self(0xffffff);

	pub const fn from_raw(raw: u32) -> Self {
		Self(raw)
	}

	pub const fn raw(self) -> u32 {
		self.0
	}

	pub const fn is_none(self) -> bool {
		self.0 == 0
	}

	/// The keyval carrying this character.
	pub const fn from_char(ch: char) -> Self {
		let cp = ch as u32;
		if cp >= 0x20 && cp <= 0xff {
			Self(cp)
		} else {
			Self(cp | UNICODE_OFFSET)
		}
	}

	/// The character this keyval carries, if it is a character keyval.
	pub const fn to_char(self) -> Option<char> {
		if self.0 >= 0x20 && self.0 <= 0xff {
			char::from_u32(self.0)
		} else if self.0 & UNICODE_OFFSET != 0 {
			char::from_u32(self.0 & !UNICODE_OFFSET)
		} else {
			None
		}
	}

	/// Lowercased form. Covers ASCII and the Latin-1 letter block, which is
	/// what entry registration normalizes through; other keyvals pass
	/// through unchanged.
	pub const fn to_lower(self) -> Self {
		match self.0 {
			// A-Z
			0x41..=0x5a => Self(self.0 + 0x20),
			// Agrave..THORN, skipping the multiplication sign
			0xc0..=0xde if self.0 != 0xd7 => Self(self.0 + 0x20),
			_ => self,
		}
	}

	/// Uppercased form, the inverse of [`to_lower`](Self::to_lower).
	pub const fn to_upper(self) -> Self {
		match self.0 {
			// a-z
			0x61..=0x7a => Self(self.0 - 0x20),
			// agrave..thorn, skipping the division sign
			0xe0..=0xfe if self.0 != 0xf7 => Self(self.0 - 0x20),
			_ => self,
		}
	}

	/// Whether this keyval is itself a modifier key. Modifier presses are
	/// state transitions, not bindable keys.
	pub const fn is_modifier(self) -> bool {
		matches!(self.0, 0xffe1..=0xffee | 0xfe03)
	}

	/// Parses a key name as used in accelerator strings: one of the named
	/// function keys or a single printable character.
	pub fn from_name(name: &str) -> Option<Self> {
		let named = match name {
			"space" => Self::SPACE,
			"backspace" => Self::BACKSPACE,
			"tab" => Self::TAB,
			"iso-left-tab" => Self::ISO_LEFT_TAB,
			"return" | "enter" => Self::RETURN,
			"escape" | "esc" => Self::ESCAPE,
			"home" => Self::HOME,
			"left" => Self::LEFT,
			"up" => Self::UP,
			"right" => Self::RIGHT,
			"down" => Self::DOWN,
			"pageup" => Self::PAGE_UP,
			"pagedown" => Self::PAGE_DOWN,
			"end" => Self::END,
			"insert" => Self::INSERT,
			"kp-enter" => Self::KP_ENTER,
			"delete" | "del" => Self::DELETE,
			_ => {
				if let Some(n) = name.strip_prefix('f')
					&& let Ok(n) = n.parse::<u32>()
					&& (1..=12).contains(&n)
				{
					return Some(Self(Self::F1.0 + n - 1));
				}
				let mut chars = name.chars();
				let ch = chars.next()?;
				if chars.next().is_some() {
					return None;
				}
				return Some(Self::from_char(ch));
			}
		};
		Some(named)
	}

	/// Canonical name for the named keys, `None` for everything else.
	pub fn name(self) -> Option<&'static str> {
		let name = match self {
			Self::SPACE => "space",
			Self::BACKSPACE => "backspace",
			Self::TAB => "tab",
			Self::ISO_LEFT_TAB => "iso-left-tab",
			Self::RETURN => "return",
			Self::ESCAPE => "escape",
			Self::HOME => "home",
			Self::LEFT => "left",
			Self::UP => "up",
			Self::RIGHT => "right",
			Self::DOWN => "down",
			Self::PAGE_UP => "pageup",
			Self::PAGE_DOWN => "pagedown",
			Self::END => "end",
			Self::INSERT => "insert",
			Self::KP_ENTER => "kp-enter",
			Self::DELETE => "delete",
			Self(raw @ 0xffbe..=0xffc9) => {
				const F_NAMES: [&str; 12] = ["f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12"];
				F_NAMES[(raw - 0xffbe) as usize]
			}
			_ => return None,
		};
		Some(name)
	}
}

impl fmt::Display for Keyval {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(name) = self.name() {
			f.write_str(name)
		} else if let Some(ch) = self.to_char() {
			write!(f, "{ch}")
		} else {
			write!(f, "0x{:x}", self.0)
		}
	}
}

impl From<char> for Keyval {
	fn from(ch: char) -> Self {
		Self::from_char(ch)
	}
}
