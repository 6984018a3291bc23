use std::fmt;
use std::str::FromStr;

use crate::{Keyval, Modifiers};

/// A parsed accelerator: one keyval plus the modifier bits required with
/// it.
///
/// The textual form is lowercase dash-joined tokens, modifiers first:
/// `ctrl-shift-left`, `release-escape`, `alt-f4`. The final token is a key
/// name or a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Accel {
	pub keyval: Keyval,
	pub modifiers: Modifiers,
}

/// Accelerator syntax error, reported at a byte offset into the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {position}")]
pub struct AccelParseError {
	pub message: String,
	pub position: usize,
}

const MODIFIER_TOKENS: &[(Modifiers, &str)] = &[
	(Modifiers::RELEASE, "release"),
	(Modifiers::CONTROL, "ctrl"),
	(Modifiers::MOD1, "alt"),
	(Modifiers::SHIFT, "shift"),
	(Modifiers::SUPER, "super"),
	(Modifiers::HYPER, "hyper"),
	(Modifiers::META, "meta"),
	(Modifiers::MOD2, "mod2"),
	(Modifiers::MOD3, "mod3"),
	(Modifiers::MOD4, "mod4"),
	(Modifiers::MOD5, "mod5"),
	(Modifiers::LOCK, "lock"),
];

fn modifier_token(token: &str) -> Option<Modifiers> {
	MODIFIER_TOKENS.iter().find(|(_, name)| *name == token).map(|&(bit, _)| bit)
}

impl Accel {
	pub const fn new(keyval: Keyval, modifiers: Modifiers) -> Self {
		Self { keyval, modifiers }
	}

	pub fn parse(input: &str) -> Result<Self, AccelParseError> {
		let mut modifiers = Modifiers::empty();
		let mut position = 0usize;

		// Consume `token-` prefixes while the token names a modifier and
		// something follows the dash; the remainder is the key itself, so
		// `shift--` binds shift with the minus key.
		loop {
			let rest = &input[position..];
			if let Some(dash) = rest.find('-')
				&& dash > 0
				&& dash + 1 < rest.len()
				&& let Some(bit) = modifier_token(&rest[..dash])
			{
				modifiers |= bit;
				position += dash + 1;
				continue;
			}
			break;
		}

		let key = &input[position..];
		if key.is_empty() {
			return Err(AccelParseError { message: "missing key name".into(), position });
		}
		let Some(keyval) = Keyval::from_name(key) else {
			return Err(AccelParseError { message: format!("unknown key name {key:?}"), position });
		};
		Ok(Self { keyval, modifiers })
	}
}

impl FromStr for Accel {
	type Err = AccelParseError;

	fn from_str(input: &str) -> Result<Self, Self::Err> {
		Self::parse(input)
	}
}

impl fmt::Display for Accel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for &(bit, name) in MODIFIER_TOKENS {
			if self.modifiers.contains(bit) {
				write!(f, "{name}-")?;
			}
		}
		write!(f, "{}", self.keyval)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_modifier_chains() {
		let accel = Accel::parse("ctrl-shift-left").expect("valid accel");
		assert_eq!(accel.keyval, Keyval::LEFT);
		assert_eq!(accel.modifiers, Modifiers::CONTROL | Modifiers::SHIFT);

		let accel = Accel::parse("release-escape").expect("valid accel");
		assert_eq!(accel.keyval, Keyval::ESCAPE);
		assert_eq!(accel.modifiers, Modifiers::RELEASE);

		let plain = Accel::parse("f5").expect("valid accel");
		assert_eq!(plain.keyval, Keyval::F5);
		assert!(plain.modifiers.is_empty());
	}

	#[test]
	fn dash_key_needs_no_escaping() {
		let accel = Accel::parse("shift--").expect("valid accel");
		assert_eq!(accel.keyval, Keyval::from_char('-'));
		assert_eq!(accel.modifiers, Modifiers::SHIFT);

		let bare = Accel::parse("-").expect("valid accel");
		assert_eq!(bare.keyval, Keyval::from_char('-'));
	}

	#[test]
	fn rejects_unknown_names_with_offset() {
		let err = Accel::parse("ctrl-nosuch").expect_err("invalid key");
		assert_eq!(err.position, 5);
		assert!(err.message.contains("nosuch"));

		let err = Accel::parse("").expect_err("empty input");
		assert_eq!(err.position, 0);
	}

	#[test]
	fn display_round_trips() {
		for text in ["ctrl-shift-left", "release-ctrl-q", "alt-f4", "escape", "super-space"] {
			let accel: Accel = text.parse().expect("valid accel");
			assert_eq!(accel.to_string(), text);
			assert_eq!(Accel::parse(&accel.to_string()), Ok(accel));
		}
	}
}
