//! Key event vocabulary and positional resolution.
//!
//! The crate supplies the pieces an input dispatcher needs before any
//! binding semantics enter the picture: [`Keyval`] symbols, [`Modifiers`]
//! masks, the [`Keymap`] layout abstraction with a table-driven
//! [`StaticKeymap`] implementation, the [`KeyHash`] index that turns raw
//! (keycode, state, group) events into logical values with exact-match
//! preference and fuzzy positional fallback, and [`Accel`] string parsing.

mod accel;
mod key_hash;
mod keymap;
mod keyval;
mod modifiers;
mod types;

pub use accel::{Accel, AccelParseError};
pub use key_hash::KeyHash;
pub use keymap::{Keymap, StaticKeymap, StaticKeymapBuilder};
pub use keyval::Keyval;
pub use modifiers::Modifiers;
pub use types::{KeyEvent, Keycode, KeymapKey, Translation};
