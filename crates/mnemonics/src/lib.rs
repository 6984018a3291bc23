//! Mnemonic key registration and round-robin activation.
//!
//! A mnemonic maps a single keyval to the widgets it should activate
//! directly, the way underlined menu labels do. [`MnemonicHash`] keeps the
//! keyval to target lists and cycles through overloaded registrations;
//! [`MnemonicKeys`] layers positional event resolution on top, so a
//! mnemonic declared for a symbol fires from whatever physical key
//! produces it under the active layout.

mod hash;
mod keys;

pub use hash::MnemonicHash;
pub use keys::MnemonicKeys;

/// A widget-side mnemonic candidate.
///
/// The three predicates gate activation: only sensitive, mapped and
/// viewable targets are considered live. Implementations are expected to
/// be cheap-clone handles with identity equality, since duplicate
/// detection compares registered targets with `==`.
pub trait MnemonicTarget {
	/// Whether the target currently accepts input.
	fn is_sensitive(&self) -> bool;

	/// Whether the target is realized on screen.
	fn is_mapped(&self) -> bool;

	/// Whether the target and all of its ancestors are visible.
	fn is_viewable(&self) -> bool;

	/// Activates the target. `cycling` is true when another live target
	/// shares the keyval, letting the implementation select instead of
	/// fully activating. Returns whether the activation was handled.
	fn mnemonic_activate(&self, cycling: bool) -> bool;
}
