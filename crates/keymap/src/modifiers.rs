bitflags::bitflags! {
	/// Modifier state bits, laid out the way X11-style keymaps report them.
	///
	/// `MOD1`..`MOD5` are raw hardware modifier slots whose meaning depends
	/// on the layout; `SUPER`, `HYPER` and `META` are virtual bits a keymap
	/// resolves onto those slots via [`Keymap::map_virtual_modifiers`].
	///
	/// [`Keymap::map_virtual_modifiers`]: crate::Keymap::map_virtual_modifiers
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct Modifiers: u32 {
		/// Shift keys.
		const SHIFT = 1 << 0;
		/// Caps lock. Stripped before any binding comparison.
		const LOCK = 1 << 1;
		/// Control keys.
		const CONTROL = 1 << 2;
		/// First hardware slot, alt on common layouts.
		const MOD1 = 1 << 3;
		/// Second hardware slot, num lock on common layouts.
		const MOD2 = 1 << 4;
		/// Third hardware slot.
		const MOD3 = 1 << 5;
		/// Fourth hardware slot.
		const MOD4 = 1 << 6;
		/// Fifth hardware slot, often the group toggle.
		const MOD5 = 1 << 7;
		/// Virtual super.
		const SUPER = 1 << 26;
		/// Virtual hyper.
		const HYPER = 1 << 27;
		/// Virtual meta.
		const META = 1 << 28;
		/// Marks key-release accelerators so they never collide with the
		/// press form of the same combination.
		const RELEASE = 1 << 30;
	}
}

impl Modifiers {
	/// Bits an accelerator comparison considers by default.
	pub const DEFAULT_MASK: Self = Self::SHIFT
		.union(Self::CONTROL)
		.union(Self::MOD1)
		.union(Self::SUPER)
		.union(Self::HYPER)
		.union(Self::META);

	/// The virtual family ignored by one arm of the double comparison.
	pub const VIRTUAL: Self = Self::SUPER.union(Self::HYPER).union(Self::META);

	/// The hardware family ignored by the other arm. Virtual modifiers
	/// alias onto these slots, so a state carrying either form must match.
	pub const HARDWARE: Self = Self::MOD2.union(Self::MOD3).union(Self::MOD4).union(Self::MOD5);
}

#[cfg(feature = "serde")]
impl serde::Serialize for Modifiers {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.bits().serialize(serializer)
	}
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Modifiers {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		u32::deserialize(deserializer).map(Self::from_bits_retain)
	}
}
