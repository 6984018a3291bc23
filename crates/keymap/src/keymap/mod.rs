use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{Keycode, KeymapKey, Keyval, Modifiers, Translation};

/// A keyboard layout service.
///
/// Implementations answer positional questions only; they know nothing
/// about bindings. [`KeyHash`](crate::KeyHash) drives all four query
/// methods during lookup.
pub trait Keymap {
	/// Resolves (keycode, state, group) to a symbol, or `None` when the
	/// position is unmapped.
	fn translate_state(&self, keycode: Keycode, state: Modifiers, group: u8) -> Option<Translation>;

	/// Every position producing `keyval`, in layout registration order.
	fn entries_for_keyval(&self, keyval: Keyval) -> SmallVec<[KeymapKey; 4]>;

	/// Every (position, keyval) pair reachable at `keycode` across all
	/// groups and levels.
	fn entries_for_keycode(&self, keycode: Keycode) -> SmallVec<[(KeymapKey, Keyval); 8]>;

	/// Resolves virtual modifier bits to the hardware slots they are bound
	/// to, ORing the real bits into `modifiers`. Returns false when a
	/// virtual bit present in `modifiers` has no hardware binding; callers
	/// skip entries whose modifiers cannot be resolved.
	fn map_virtual_modifiers(&self, modifiers: &mut Modifiers) -> bool;

	/// The modifier bit that shifts to the next keyboard group while held.
	fn group_toggle_mask(&self) -> Modifiers;

	/// Monotonic layout generation. Moves every time the layout changes;
	/// consumers drop position caches built against an older serial.
	fn serial(&self) -> u64;
}

/// Accumulates positions and modifier wiring for a [`StaticKeymap`].
#[derive(Debug, Clone, Default)]
pub struct StaticKeymapBuilder {
	keys: Vec<(KeymapKey, Keyval)>,
	virtual_mods: Vec<(Modifiers, Modifiers)>,
	group_toggle: Option<Modifiers>,
}

impl StaticKeymapBuilder {
	/// Maps the position (keycode, group, level) to `keyval`.
	pub fn key(mut self, keycode: u16, group: u8, level: u8, keyval: Keyval) -> Self {
		self.keys.push((KeymapKey::new(Keycode(keycode), group, level), keyval));
		self
	}

	/// Binds a virtual modifier bit to the hardware slots backing it.
	pub fn virtual_modifier(mut self, virtual_bit: Modifiers, real: Modifiers) -> Self {
		self.virtual_mods.push((virtual_bit, real));
		self
	}

	/// Overrides the group-toggle modifier. Defaults to [`Modifiers::MOD5`].
	pub fn group_toggle(mut self, mask: Modifiers) -> Self {
		self.group_toggle = Some(mask);
		self
	}

	pub fn build(self) -> StaticKeymap {
		StaticKeymap {
			layout: ArcSwap::from_pointee(Layout::build(self)),
			serial: AtomicU64::new(1),
		}
	}
}

/// A table-driven [`Keymap`] for embedders and tests.
///
/// The layout lives behind an [`ArcSwap`], so [`reload`](Self::reload)
/// replaces it wholesale and bumps the serial; in-flight queries keep the
/// snapshot they loaded.
///
/// Translation semantics: a held group toggle advances the group by one,
/// wrapping over the groups the keycode defines, and counts as consumed
/// when the keycode has more than one group; a held SHIFT selects level 1
/// where one exists and is consumed by doing so. The LOCK bit is ignored
/// entirely.
pub struct StaticKeymap {
	layout: ArcSwap<Layout>,
	serial: AtomicU64,
}

impl StaticKeymap {
	pub fn builder() -> StaticKeymapBuilder {
		StaticKeymapBuilder::default()
	}

	/// Replaces the whole layout and moves the serial forward.
	pub fn reload(&self, builder: StaticKeymapBuilder) {
		self.layout.store(Arc::new(Layout::build(builder)));
		self.serial.fetch_add(1, Ordering::Relaxed);
	}
}

impl Keymap for StaticKeymap {
	fn translate_state(&self, keycode: Keycode, state: Modifiers, group: u8) -> Option<Translation> {
		let layout = self.layout.load();
		let code = layout.by_code.get(&keycode)?;
		let n_groups = code.groups.len() as u8;
		if n_groups == 0 {
			return None;
		}

		let mut consumed = Modifiers::empty();
		let mut effective_group = group;
		if state.intersects(layout.group_toggle) {
			effective_group += 1;
			if n_groups > 1 {
				consumed |= layout.group_toggle & state;
			}
		}
		effective_group %= n_groups;

		let levels = &code.groups[effective_group as usize];
		let mut level = 0u8;
		if state.contains(Modifiers::SHIFT) && levels.len() > 1 {
			level = 1;
			consumed |= Modifiers::SHIFT;
		}

		let keyval = *levels.get(level as usize)?;
		if keyval.is_none() {
			return None;
		}
		Some(Translation { keyval, effective_group, level, consumed })
	}

	fn entries_for_keyval(&self, keyval: Keyval) -> SmallVec<[KeymapKey; 4]> {
		self.layout.load().by_keyval.get(&keyval).cloned().unwrap_or_default()
	}

	fn entries_for_keycode(&self, keycode: Keycode) -> SmallVec<[(KeymapKey, Keyval); 8]> {
		let layout = self.layout.load();
		let mut out = SmallVec::new();
		let Some(code) = layout.by_code.get(&keycode) else {
			return out;
		};
		for (group, levels) in code.groups.iter().enumerate() {
			for (level, &keyval) in levels.iter().enumerate() {
				if !keyval.is_none() {
					out.push((KeymapKey::new(keycode, group as u8, level as u8), keyval));
				}
			}
		}
		out
	}

	fn map_virtual_modifiers(&self, modifiers: &mut Modifiers) -> bool {
		let layout = self.layout.load();
		let mut unresolved = *modifiers & Modifiers::VIRTUAL;
		let mut real = Modifiers::empty();
		for &(virtual_bit, hardware) in &layout.virtual_mods {
			if modifiers.intersects(virtual_bit) {
				real |= hardware;
				unresolved &= !virtual_bit;
			}
		}
		if !unresolved.is_empty() {
			return false;
		}
		*modifiers |= real;
		true
	}

	fn group_toggle_mask(&self) -> Modifiers {
		self.layout.load().group_toggle
	}

	fn serial(&self) -> u64 {
		self.serial.load(Ordering::Relaxed)
	}
}

/// Immutable resolved form of a builder.
struct Layout {
	by_code: FxHashMap<Keycode, CodeEntry>,
	by_keyval: FxHashMap<Keyval, SmallVec<[KeymapKey; 4]>>,
	virtual_mods: Vec<(Modifiers, Modifiers)>,
	group_toggle: Modifiers,
}

/// Symbols for one keycode: `groups[group][level]`, ragged, holes are
/// [`Keyval::NONE`].
#[derive(Default)]
struct CodeEntry {
	groups: SmallVec<[SmallVec<[Keyval; 2]>; 2]>,
}

impl Layout {
	fn build(builder: StaticKeymapBuilder) -> Self {
		let mut by_code: FxHashMap<Keycode, CodeEntry> = FxHashMap::default();
		let mut by_keyval: FxHashMap<Keyval, SmallVec<[KeymapKey; 4]>> = FxHashMap::default();

		for (key, keyval) in builder.keys {
			let code = by_code.entry(key.keycode).or_default();
			if code.groups.len() <= key.group as usize {
				code.groups.resize(key.group as usize + 1, SmallVec::new());
			}
			let levels = &mut code.groups[key.group as usize];
			if levels.len() <= key.level as usize {
				levels.resize(key.level as usize + 1, Keyval::NONE);
			}
			levels[key.level as usize] = keyval;
			by_keyval.entry(keyval).or_default().push(key);
		}

		Self {
			by_code,
			by_keyval,
			virtual_mods: builder.virtual_mods,
			group_toggle: builder.group_toggle.unwrap_or(Modifiers::MOD5),
		}
	}
}

#[cfg(test)]
mod tests;
