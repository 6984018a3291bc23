use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{Keycode, Keymap, KeymapKey, Keyval, Modifiers};

/// Index from physical key events to opaque values.
///
/// Entries are declared as (keyval, modifiers, value); lookups arrive as
/// (keycode, state, group) and are resolved through the keymap, preferring
/// entries whose keyval matches the translation exactly and falling back to
/// entries sharing the physical position. Resolving keyvals to keycodes is
/// deferred to the first lookup and redone whenever the keymap serial
/// moves, so inserts never touch the keymap.
pub struct KeyHash<V> {
	keymap: Arc<dyn Keymap>,
	entries: FxHashMap<u64, HashEntry<V>>,
	/// Insertion order of live entry ids. Meaningful: the index is rebuilt
	/// by replaying it, and callers tie-break equal candidates by it.
	order: Vec<u64>,
	by_value: FxHashMap<V, u64>,
	next_id: u64,
	index: Option<PositionIndex>,
	indexed_serial: u64,
}

struct HashEntry<V> {
	keyval: Keyval,
	modifiers: Modifiers,
	value: V,
}

/// Keycode-keyed view of the entries, derived from the keymap.
#[derive(Default)]
struct PositionIndex {
	by_code: FxHashMap<Keycode, Vec<u64>>,
	positions: FxHashMap<u64, SmallVec<[KeymapKey; 4]>>,
}

impl PositionIndex {
	fn record(&mut self, id: u64, keyval: Keyval, keymap: &dyn Keymap) {
		let keys = keymap.entries_for_keyval(keyval);
		for key in &keys {
			self.by_code.entry(key.keycode).or_default().push(id);
		}
		self.positions.insert(id, keys);
	}

	fn remove(&mut self, id: u64) {
		if let Some(keys) = self.positions.remove(&id) {
			for key in keys {
				if let Some(ids) = self.by_code.get_mut(&key.keycode) {
					ids.retain(|&other| other != id);
				}
			}
		}
	}
}

impl<V: Clone + Eq + Hash> KeyHash<V> {
	pub fn new(keymap: Arc<dyn Keymap>) -> Self {
		Self {
			keymap,
			entries: FxHashMap::default(),
			order: Vec::new(),
			by_value: FxHashMap::default(),
			next_id: 0,
			index: None,
			indexed_serial: 0,
		}
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	/// Inserts a binding. Shifted combinations are stored under the shifted
	/// symbol (TAB becomes ISO_LEFT_TAB, letters their uppercase form) so
	/// they line up with what translation produces while SHIFT is held.
	/// Values are unique per hash; re-adding a value replaces its entry.
	pub fn add(&mut self, keyval: Keyval, modifiers: Modifiers, value: V) {
		let keyval = if modifiers.contains(Modifiers::SHIFT) {
			if keyval == Keyval::TAB { Keyval::ISO_LEFT_TAB } else { keyval.to_upper() }
		} else {
			keyval
		};

		let id = self.next_id;
		self.next_id += 1;
		if let Some(old) = self.by_value.insert(value.clone(), id) {
			self.unlink(old);
		}
		self.entries.insert(id, HashEntry { keyval, modifiers, value });
		self.order.push(id);
		if let Some(index) = self.index.as_mut() {
			index.record(id, keyval, self.keymap.as_ref());
		}
	}

	/// Removes the entry carrying `value`. Safe to call for values that
	/// were never added or were already removed.
	pub fn remove(&mut self, value: &V) {
		if let Some(id) = self.by_value.remove(value) {
			self.unlink(id);
		}
	}

	fn unlink(&mut self, id: u64) {
		self.entries.remove(&id);
		self.order.retain(|&other| other != id);
		if let Some(index) = self.index.as_mut() {
			index.remove(id);
		}
	}

	/// Resolves a physical event to the values that could apply, most
	/// specific first.
	///
	/// `mask` selects the modifier bits the caller considers significant.
	/// The first exact keyval match discards any fuzzy positional matches;
	/// a fuzzy-only result is discarded wholesale when one of its keyvals
	/// is also reachable in the event's actual group, so the event can fall
	/// through to whoever owns it there. Results are stably sorted by the
	/// number of declared modifier bits, fewest first.
	pub fn lookup(&mut self, keycode: Keycode, state: Modifiers, mask: Modifiers, group: u8) -> Vec<V> {
		let state = state & !Modifiers::LOCK;
		let toggle = self.keymap.group_toggle_mask();

		// When the caller matches on the group toggle and it is held,
		// translate as if it were not: group zero, toggle stripped. The
		// modifier comparison below still sees the raw state, and the
		// fuzzy group check compares against the shifted group.
		let group_shifted = !(mask & state & toggle).is_empty();
		let (tr_state, tr_group) = if group_shifted { (state & !toggle, 0) } else { (state, group) };
		let Some(mut translation) = self.keymap.translate_state(keycode, tr_state, tr_group) else {
			return Vec::new();
		};
		if group_shifted {
			translation.effective_group = 1;
			translation.consumed &= !toggle;
		}
		let toggle_in_mask = mask.intersects(toggle);

		self.ensure_index();
		let Some(index) = self.index.as_ref() else {
			return Vec::new();
		};
		let Some(candidates) = index.by_code.get(&keycode) else {
			return Vec::new();
		};

		let mut results: Vec<u64> = Vec::new();
		let mut have_exact = false;
		for &id in candidates {
			let Some(entry) = self.entries.get(&id) else {
				continue;
			};

			// Virtual super/hyper/meta alias onto hardware slots, so the
			// entry is compared twice, ignoring either family in turn.
			let mut mapped = entry.modifiers;
			if !self.keymap.map_virtual_modifiers(&mut mapped) {
				continue;
			}
			let relevant = !translation.consumed & mask;
			let modifier_match = (mapped & relevant & !Modifiers::VIRTUAL) == (state & relevant & !Modifiers::VIRTUAL)
				|| (mapped & relevant & !Modifiers::HARDWARE) == (state & relevant & !Modifiers::HARDWARE);
			if !modifier_match {
				continue;
			}

			// The toggle-bit comparison keeps an entry declared for the
			// other group from producing a bogus duplicate exact match.
			let exact = entry.keyval == translation.keyval
				&& (!toggle_in_mask || (state & toggle) == (entry.modifiers & toggle));
			if exact {
				if !have_exact {
					results.clear();
				}
				have_exact = true;
				results.push(id);
				continue;
			}

			if !have_exact
				&& let Some(keys) = index.positions.get(&id)
				&& keys.iter().any(|key| {
					key.keycode == keycode
						&& key.level == translation.level
						&& (!toggle_in_mask || key.group == translation.effective_group)
				}) {
				results.push(id);
			}
		}

		if !have_exact && !results.is_empty() {
			let reachable = self.keymap.entries_for_keycode(keycode);
			let steals = reachable.iter().any(|(key, keyval)| {
				key.group == group
					&& key.level <= 1
					&& results.iter().any(|id| self.entries.get(id).is_some_and(|entry| entry.keyval == *keyval))
			});
			if steals {
				return Vec::new();
			}
		}

		results.sort_by_key(|id| self.entries.get(id).map_or(0, |entry| entry.modifiers.bits().count_ones()));
		results
			.into_iter()
			.filter_map(|id| self.entries.get(&id).map(|entry| entry.value.clone()))
			.collect()
	}

	/// Exact (keyval, modifiers) lookup for callers that only have the
	/// logical pair. The keyval's primary keycode narrows the candidate
	/// list; no positional disambiguation happens.
	pub fn lookup_keyval(&mut self, keyval: Keyval, modifiers: Modifiers) -> Vec<V> {
		if keyval.is_none() {
			return Vec::new();
		}
		let keys = self.keymap.entries_for_keyval(keyval);
		let Some(first) = keys.first() else {
			return Vec::new();
		};
		let keycode = first.keycode;

		self.ensure_index();
		let Some(index) = self.index.as_ref() else {
			return Vec::new();
		};
		let Some(candidates) = index.by_code.get(&keycode) else {
			return Vec::new();
		};
		candidates
			.iter()
			.filter_map(|id| self.entries.get(id))
			.filter(|entry| entry.keyval == keyval && entry.modifiers == modifiers)
			.map(|entry| entry.value.clone())
			.collect()
	}

	/// Builds the keycode index if it is missing or stale.
	fn ensure_index(&mut self) {
		let serial = self.keymap.serial();
		if serial != self.indexed_serial {
			self.index = None;
			self.indexed_serial = serial;
		}
		if self.index.is_none() {
			let mut index = PositionIndex::default();
			for &id in &self.order {
				if let Some(entry) = self.entries.get(&id) {
					index.record(id, entry.keyval, self.keymap.as_ref());
				}
			}
			self.index = Some(index);
		}
	}
}
