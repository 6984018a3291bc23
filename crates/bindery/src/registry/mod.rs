use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::Arc;

use bindery_keymap::{KeyHash, Keycode, Keymap, Keyval, Modifiers};
use bindery_object::Class;
use globset::Glob;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::BINDING_MASK;
use crate::entry::{BindingEntry, EntryRef};
use crate::invocation::Invocation;
use crate::set::{BindingSet, PATTERN_SEQ_MASK, PathPattern, PathPriority, PathType};


#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	#[error("binding set {name:?} already exists")]
	DuplicateSet { name: Arc<str> },
}

/// All binding state for one keymap: the named sets, the chord-keyed
/// entry index shared across sets, and the positional key hash that
/// resolves raw events.
///
/// The registry is single-threaded and uses interior mutability
/// throughout, because activation handlers routinely re-enter it to
/// rebind or unbind entries. Every traversal that can reach a handler
/// works from snapshots, never from a held borrow.
pub struct BindingRegistry {
	keymap: Arc<dyn Keymap>,
	sets: RefCell<Vec<BindingSet>>,
	/// Chord index: normalized (keyval, modifiers) to every entry bound
	/// to it, one per set.
	by_key: RefCell<FxHashMap<(Keyval, Modifiers), Vec<EntryRef>>>,
	/// Positional index over the same entries, release bit stripped.
	key_hash: RefCell<KeyHash<EntryRef>>,
	/// Monotonic pattern registration counter, the tie-break within a
	/// priority level.
	pattern_seq: Cell<u32>,
}

impl BindingRegistry {
	pub fn new(keymap: Arc<dyn Keymap>) -> Self {
		let key_hash = KeyHash::new(keymap.clone());
		Self {
			keymap,
			sets: RefCell::new(Vec::new()),
			by_key: RefCell::new(FxHashMap::default()),
			key_hash: RefCell::new(key_hash),
			pattern_seq: Cell::new(0),
		}
	}

	pub fn keymap(&self) -> &Arc<dyn Keymap> {
		&self.keymap
	}

	/// Creates a named set. Names are unique per registry; embedders that
	/// want find-or-create semantics go through [`set_by_class`] or the
	/// configuration parser instead.
	///
	/// [`set_by_class`]: Self::set_by_class
	pub fn create_set(&self, name: &str) -> Result<BindingSet, RegistryError> {
		if self.find_set(name).is_some() {
			return Err(RegistryError::DuplicateSet { name: Arc::from(name) });
		}
		let set = BindingSet::new(name);
		self.sets.borrow_mut().push(set.clone());
		Ok(set)
	}

	pub fn find_set(&self, name: &str) -> Option<BindingSet> {
		self.sets.borrow().iter().find(|set| set.name() == name).cloned()
	}

	/// The per-class set, created on first use with a class pattern for
	/// the class name at toolkit priority, so class-level bindings apply
	/// to instances without further registration.
	pub fn set_by_class(&self, class: &Class) -> BindingSet {
		if let Some(set) = self.find_set(class.name()) {
			return set;
		}
		let set = BindingSet::new(class.name());
		self.sets.borrow_mut().push(set.clone());
		self.add_path(&set, PathType::Class, class.name(), PathPriority::TOOLKIT);
		set
	}

	/// Find-or-create for the configuration parser; only sets created
	/// here carry the parsed flag.
	pub(crate) fn config_set(&self, name: &str) -> BindingSet {
		if let Some(set) = self.find_set(name) {
			return set;
		}
		let set = BindingSet::new(name);
		set.mark_parsed();
		self.sets.borrow_mut().push(set.clone());
		set
	}

	/// Destroys every parsed set and all of its entries, the reload hook
	/// for configuration-driven bindings. Programmatic sets survive.
	pub fn reset_parsed(&self) {
		let parsed: Vec<BindingSet> =
			self.sets.borrow().iter().filter(|set| set.is_parsed()).cloned().collect();
		for set in &parsed {
			for entry in set.entries_snapshot() {
				self.entry_destroy(&entry);
			}
			self.sets.borrow_mut().retain(|candidate| candidate != set);
		}
	}

	/// Appends one invocation to the entry for the chord, creating an
	/// empty entry first if the set had none. An existing tombstone keeps
	/// its flag; the invocation rides along without reviving it.
	pub fn add_signal(
		&self,
		set: &BindingSet,
		keyval: Keyval,
		modifiers: Modifiers,
		invocation: Invocation,
	) {
		let (keyval, modifiers) = normalize(keyval, modifiers);
		let entry = match self.lookup_set_entry(set, keyval, modifiers) {
			Some(entry) => entry,
			None => self.entry_new(set, keyval, modifiers),
		};
		entry.push_invocation(invocation);
	}

	/// Replaces whatever the set had for the chord with the given
	/// invocation list. The old entry is destroyed, so a tombstone is
	/// cleared as well.
	pub fn bind(
		&self,
		set: &BindingSet,
		keyval: Keyval,
		modifiers: Modifiers,
		invocations: impl IntoIterator<Item = Invocation>,
	) {
		let (keyval, modifiers) = normalize(keyval, modifiers);
		let entry = self.clear_internal(set, keyval, modifiers);
		for invocation in invocations {
			entry.push_invocation(invocation);
		}
	}

	/// Resets the chord to a fresh empty entry: not a tombstone, it
	/// matches during activation and handles nothing.
	pub fn clear_entry(&self, set: &BindingSet, keyval: Keyval, modifiers: Modifiers) {
		let (keyval, modifiers) = normalize(keyval, modifiers);
		self.clear_internal(set, keyval, modifiers);
	}

	/// Replaces the chord with a tombstone: during activation it reports
	/// the key as deliberately unbound and suppresses lower priority
	/// sets in every phase.
	pub fn skip_entry(&self, set: &BindingSet, keyval: Keyval, modifiers: Modifiers) {
		let (keyval, modifiers) = normalize(keyval, modifiers);
		let entry = self.clear_internal(set, keyval, modifiers);
		entry.set_marks_unbound();
	}

	/// Removes the chord from the set entirely, leaving no trace in any
	/// index. Unknown chords are ignored.
	pub fn remove_entry(&self, set: &BindingSet, keyval: Keyval, modifiers: Modifiers) {
		let (keyval, modifiers) = normalize(keyval, modifiers);
		if let Some(entry) = self.lookup_set_entry(set, keyval, modifiers) {
			self.entry_destroy(&entry);
		}
	}

	/// The invocation list the set holds for a chord, if any entry exists
	/// for it. A cleared entry reports an empty list.
	pub fn entry_invocations(
		&self,
		set: &BindingSet,
		keyval: Keyval,
		modifiers: Modifiers,
	) -> Option<Vec<Invocation>> {
		let (keyval, modifiers) = normalize(keyval, modifiers);
		self.lookup_set_entry(set, keyval, modifiers)
			.map(|entry| entry.snapshot_invocations())
	}

	/// Whether the set holds a tombstone for the chord.
	pub fn entry_marks_unbound(&self, set: &BindingSet, keyval: Keyval, modifiers: Modifiers) -> bool {
		let (keyval, modifiers) = normalize(keyval, modifiers);
		self.lookup_set_entry(set, keyval, modifiers)
			.is_some_and(|entry| entry.marks_unbound())
	}

	/// Registers a path pattern on the set. Invalid glob syntax warns and
	/// drops the registration; registering the same text again raises the
	/// stored priority if the new one is stronger, keeping the original
	/// position in the tie-break order.
	pub fn add_path(
		&self,
		set: &BindingSet,
		path_type: PathType,
		pattern: &str,
		priority: PathPriority,
	) {
		let glob = match Glob::new(pattern) {
			Ok(glob) => glob,
			Err(error) => {
				warn!(set = set.name(), pattern, %error, "invalid binding path pattern dropped");
				return;
			}
		};
		if set.raise_existing_pattern(path_type, pattern, priority) {
			return;
		}
		let seq = self.pattern_seq.get();
		self.pattern_seq.set((seq + 1) & PATTERN_SEQ_MASK);
		set.push_pattern(path_type, PathPattern::new(pattern, glob.compile_matcher(), priority, seq));
	}

	pub(crate) fn lookup_set_entry(
		&self,
		set: &BindingSet,
		keyval: Keyval,
		modifiers: Modifiers,
	) -> Option<BindingEntry> {
		self.by_key
			.borrow()
			.get(&(keyval, modifiers))?
			.iter()
			.map(|entry| entry.entry().clone())
			.find(|entry| entry.in_set(set))
	}

	pub(crate) fn event_candidates(
		&self,
		keycode: Keycode,
		state: Modifiers,
		mask: Modifiers,
		group: u8,
	) -> Vec<EntryRef> {
		self.key_hash.borrow_mut().lookup(keycode, state, mask, group)
	}

	pub(crate) fn keyval_candidates(&self, keyval: Keyval, modifiers: Modifiers) -> Vec<EntryRef> {
		self.key_hash.borrow_mut().lookup_keyval(keyval, modifiers)
	}

	fn entry_new(&self, set: &BindingSet, keyval: Keyval, modifiers: Modifiers) -> BindingEntry {
		let entry = BindingEntry::new(set, keyval, modifiers);
		set.push_entry(entry.clone());
		self.by_key
			.borrow_mut()
			.entry((keyval, modifiers))
			.or_default()
			.push(EntryRef(entry.clone()));
		// The positional index never sees the release bit; release
		// entries are told apart during activation.
		self.key_hash.borrow_mut().add(
			keyval,
			modifiers & !Modifiers::RELEASE,
			EntryRef(entry.clone()),
		);
		entry
	}

	fn entry_destroy(&self, entry: &BindingEntry) {
		if let Some(set) = entry.set() {
			set.remove_entry(entry);
		}
		let key = (entry.keyval(), entry.modifiers());
		let mut by_key = self.by_key.borrow_mut();
		if let Some(chain) = by_key.get_mut(&key) {
			chain.retain(|candidate| !candidate.entry().same_entry(entry));
			if chain.is_empty() {
				by_key.remove(&key);
			}
		}
		drop(by_key);
		self.key_hash.borrow_mut().remove(&EntryRef(entry.clone()));
		entry.mark_removed();
	}

	fn clear_internal(&self, set: &BindingSet, keyval: Keyval, modifiers: Modifiers) -> BindingEntry {
		if let Some(existing) = self.lookup_set_entry(set, keyval, modifiers) {
			self.entry_destroy(&existing);
		}
		self.entry_new(set, keyval, modifiers)
	}

	#[cfg(test)]
	fn chord_entry_count(&self, keyval: Keyval, modifiers: Modifiers) -> usize {
		self.by_key.borrow().get(&(keyval, modifiers)).map_or(0, Vec::len)
	}
}

impl fmt::Debug for BindingRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BindingRegistry")
			.field("sets", &self.sets.borrow().len())
			.field("chords", &self.by_key.borrow().len())
			.finish()
	}
}

/// Registration edge normalization: letters are stored lowercase and
/// only the bindable modifier bits survive.
fn normalize(keyval: Keyval, modifiers: Modifiers) -> (Keyval, Modifiers) {
	(keyval.to_lower(), modifiers & BINDING_MASK)
}
