use bindery_keymap::Keyval;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::MnemonicTarget;

/// Keyval-keyed mnemonic targets with round-robin disambiguation.
///
/// Activation only considers live targets (sensitive, mapped, viewable).
/// The chosen target is rotated to the end of its list before it is
/// activated, so repeated presses of an overloaded mnemonic walk through
/// every live candidate in turn.
pub struct MnemonicHash<T> {
	targets: FxHashMap<Keyval, Vec<T>>,
}

impl<T> Default for MnemonicHash<T> {
	fn default() -> Self {
		Self { targets: FxHashMap::default() }
	}
}

impl<T: MnemonicTarget + Clone + PartialEq> MnemonicHash<T> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.targets.is_empty()
	}

	pub fn has(&self, keyval: Keyval) -> bool {
		self.targets.contains_key(&keyval)
	}

	/// Registered keyvals, in no particular order.
	pub fn keyvals(&self) -> impl Iterator<Item = Keyval> + '_ {
		self.targets.keys().copied()
	}

	/// Targets registered under `keyval`, in current rotation order.
	pub fn targets(&self, keyval: Keyval) -> &[T] {
		self.targets.get(&keyval).map_or(&[], Vec::as_slice)
	}

	/// Registers `target` under `keyval`. Registering the same pair twice
	/// is ignored with a warning.
	pub fn add(&mut self, keyval: Keyval, target: T) {
		let targets = self.targets.entry(keyval).or_default();
		if targets.contains(&target) {
			warn!(keyval = %keyval, "mnemonic target already registered");
			return;
		}
		targets.push(target);
	}

	/// Removes one registration. A pair that was never registered warns
	/// and leaves the hash unchanged.
	pub fn remove(&mut self, keyval: Keyval, target: &T) {
		let Some(targets) = self.targets.get_mut(&keyval) else {
			warn!(keyval = %keyval, "no mnemonic registered for keyval");
			return;
		};
		let Some(index) = targets.iter().position(|candidate| candidate == target) else {
			warn!(keyval = %keyval, "mnemonic target was not registered");
			return;
		};
		targets.remove(index);
		if targets.is_empty() {
			self.targets.remove(&keyval);
		}
	}

	/// Activates the first live target registered for `keyval`.
	///
	/// Scanning stops at the second live target; its existence only sets
	/// the `cycling` flag handed to the chosen one. Returns false when
	/// nothing is registered or no target is live.
	pub fn activate(&mut self, keyval: Keyval) -> bool {
		let Some(targets) = self.targets.get_mut(&keyval) else {
			return false;
		};

		let mut chosen = None;
		let mut cycling = false;
		for (index, target) in targets.iter().enumerate() {
			if target.is_sensitive() && target.is_mapped() && target.is_viewable() {
				if chosen.is_some() {
					cycling = true;
					break;
				}
				chosen = Some(index);
			}
		}
		let Some(index) = chosen else {
			return false;
		};

		// Round robin: the activated target goes to the back of its list.
		let target = targets.remove(index);
		targets.push(target.clone());
		target.mnemonic_activate(cycling)
	}
}
