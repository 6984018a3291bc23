use std::sync::Arc;

use bindery_keymap::{KeyEvent, KeyHash, Keymap, Keyval, Modifiers};

use crate::{MnemonicHash, MnemonicTarget};

/// Event-driven mnemonic activation.
///
/// Pairs a [`MnemonicHash`] with a lazily seeded positional [`KeyHash`],
/// so lookups go through the keymap instead of trusting the keyval the
/// event was delivered with. The key hash is dropped on any registration
/// change and rebuilt on the next event; layout changes are picked up by
/// the key hash itself.
pub struct MnemonicKeys<T> {
	keymap: Arc<dyn Keymap>,
	hash: MnemonicHash<T>,
	key_hash: Option<KeyHash<Keyval>>,
}

impl<T: MnemonicTarget + Clone + PartialEq> MnemonicKeys<T> {
	pub fn new(keymap: Arc<dyn Keymap>) -> Self {
		Self { keymap, hash: MnemonicHash::new(), key_hash: None }
	}

	pub fn hash(&self) -> &MnemonicHash<T> {
		&self.hash
	}

	pub fn add(&mut self, keyval: Keyval, target: T) {
		self.hash.add(keyval, target);
		self.key_hash = None;
	}

	pub fn remove(&mut self, keyval: Keyval, target: &T) {
		self.hash.remove(keyval, target);
		self.key_hash = None;
	}

	/// Resolves the event positionally and activates the first mnemonic
	/// keyval it reaches. `mask` selects the modifier bits that must agree
	/// with the event state; mnemonics are registered bare, so any masked
	/// bit held in `state` defeats the match.
	pub fn activate_event(&mut self, event: &KeyEvent, mask: Modifiers) -> bool {
		if self.hash.is_empty() {
			return false;
		}
		if self.key_hash.is_none() {
			let mut key_hash = KeyHash::new(self.keymap.clone());
			for keyval in self.hash.keyvals() {
				key_hash.add(keyval, Modifiers::empty(), keyval);
			}
			self.key_hash = Some(key_hash);
		}
		let Some(key_hash) = self.key_hash.as_mut() else {
			return false;
		};

		let found = key_hash.lookup(event.keycode, event.state, mask, event.group);
		match found.first() {
			Some(&keyval) => self.hash.activate(keyval),
			None => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::{Cell, RefCell};
	use std::rc::Rc;

	use bindery_keymap::{KeyEvent, Keycode, Keyval, Modifiers, StaticKeymap};

	use super::*;

	#[derive(Clone)]
	struct Target(Rc<TargetState>);

	struct TargetState {
		sensitive: Cell<bool>,
		activations: RefCell<Vec<bool>>,
	}

	impl Target {
		fn live() -> Self {
			Self(Rc::new(TargetState {
				sensitive: Cell::new(true),
				activations: RefCell::new(Vec::new()),
			}))
		}

		fn count(&self) -> usize {
			self.0.activations.borrow().len()
		}
	}

	impl PartialEq for Target {
		fn eq(&self, other: &Self) -> bool {
			Rc::ptr_eq(&self.0, &other.0)
		}
	}

	impl MnemonicTarget for Target {
		fn is_sensitive(&self) -> bool {
			self.0.sensitive.get()
		}

		fn is_mapped(&self) -> bool {
			true
		}

		fn is_viewable(&self) -> bool {
			true
		}

		fn mnemonic_activate(&self, cycling: bool) -> bool {
			self.0.activations.borrow_mut().push(cycling);
			true
		}
	}

	const F_CODE: Keycode = Keycode(41);
	const B_CODE: Keycode = Keycode(56);

	fn keymap() -> Arc<dyn Keymap> {
		Arc::new(
			StaticKeymap::builder()
				.key(41, 0, 0, Keyval::from_char('f'))
				.key(41, 0, 1, Keyval::from_char('F'))
				.key(56, 0, 0, Keyval::from_char('b'))
				.key(56, 0, 1, Keyval::from_char('B'))
				.build(),
		)
	}

	fn press(keycode: Keycode) -> KeyEvent {
		KeyEvent::press(keycode, Modifiers::empty(), 0, Keyval::NONE)
	}

	#[test]
	fn event_resolves_through_the_keymap_position() {
		let mut keys = MnemonicKeys::new(keymap());
		let target = Target::live();
		keys.add(Keyval::from_char('f'), target.clone());

		assert!(keys.activate_event(&press(F_CODE), Modifiers::DEFAULT_MASK));
		assert!(!keys.activate_event(&press(B_CODE), Modifiers::DEFAULT_MASK));
		assert_eq!(target.count(), 1);
	}

	#[test]
	fn masked_modifier_held_defeats_the_match() {
		let mut keys = MnemonicKeys::new(keymap());
		keys.add(Keyval::from_char('f'), Target::live());

		let event = KeyEvent::press(F_CODE, Modifiers::MOD1, 0, Keyval::NONE);
		assert!(!keys.activate_event(&event, Modifiers::DEFAULT_MASK));
	}

	#[test]
	fn registration_changes_invalidate_the_cached_lookup() {
		let mut keys = MnemonicKeys::new(keymap());
		let f_target = Target::live();
		keys.add(Keyval::from_char('f'), f_target.clone());
		assert!(keys.activate_event(&press(F_CODE), Modifiers::DEFAULT_MASK));

		let b_target = Target::live();
		keys.add(Keyval::from_char('b'), b_target.clone());
		assert!(keys.activate_event(&press(B_CODE), Modifiers::DEFAULT_MASK));
		assert_eq!(b_target.count(), 1);

		keys.remove(Keyval::from_char('f'), &f_target);
		assert!(!keys.activate_event(&press(F_CODE), Modifiers::DEFAULT_MASK));
		assert_eq!(f_target.count(), 1);
	}

	#[test]
	fn empty_registration_never_activates() {
		let mut keys = MnemonicKeys::<Target>::new(keymap());
		assert!(!keys.activate_event(&press(F_CODE), Modifiers::DEFAULT_MASK));
	}
}
