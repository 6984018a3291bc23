use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use bindery_keymap::{Accel, Keyval, Modifiers};

use crate::invocation::Invocation;
use crate::set::{BindingSet, SetInner};

/// One chord inside a set: the invocations fired on activation, or a
/// tombstone that deliberately binds nothing and suppresses lower
/// priority sets.
///
/// Entries are identity handles. Destruction marks the inner `removed`
/// flag so an activation still holding a snapshot stops after the
/// invocation in flight instead of touching a dismantled entry.
#[derive(Clone)]
pub(crate) struct BindingEntry(Rc<EntryInner>);

struct EntryInner {
	keyval: Keyval,
	modifiers: Modifiers,
	/// Backref to the owning set; weak, the set owns its entries.
	set: Weak<SetInner>,
	/// Kept alongside the backref so diagnostics survive set teardown.
	set_name: Arc<str>,
	invocations: RefCell<Vec<Invocation>>,
	marks_unbound: Cell<bool>,
	removed: Cell<bool>,
}

impl BindingEntry {
	pub(crate) fn new(set: &BindingSet, keyval: Keyval, modifiers: Modifiers) -> Self {
		Self(Rc::new(EntryInner {
			keyval,
			modifiers,
			set: set.downgrade(),
			set_name: set.name_arc(),
			invocations: RefCell::new(Vec::new()),
			marks_unbound: Cell::new(false),
			removed: Cell::new(false),
		}))
	}

	pub(crate) fn keyval(&self) -> Keyval {
		self.0.keyval
	}

	pub(crate) fn modifiers(&self) -> Modifiers {
		self.0.modifiers
	}

	pub(crate) fn accel(&self) -> Accel {
		Accel::new(self.0.keyval, self.0.modifiers)
	}

	pub(crate) fn release_flagged(&self) -> bool {
		self.0.modifiers.contains(Modifiers::RELEASE)
	}

	pub(crate) fn set(&self) -> Option<BindingSet> {
		self.0.set.upgrade().map(BindingSet::from_inner)
	}

	pub(crate) fn set_name(&self) -> &str {
		&self.0.set_name
	}

	pub(crate) fn in_set(&self, set: &BindingSet) -> bool {
		self.set().is_some_and(|owner| owner == *set)
	}

	pub(crate) fn marks_unbound(&self) -> bool {
		self.0.marks_unbound.get()
	}

	pub(crate) fn set_marks_unbound(&self) {
		self.0.marks_unbound.set(true);
	}

	pub(crate) fn is_removed(&self) -> bool {
		self.0.removed.get()
	}

	pub(crate) fn mark_removed(&self) {
		self.0.removed.set(true);
	}

	pub(crate) fn push_invocation(&self, invocation: Invocation) {
		self.0.invocations.borrow_mut().push(invocation);
	}

	pub(crate) fn snapshot_invocations(&self) -> Vec<Invocation> {
		self.0.invocations.borrow().clone()
	}

	pub(crate) fn same_entry(&self, other: &BindingEntry) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for BindingEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BindingEntry")
			.field("set", &self.0.set_name)
			.field("accel", &self.accel().to_string())
			.field("marks_unbound", &self.0.marks_unbound.get())
			.finish()
	}
}

/// Identity wrapper keying entries in the registry indices; equality
/// follows the allocation, so the same chord registered in two sets stays
/// two distinct values.
#[derive(Debug, Clone)]
pub(crate) struct EntryRef(pub(crate) BindingEntry);

impl EntryRef {
	pub(crate) fn entry(&self) -> &BindingEntry {
		&self.0
	}
}

impl PartialEq for EntryRef {
	fn eq(&self, other: &Self) -> bool {
		self.0.same_entry(&other.0)
	}
}

impl Eq for EntryRef {}

impl Hash for EntryRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		Rc::as_ptr(&self.0.0).hash(state);
	}
}
