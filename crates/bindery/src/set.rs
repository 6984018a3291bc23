use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use globset::GlobMatcher;

use crate::entry::BindingEntry;

/// Which rendered path a pattern applies to, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathType {
	/// The instance path of the target, outermost ancestor first.
	Widget,
	/// The type-name path of the target.
	WidgetClass,
	/// A single class name, tried against every ancestor in turn.
	Class,
}

/// Priority level of a path pattern, occupying the top four bits of the
/// packed ordering key. Higher levels win regardless of registration
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathPriority(u8);

impl PathPriority {
	pub const LOWEST: Self = Self(0);
	pub const TOOLKIT: Self = Self(4);
	pub const APPLICATION: Self = Self(8);
	pub const THEME: Self = Self(10);
	pub const CONFIG: Self = Self(12);
	pub const HIGHEST: Self = Self(15);

	/// Clamps to the representable range.
	pub const fn new(level: u8) -> Self {
		if level > Self::HIGHEST.0 {
			Self::HIGHEST
		} else {
			Self(level)
		}
	}

	pub const fn level(self) -> u8 {
		self.0
	}
}

pub(crate) const PATTERN_SEQ_BITS: u32 = 28;
pub(crate) const PATTERN_SEQ_MASK: u32 = (1 << PATTERN_SEQ_BITS) - 1;

fn pack(priority: PathPriority, seq: u32) -> u32 {
	(u32::from(priority.level()) << PATTERN_SEQ_BITS) | (seq & PATTERN_SEQ_MASK)
}

/// A registered path pattern: the original glob text, its compiled
/// matcher, and the packed ordering key holding the priority in the top
/// four bits and the registration sequence in the low twenty-eight.
#[derive(Clone)]
pub(crate) struct PathPattern {
	pub(crate) text: Arc<str>,
	pub(crate) matcher: GlobMatcher,
	key: Cell<u32>,
}

impl PathPattern {
	pub(crate) fn new(text: &str, matcher: GlobMatcher, priority: PathPriority, seq: u32) -> Self {
		Self {
			text: Arc::from(text),
			matcher,
			key: Cell::new(pack(priority, seq)),
		}
	}

	pub(crate) fn priority(&self) -> u8 {
		(self.key.get() >> PATTERN_SEQ_BITS) as u8
	}

	pub(crate) fn sequence(&self) -> u32 {
		self.key.get() & PATTERN_SEQ_MASK
	}

	/// On a duplicate registration the original keeps its sequence and
	/// takes the stronger of the two priorities, never the weaker.
	pub(crate) fn raise_priority(&self, priority: PathPriority) {
		if self.priority() < priority.level() {
			self.key.set(pack(priority, self.sequence()));
		}
	}
}

impl fmt::Debug for PathPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PathPattern")
			.field("text", &self.text)
			.field("priority", &self.priority())
			.field("sequence", &self.sequence())
			.finish()
	}
}

/// A named collection of binding entries plus the path patterns deciding
/// which targets the set applies to.
///
/// Sets are cheap-clone handles with identity equality. All mutation goes
/// through the owning registry, which keeps its indices in step.
#[derive(Clone)]
pub struct BindingSet(Rc<SetInner>);

pub(crate) struct SetInner {
	name: Arc<str>,
	entries: RefCell<Vec<BindingEntry>>,
	widget_patterns: RefCell<Vec<PathPattern>>,
	widget_class_patterns: RefCell<Vec<PathPattern>>,
	class_patterns: RefCell<Vec<PathPattern>>,
	parsed: Cell<bool>,
}

impl BindingSet {
	pub(crate) fn new(name: &str) -> Self {
		Self(Rc::new(SetInner {
			name: Arc::from(name),
			entries: RefCell::new(Vec::new()),
			widget_patterns: RefCell::new(Vec::new()),
			widget_class_patterns: RefCell::new(Vec::new()),
			class_patterns: RefCell::new(Vec::new()),
			parsed: Cell::new(false),
		}))
	}

	pub fn name(&self) -> &str {
		&self.0.name
	}

	pub(crate) fn name_arc(&self) -> Arc<str> {
		self.0.name.clone()
	}

	/// Whether the set was created by configuration text, which makes it
	/// subject to [`reset_parsed`](crate::BindingRegistry::reset_parsed).
	pub fn is_parsed(&self) -> bool {
		self.0.parsed.get()
	}

	pub(crate) fn mark_parsed(&self) {
		self.0.parsed.set(true);
	}

	pub(crate) fn from_inner(inner: Rc<SetInner>) -> Self {
		Self(inner)
	}

	pub(crate) fn downgrade(&self) -> Weak<SetInner> {
		Rc::downgrade(&self.0)
	}

	pub(crate) fn push_entry(&self, entry: BindingEntry) {
		self.0.entries.borrow_mut().push(entry);
	}

	pub(crate) fn remove_entry(&self, entry: &BindingEntry) {
		self.0.entries.borrow_mut().retain(|candidate| !candidate.same_entry(entry));
	}

	pub(crate) fn entries_snapshot(&self) -> Vec<BindingEntry> {
		self.0.entries.borrow().clone()
	}

	fn patterns(&self, path_type: PathType) -> &RefCell<Vec<PathPattern>> {
		match path_type {
			PathType::Widget => &self.0.widget_patterns,
			PathType::WidgetClass => &self.0.widget_class_patterns,
			PathType::Class => &self.0.class_patterns,
		}
	}

	pub(crate) fn patterns_snapshot(&self, path_type: PathType) -> Vec<PathPattern> {
		self.patterns(path_type).borrow().clone()
	}

	pub(crate) fn push_pattern(&self, path_type: PathType, pattern: PathPattern) {
		self.patterns(path_type).borrow_mut().push(pattern);
	}

	/// Returns true when a pattern with the same text already exists for
	/// `path_type`; the existing registration absorbs the new priority.
	pub(crate) fn raise_existing_pattern(
		&self,
		path_type: PathType,
		text: &str,
		priority: PathPriority,
	) -> bool {
		let patterns = self.patterns(path_type).borrow();
		match patterns.iter().find(|pattern| &*pattern.text == text) {
			Some(existing) => {
				existing.raise_priority(priority);
				true
			}
			None => false,
		}
	}
}

impl PartialEq for BindingSet {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl Eq for BindingSet {}

impl fmt::Debug for BindingSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("BindingSet").field(&self.0.name).finish()
	}
}

#[cfg(test)]
mod tests {
	use globset::Glob;

	use super::*;

	fn pattern(text: &str, priority: PathPriority, seq: u32) -> PathPattern {
		let matcher = Glob::new(text).unwrap().compile_matcher();
		PathPattern::new(text, matcher, priority, seq)
	}

	#[test]
	fn packed_key_round_trips_priority_and_sequence() {
		let p = pattern("*.Editor", PathPriority::THEME, 1234);
		assert_eq!(p.priority(), 10);
		assert_eq!(p.sequence(), 1234);
	}

	#[test]
	fn raising_priority_keeps_the_sequence() {
		let p = pattern("*", PathPriority::TOOLKIT, 7);
		p.raise_priority(PathPriority::CONFIG);
		assert_eq!(p.priority(), 12);
		assert_eq!(p.sequence(), 7);

		p.raise_priority(PathPriority::LOWEST);
		assert_eq!(p.priority(), 12);
	}

	#[test]
	fn priority_levels_clamp() {
		assert_eq!(PathPriority::new(200), PathPriority::HIGHEST);
		assert_eq!(PathPriority::new(9).level(), 9);
	}
}
