use bindery_keymap::{KeyEvent, Keyval, Modifiers};
use bindery_object::{Object, invoke_action};
use globset::GlobMatcher;
use tracing::warn;

use crate::BINDING_MASK;
use crate::entry::{BindingEntry, EntryRef};
use crate::registry::BindingRegistry;
use crate::set::{BindingSet, PathType};

/// One pattern considered during a phase, paired with the entry its set
/// put forward for the chord.
struct PhasePattern {
	priority: u8,
	sequence: u32,
	matcher: GlobMatcher,
	entry: BindingEntry,
}

enum PhaseOutcome {
	/// A matching entry handled the key.
	Handled,
	/// A matching tombstone declared the key unbound; resolution stops
	/// here, later phases and sets never run.
	Unbound,
	/// Nothing in this phase claimed the key.
	Fallthrough,
}

impl BindingRegistry {
	/// Resolves a raw key event against the keymap and activates the
	/// winning binding on `target`. Returns whether anything handled it.
	pub fn activate_event(&self, target: &dyn Object, event: &KeyEvent) -> bool {
		let candidates = self.event_candidates(
			event.keycode,
			event.state,
			BINDING_MASK & !Modifiers::RELEASE,
			event.group,
		);
		self.activate_entries(target, &candidates, event.is_release)
	}

	/// Activates bindings for an already translated keyval. The release
	/// bit of `modifiers` selects release entries; the keyval is matched
	/// as given, so callers feeding pre-resolved chords pass the stored
	/// (lowercased) form.
	pub fn activate(&self, target: &dyn Object, keyval: Keyval, modifiers: Modifiers) -> bool {
		let is_release = modifiers.contains(Modifiers::RELEASE);
		let modifiers = modifiers & BINDING_MASK & !Modifiers::RELEASE;
		let candidates = self.keyval_candidates(keyval, modifiers);
		self.activate_entries(target, &candidates, is_release)
	}

	/// Fires the entry one specific set holds for the chord, ignoring
	/// path patterns entirely. Release entries are addressed by keeping
	/// the release bit in `modifiers`.
	pub fn set_activate(
		&self,
		set: &BindingSet,
		keyval: Keyval,
		modifiers: Modifiers,
		target: &dyn Object,
	) -> bool {
		let keyval = keyval.to_lower();
		let modifiers = modifiers & BINDING_MASK;
		match self.lookup_set_entry(set, keyval, modifiers) {
			Some(entry) => self.fire_entry(&entry, target),
			None => false,
		}
	}

	/// The three resolution phases: widget path, widget class path, then
	/// each class in the target's ancestry. A handled entry ends the
	/// walk; a matched tombstone ends it unhandled.
	fn activate_entries(&self, target: &dyn Object, candidates: &[EntryRef], is_release: bool) -> bool {
		if candidates.is_empty() {
			return false;
		}

		let path = target.widget_path();
		let patterns = self.phase_patterns(candidates, PathType::Widget, is_release);
		match self.match_patterns(&patterns, target, &path) {
			PhaseOutcome::Handled => return true,
			PhaseOutcome::Unbound => return false,
			PhaseOutcome::Fallthrough => {}
		}

		let path = target.widget_class_path();
		let patterns = self.phase_patterns(candidates, PathType::WidgetClass, is_release);
		match self.match_patterns(&patterns, target, &path) {
			PhaseOutcome::Handled => return true,
			PhaseOutcome::Unbound => return false,
			PhaseOutcome::Fallthrough => {}
		}

		let patterns = self.phase_patterns(candidates, PathType::Class, is_release);
		let class = target.class();
		for ancestor in class.ancestry() {
			match self.match_patterns(&patterns, target, ancestor.name()) {
				PhaseOutcome::Handled => return true,
				PhaseOutcome::Unbound => return false,
				PhaseOutcome::Fallthrough => {}
			}
		}
		false
	}

	/// Builds the sorted pattern table for one phase. Each set fields at
	/// most one entry per resolution: its first surviving candidate; all
	/// of the set's patterns for the path type stand for that entry.
	fn phase_patterns(
		&self,
		candidates: &[EntryRef],
		path_type: PathType,
		is_release: bool,
	) -> Vec<PhasePattern> {
		let mut claimed_sets: Vec<BindingSet> = Vec::new();
		let mut patterns = Vec::new();
		for candidate in candidates {
			let entry = candidate.entry();
			if entry.is_removed() || entry.release_flagged() != is_release {
				continue;
			}
			let Some(set) = entry.set() else {
				continue;
			};
			if claimed_sets.contains(&set) {
				continue;
			}
			for pattern in set.patterns_snapshot(path_type) {
				patterns.push(PhasePattern {
					priority: pattern.priority(),
					sequence: pattern.sequence(),
					matcher: pattern.matcher.clone(),
					entry: entry.clone(),
				});
			}
			claimed_sets.push(set);
		}
		// Priority decides; within a level the earlier registration wins.
		patterns.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.sequence.cmp(&b.sequence)));
		patterns
	}

	fn match_patterns(
		&self,
		patterns: &[PhasePattern],
		target: &dyn Object,
		path: &str,
	) -> PhaseOutcome {
		for pattern in patterns {
			if !pattern.matcher.is_match(path) {
				continue;
			}
			if pattern.entry.is_removed() {
				continue;
			}
			if pattern.entry.marks_unbound() {
				return PhaseOutcome::Unbound;
			}
			if self.fire_entry(&pattern.entry, target) {
				return PhaseOutcome::Handled;
			}
		}
		PhaseOutcome::Fallthrough
	}

	/// Runs the entry's invocations in order. A failing invocation is
	/// logged and skipped; the rest still run. Unit actions count as
	/// handled, result-reporting ones are OR-combined. Stops early if a
	/// handler destroyed the entry.
	pub(crate) fn fire_entry(&self, entry: &BindingEntry, target: &dyn Object) -> bool {
		let invocations = entry.snapshot_invocations();
		let mut handled = false;
		for invocation in &invocations {
			match invoke_action(target, &invocation.action, &invocation.args) {
				Ok(Some(result)) => handled |= result,
				Ok(None) => handled = true,
				Err(error) => {
					warn!(
						set = entry.set_name(),
						accel = %entry.accel(),
						invocation = %invocation,
						%error,
						"binding invocation skipped"
					);
				}
			}
			if entry.is_removed() {
				break;
			}
		}
		handled
	}
}
