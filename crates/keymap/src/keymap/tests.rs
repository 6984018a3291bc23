use super::*;

fn two_group_layout() -> StaticKeymap {
	// Keycode 38 carries a/A in group 0 and ф in group 1; keycode 113 is
	// a bare Left arrow.
	StaticKeymap::builder()
		.key(38, 0, 0, Keyval::from_char('a'))
		.key(38, 0, 1, Keyval::from_char('A'))
		.key(38, 1, 0, Keyval::from_char('ф'))
		.key(113, 0, 0, Keyval::LEFT)
		.virtual_modifier(Modifiers::SUPER, Modifiers::MOD4)
		.build()
}

#[test]
fn translates_base_level() {
	let keymap = two_group_layout();
	let tr = keymap.translate_state(Keycode(38), Modifiers::empty(), 0).expect("mapped position");
	assert_eq!(tr.keyval, Keyval::from_char('a'));
	assert_eq!(tr.effective_group, 0);
	assert_eq!(tr.level, 0);
	assert!(tr.consumed.is_empty());
}

#[test]
fn shift_selects_level_one_and_is_consumed() {
	let keymap = two_group_layout();
	let tr = keymap.translate_state(Keycode(38), Modifiers::SHIFT, 0).expect("mapped position");
	assert_eq!(tr.keyval, Keyval::from_char('A'));
	assert_eq!(tr.level, 1);
	assert!(tr.consumed.contains(Modifiers::SHIFT));

	// Left has no shift level; SHIFT passes through unconsumed.
	let tr = keymap.translate_state(Keycode(113), Modifiers::SHIFT, 0).expect("mapped position");
	assert_eq!(tr.keyval, Keyval::LEFT);
	assert!(tr.consumed.is_empty());
}

#[test]
fn group_toggle_advances_and_wraps() {
	let keymap = two_group_layout();
	let tr = keymap.translate_state(Keycode(38), Modifiers::MOD5, 0).expect("mapped position");
	assert_eq!(tr.keyval, Keyval::from_char('ф'));
	assert_eq!(tr.effective_group, 1);
	assert!(tr.consumed.contains(Modifiers::MOD5));

	// Toggle held on a single-group key wraps back and consumes nothing.
	let tr = keymap.translate_state(Keycode(113), Modifiers::MOD5, 0).expect("mapped position");
	assert_eq!(tr.keyval, Keyval::LEFT);
	assert_eq!(tr.effective_group, 0);
	assert!(tr.consumed.is_empty());
}

#[test]
fn unknown_keycode_is_untranslatable() {
	let keymap = two_group_layout();
	assert_eq!(keymap.translate_state(Keycode(200), Modifiers::empty(), 0), None);
}

#[test]
fn positional_queries_round_trip() {
	let keymap = two_group_layout();
	let positions = keymap.entries_for_keyval(Keyval::from_char('ф'));
	assert_eq!(positions.as_slice(), &[KeymapKey::new(Keycode(38), 1, 0)]);

	let at_code = keymap.entries_for_keycode(Keycode(38));
	assert_eq!(at_code.len(), 3);
	assert!(at_code.contains(&(KeymapKey::new(Keycode(38), 0, 1), Keyval::from_char('A'))));
}

#[test]
fn virtual_modifiers_resolve_or_fail() {
	let keymap = two_group_layout();

	let mut mods = Modifiers::SUPER | Modifiers::CONTROL;
	assert!(keymap.map_virtual_modifiers(&mut mods));
	assert_eq!(mods, Modifiers::SUPER | Modifiers::CONTROL | Modifiers::MOD4);

	let mut unbound = Modifiers::HYPER;
	assert!(!keymap.map_virtual_modifiers(&mut unbound));
}

#[test]
fn reload_bumps_serial_and_swaps_layout() {
	let keymap = two_group_layout();
	let before = keymap.serial();

	keymap.reload(StaticKeymap::builder().key(50, 0, 0, Keyval::ESCAPE));
	assert!(keymap.serial() > before);
	assert_eq!(keymap.translate_state(Keycode(38), Modifiers::empty(), 0), None);
	assert_eq!(
		keymap.translate_state(Keycode(50), Modifiers::empty(), 0).map(|tr| tr.keyval),
		Some(Keyval::ESCAPE)
	);
}
