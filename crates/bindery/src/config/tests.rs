use std::sync::Arc;

use bindery_keymap::{Keymap, Keyval, Modifiers, StaticKeymap};
use bindery_object::Arg;

use super::*;
use crate::registry::BindingRegistry;

fn registry() -> BindingRegistry {
	let keymap: Arc<dyn Keymap> = Arc::new(
		StaticKeymap::builder()
			.key(38, 0, 0, Keyval::from_char('a'))
			.key(39, 0, 0, Keyval::from_char('s'))
			.key(55, 0, 0, Keyval::from_char('v'))
			.build(),
	);
	BindingRegistry::new(keymap)
}

#[test]
fn applies_binds_unbinds_and_paths() {
	let registry = registry();
	let source = r#"
# Text editing defaults.
binding "text-entry" {
	path widget-class "*.Entry" priority application
	bind "ctrl-a" {
		# Jump to the start, then take everything.
		"move-cursor"(buffer-ends, -1, 0)
		"select-all"()
	}
	bind "release-ctrl-v" { "paste"("clipboard", 1.5) }
	unbind "ctrl-k"
}
"#;

	let problems = parse_bindings(&registry, source).unwrap();
	assert!(problems.is_empty());

	let set = registry.find_set("text-entry").expect("set created");
	assert!(set.is_parsed());

	let patterns = set.patterns_snapshot(PathType::WidgetClass);
	assert_eq!(patterns.len(), 1);
	assert_eq!(&*patterns[0].text, "*.Entry");
	assert_eq!(patterns[0].priority(), PathPriority::APPLICATION.level());

	let ctrl_a = registry
		.entry_invocations(&set, Keyval::from_char('a'), Modifiers::CONTROL)
		.unwrap();
	assert_eq!(ctrl_a.len(), 2);
	assert_eq!(&*ctrl_a[0].action, "move-cursor");
	assert_eq!(
		&*ctrl_a[0].args,
		[Arg::ident("buffer-ends"), Arg::Long(-1), Arg::Long(0)]
	);
	assert_eq!(&*ctrl_a[1].action, "select-all");
	assert!(ctrl_a[1].args.is_empty());

	let release_v = registry
		.entry_invocations(
			&set,
			Keyval::from_char('v'),
			Modifiers::CONTROL | Modifiers::RELEASE,
		)
		.unwrap();
	assert_eq!(&*release_v[0].args, [Arg::str("clipboard"), Arg::Double(1.5)]);

	assert!(registry.entry_marks_unbound(&set, Keyval::from_char('k'), Modifiers::CONTROL));
}

#[test]
fn a_bad_accelerator_drops_only_its_directive() {
	let registry = registry();
	let source = r#"
binding "broken" {
	bind "ctrl-" { "never"() }
	unbind "shift-"
	bind "ctrl-s" { "save"() }
}
"#;

	let problems = parse_bindings(&registry, source).unwrap();
	assert_eq!(problems.len(), 2);
	assert!(problems.iter().all(|p| p.kind == ConfigProblemKind::InvalidAccel));
	assert_eq!(&*problems[0].accel, "ctrl-");
	assert_eq!(&*problems[0].set, "broken");

	let set = registry.find_set("broken").unwrap();
	let saved = registry
		.entry_invocations(&set, Keyval::from_char('s'), Modifiers::CONTROL)
		.unwrap();
	assert_eq!(&*saved[0].action, "save");
}

#[test]
fn bad_argument_syntax_poisons_only_its_block() {
	let registry = registry();
	let set = registry.create_set("editor").unwrap();
	registry.add_signal(
		&set,
		Keyval::from_char('s'),
		Modifiers::CONTROL,
		Invocation::new("original"),
	);

	let source = r#"
binding "editor" {
	bind "ctrl-s" { "save"(1 2) }
	bind "ctrl-a" { "all"() }
}
"#;

	let problems = parse_bindings(&registry, source).unwrap();
	assert_eq!(problems.len(), 1);
	assert_eq!(problems[0].kind, ConfigProblemKind::InvalidArguments);

	// The poisoned block neither replaced nor cleared the old binding.
	let kept = registry
		.entry_invocations(&set, Keyval::from_char('s'), Modifiers::CONTROL)
		.unwrap();
	assert_eq!(&*kept[0].action, "original");

	let applied = registry
		.entry_invocations(&set, Keyval::from_char('a'), Modifiers::CONTROL)
		.unwrap();
	assert_eq!(&*applied[0].action, "all");
}

#[test]
fn structural_damage_aborts() {
	let registry = registry();

	let unterminated = r#"binding "x" { bind "ctrl-s" { "save"() "#;
	assert!(parse_bindings(&registry, unterminated).is_err());

	let unknown = r#"binding "x" { frobnicate "y" }"#;
	let err = parse_bindings(&registry, unknown).unwrap_err();
	assert!(err.message.contains("frobnicate"));

	let bad_string = "binding \"x\" {\n\tbind \"ctrl-s\n}";
	assert!(parse_bindings(&registry, bad_string).is_err());

	let stray = "rebind \"x\" {}";
	assert!(parse_bindings(&registry, stray).is_err());
}

#[test]
fn existing_sets_are_adopted_without_the_parsed_flag() {
	let registry = registry();
	let set = registry.create_set("editor").unwrap();

	let problems =
		parse_bindings(&registry, r#"binding "editor" { bind "ctrl-s" { "save"() } }"#).unwrap();
	assert!(problems.is_empty());
	assert!(!set.is_parsed());

	registry.reset_parsed();
	assert!(registry.find_set("editor").is_some());
}

#[test]
fn path_priority_defaults_to_config_level() {
	let registry = registry();
	parse_bindings(&registry, r#"binding "b" { path widget "*.status" }"#).unwrap();

	let set = registry.find_set("b").unwrap();
	let patterns = set.patterns_snapshot(PathType::Widget);
	assert_eq!(patterns[0].priority(), PathPriority::CONFIG.level());
}

#[test]
fn unknown_path_kind_or_level_is_structural() {
	let registry = registry();
	assert!(parse_bindings(&registry, r#"binding "b" { path gadget "*" }"#).is_err());
	assert!(
		parse_bindings(&registry, r#"binding "b" { path widget "*" priority urgent }"#).is_err()
	);
}

#[test]
fn string_escapes_and_negative_floats() {
	let registry = registry();
	let source = r#"binding "b" { bind "ctrl-a" { "echo"("say \"hi\"", -2.25) } }"#;
	parse_bindings(&registry, source).unwrap();

	let set = registry.find_set("b").unwrap();
	let args = &registry
		.entry_invocations(&set, Keyval::from_char('a'), Modifiers::CONTROL)
		.unwrap()[0]
		.args;
	assert_eq!(&**args, [Arg::str("say \"hi\""), Arg::Double(-2.25)]);
}
