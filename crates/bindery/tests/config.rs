//! Configuration text driving live activation, including reloads.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use bindery::{
	ActionDef, BindingRegistry, Class, ConfigProblemKind, Invocation, KeyEvent, Keycode, Keymap,
	Keyval, Modifiers, Object, ParamKind, PathPriority, PathType, StaticKeymap, parse_bindings,
};

type Log = Rc<RefCell<Vec<String>>>;

struct Widget {
	class: Class,
	path: String,
	class_path: String,
}

impl Object for Widget {
	fn class(&self) -> Class {
		self.class.clone()
	}

	fn widget_path(&self) -> String {
		self.path.clone()
	}

	fn widget_class_path(&self) -> String {
		self.class_path.clone()
	}
}

const S_CODE: Keycode = Keycode(39);

fn keymap() -> Arc<dyn Keymap> {
	Arc::new(
		StaticKeymap::builder()
			.key(39, 0, 0, Keyval::from_char('s'))
			.key(39, 0, 1, Keyval::from_char('S'))
			.key(53, 0, 0, Keyval::from_char('x'))
			.build(),
	)
}

fn editor_widget(log: &Log) -> Widget {
	let sink = log.clone();
	let saves = log.clone();
	let class = Class::builder("EditorView")
		.action(ActionDef::new("save"), move |_, _| {
			sink.borrow_mut().push("save".into());
			None
		})
		.action(ActionDef::new("save-as").param(ParamKind::Str), move |_, args| {
			let name = args[0].as_str().unwrap_or_default();
			saves.borrow_mut().push(format!("save-as {name}"));
			None
		})
		.build();
	Widget {
		class,
		path: "window.pane.editor".to_owned(),
		class_path: "Window.Pane.EditorView".to_owned(),
	}
}

fn press(keycode: Keycode, state: Modifiers) -> KeyEvent {
	KeyEvent::press(keycode, state, 0, Keyval::NONE)
}

#[test]
fn parsed_bindings_resolve_events() {
	let log: Log = Log::default();
	let registry = BindingRegistry::new(keymap());
	let widget = editor_widget(&log);

	let problems = parse_bindings(
		&registry,
		r#"
		binding "editor" {
			path widget-class "*EditorView" priority application
			bind "ctrl-s" { "save"() }
			bind "ctrl-shift-s" { "save-as"("backup") }
		}
		"#,
	)
	.expect("well formed configuration");
	assert!(problems.is_empty());

	assert!(registry.activate_event(&widget, &press(S_CODE, Modifiers::CONTROL)));
	assert!(registry.activate_event(
		&widget,
		&press(S_CODE, Modifiers::CONTROL | Modifiers::SHIFT)
	));
	assert_eq!(*log.borrow(), ["save", "save-as backup"]);
}

#[test]
fn reload_replaces_parsed_sets_but_not_programmatic_ones() {
	let log: Log = Log::default();
	let registry = BindingRegistry::new(keymap());
	let widget = editor_widget(&log);

	// A set installed by code, with the same pattern the config uses.
	let fixed = registry.create_set("fixed").unwrap();
	registry.add_path(&fixed, PathType::WidgetClass, "*EditorView", PathPriority::TOOLKIT);
	registry.add_signal(
		&fixed,
		Keyval::from_char('x'),
		Modifiers::CONTROL,
		Invocation::new("save"),
	);

	parse_bindings(
		&registry,
		r#"
		binding "editor" {
			path widget-class "*EditorView"
			bind "ctrl-s" { "save"() }
		}
		"#,
	)
	.expect("first configuration");

	registry.reset_parsed();

	// The parsed binding is gone, the programmatic one still fires.
	assert!(!registry.activate_event(&widget, &press(S_CODE, Modifiers::CONTROL)));
	assert!(registry.activate_event(&widget, &press(Keycode(53), Modifiers::CONTROL)));

	parse_bindings(
		&registry,
		r#"
		binding "editor" {
			path widget-class "*EditorView"
			bind "ctrl-s" { "save-as"("reloaded") }
		}
		"#,
	)
	.expect("second configuration");

	assert!(registry.activate_event(&widget, &press(S_CODE, Modifiers::CONTROL)));
	assert_eq!(*log.borrow(), ["save", "save-as reloaded"]);
}

#[test]
fn recoverable_problems_leave_the_rest_of_the_file_live() {
	let log: Log = Log::default();
	let registry = BindingRegistry::new(keymap());
	let widget = editor_widget(&log);

	let problems = parse_bindings(
		&registry,
		r#"
		binding "editor" {
			path widget-class "*EditorView"
			bind "ctrl-" { "save"() }
			bind "ctrl-s" { "save"() }
		}
		"#,
	)
	.expect("structurally sound configuration");

	assert_eq!(problems.len(), 1);
	assert_eq!(problems[0].kind, ConfigProblemKind::InvalidAccel);
	assert!(registry.activate_event(&widget, &press(S_CODE, Modifiers::CONTROL)));
	assert_eq!(*log.borrow(), ["save"]);
}
