//! Keybinding resolution: named sets of chord-to-action bindings, path
//! patterns deciding which targets a set applies to, and phased
//! activation that walks widget path, class path and class ancestry in
//! order.
//!
//! A [`BindingRegistry`] owns the sets for one keymap. Entries are
//! registered per set under a normalized (keyval, modifiers) chord and
//! indexed two ways: by chord for direct access and positionally through
//! a key hash, so raw events resolve against the layout rather than
//! trusting pre-translated keyvals. Activation is reentrant; handlers may
//! freely rebind, unbind or reload configuration for the registry that
//! invoked them.
//!
//! The sibling crates are re-exported: key and keymap vocabulary from
//! `bindery-keymap`, class and action dispatch from `bindery-object`,
//! mnemonic activation from `bindery-mnemonics`.

mod activate;
mod config;
mod entry;
mod invocation;
mod registry;
mod set;

pub use bindery_keymap::{
	Accel, AccelParseError, KeyEvent, KeyHash, Keycode, Keymap, KeymapKey, Keyval, Modifiers,
	StaticKeymap, StaticKeymapBuilder, Translation,
};
pub use bindery_mnemonics::{MnemonicHash, MnemonicKeys, MnemonicTarget};
pub use bindery_object::{
	ActionDef, ActionHandler, Arg, Class, ClassAction, ClassBuilder, ComposeError, EnumDef,
	EnumValue, FlagsDef, FlagsValue, InvokeError, Object, ParamKind, ReturnKind, Value,
	compose_args, invoke_action,
};

pub use config::{ConfigProblem, ConfigProblemKind, ParseError, parse_bindings};
pub use invocation::Invocation;
pub use registry::{BindingRegistry, RegistryError};
pub use set::{BindingSet, PathPriority, PathType};

/// Modifier bits that participate in binding registration and matching:
/// the default accelerator mask plus the release flag. Everything else,
/// lock and the bare hardware slots, is stripped at the registry edges.
pub const BINDING_MASK: Modifiers = Modifiers::DEFAULT_MASK.union(Modifiers::RELEASE);
