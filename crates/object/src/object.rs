use std::sync::Arc;

use tracing::debug;

use crate::action::ReturnKind;
use crate::class::Class;
use crate::value::{Arg, ComposeError, compose_args};

/// An activation target: anything that can name its class and render the
/// paths that binding patterns match against.
pub trait Object {
	fn class(&self) -> Class;

	/// The instance path, outermost ancestor first, dot-joined. Defaults
	/// to the bare class name for targets outside any hierarchy.
	fn widget_path(&self) -> String {
		self.class().name().to_owned()
	}

	/// The type-name path, shaped like [`widget_path`](Self::widget_path)
	/// but built from class names.
	fn widget_class_path(&self) -> String {
		self.class().name().to_owned()
	}
}

/// Why invoking a named action on a target failed. All of these leave the
/// target untouched; callers log and move on to the next invocation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvokeError {
	#[error("no action {action:?} in the {class} class ancestry")]
	UnknownAction { class: Arc<str>, action: Arc<str> },
	#[error("action {action:?} of {class} returns a result bindings cannot interpret")]
	UnsupportedReturn { class: Arc<str>, action: Arc<str> },
	#[error("arguments do not fit {action:?} of {class}: {source}")]
	BadArguments { class: Arc<str>, action: Arc<str>, source: ComposeError },
	#[error("action {action:?} of {class} is not invocable from a binding")]
	NotInvocable { class: Arc<str>, action: Arc<str> },
}

/// Resolves `name` on the target's class ancestry, coerces `args` against
/// the declared parameters and runs the handler.
///
/// Returns `Ok(Some(handled))` for actions that report handling and
/// `Ok(None)` for unit actions, which callers conventionally count as
/// handled. The reported class in errors is always the target's own
/// class, not the ancestor the action was found on.
pub fn invoke_action(target: &dyn Object, name: &str, args: &[Arg]) -> Result<Option<bool>, InvokeError> {
	let class = target.class();
	let Some(action) = class.find_action(name) else {
		return Err(InvokeError::UnknownAction {
			class: class.name_arc(),
			action: Arc::from(name),
		});
	};

	let def = action.def();
	if def.return_kind() == ReturnKind::Other {
		return Err(InvokeError::UnsupportedReturn {
			class: class.name_arc(),
			action: def.name_arc(),
		});
	}
	let values = compose_args(args, def.params()).map_err(|source| InvokeError::BadArguments {
		class: class.name_arc(),
		action: def.name_arc(),
		source,
	})?;
	if !def.is_invocable() {
		return Err(InvokeError::NotInvocable {
			class: class.name_arc(),
			action: def.name_arc(),
		});
	}

	debug!(class = class.name(), action = def.name(), "invoking action");
	let result = (action.handler())(target, &values);
	Ok(match def.return_kind() {
		ReturnKind::Handled => Some(result.unwrap_or(false)),
		_ => None,
	})
}
