use std::fmt;
use std::sync::Arc;

use bindery_object::Arg;

/// One stored action call: the action name plus the literal arguments
/// handed to it on every activation. Arguments stay in their parsed form;
/// coercion against the declared signature happens at dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
	pub action: Arc<str>,
	pub args: Arc<[Arg]>,
}

impl Invocation {
	pub fn new(action: &str) -> Self {
		Self { action: Arc::from(action), args: Arc::from(Vec::new()) }
	}

	pub fn with_args(action: &str, args: impl IntoIterator<Item = Arg>) -> Self {
		Self {
			action: Arc::from(action),
			args: args.into_iter().collect(),
		}
	}
}

impl fmt::Display for Invocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}(", self.action)?;
		for (index, arg) in self.args.iter().enumerate() {
			if index > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{arg}")?;
		}
		f.write_str(")")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_renders_a_call() {
		let plain = Invocation::new("cancel");
		assert_eq!(plain.to_string(), "cancel()");

		let call = Invocation::with_args(
			"move-cursor",
			[Arg::ident("pages"), Arg::Long(-1), Arg::str("end")],
		);
		assert_eq!(call.to_string(), "move-cursor(pages, -1, \"end\")");
	}
}
