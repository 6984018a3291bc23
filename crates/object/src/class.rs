use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::action::ActionDef;
use crate::object::Object;
use crate::value::Value;

/// Handler behind one class action. The boolean is meaningful only for
/// actions declared [`ReturnKind::Handled`]; unit actions return `None`.
///
/// [`ReturnKind::Handled`]: crate::ReturnKind::Handled
pub type ActionHandler = Arc<dyn Fn(&dyn Object, &[Value]) -> Option<bool>>;

/// An action as stored in a class table: declared signature plus the
/// handler that runs it.
#[derive(Clone)]
pub struct ClassAction {
	def: ActionDef,
	handler: ActionHandler,
}

impl ClassAction {
	pub fn def(&self) -> &ActionDef {
		&self.def
	}

	pub fn handler(&self) -> &ActionHandler {
		&self.handler
	}
}

/// A target type descriptor: name, parent link and a frozen action table.
///
/// Classes are cheap-clone handles and equality is identity, so two
/// classes built with the same name are still distinct types. The table
/// cannot change after [`ClassBuilder::build`], which keeps dispatch from
/// ever observing a half-registered class.
#[derive(Clone)]
pub struct Class(Arc<ClassInner>);

struct ClassInner {
	name: Arc<str>,
	parent: Option<Class>,
	actions: FxHashMap<Arc<str>, ClassAction>,
}

impl Class {
	pub fn builder(name: &str) -> ClassBuilder {
		ClassBuilder {
			name: Arc::from(name),
			parent: None,
			actions: FxHashMap::default(),
		}
	}

	pub fn name(&self) -> &str {
		&self.0.name
	}

	pub(crate) fn name_arc(&self) -> Arc<str> {
		self.0.name.clone()
	}

	pub fn parent(&self) -> Option<&Class> {
		self.0.parent.as_ref()
	}

	/// Iterates from this class toward the root of the hierarchy.
	pub fn ancestry(&self) -> impl Iterator<Item = &Class> {
		std::iter::successors(Some(self), |class| class.0.parent.as_ref())
	}

	/// The nearest definition of `name` in the ancestry, walking from this
	/// class upward; a subclass registration shadows its parent's.
	pub fn find_action(&self, name: &str) -> Option<&ClassAction> {
		self.ancestry().find_map(|class| class.0.actions.get(name))
	}
}

impl PartialEq for Class {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl Eq for Class {}

impl fmt::Debug for Class {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Class").field(&self.0.name).finish()
	}
}

/// Accumulates the parent link and action table for a [`Class`].
pub struct ClassBuilder {
	name: Arc<str>,
	parent: Option<Class>,
	actions: FxHashMap<Arc<str>, ClassAction>,
}

impl ClassBuilder {
	pub fn parent(mut self, parent: &Class) -> Self {
		self.parent = Some(parent.clone());
		self
	}

	/// Registers an action. A later registration under the same name
	/// replaces the earlier one.
	pub fn action(
		mut self,
		def: ActionDef,
		handler: impl Fn(&dyn Object, &[Value]) -> Option<bool> + 'static,
	) -> Self {
		self.actions.insert(def.name_arc(), ClassAction { def, handler: Arc::new(handler) });
		self
	}

	pub fn build(self) -> Class {
		Class(Arc::new(ClassInner {
			name: self.name,
			parent: self.parent,
			actions: self.actions,
		}))
	}
}
