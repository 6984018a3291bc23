//! Class and action descriptors for binding dispatch.
//!
//! A [`Class`] describes a target type: its name, its parent, and the
//! actions it answers to. Each action carries a typed signature
//! ([`ActionDef`]) checked when a binding fires: stored [`Arg`]s are
//! coerced into [`Value`]s against the declared parameters, then the
//! handler runs. [`Object`] is the instance-side trait the activation
//! machinery dispatches against.

mod action;
mod class;
mod object;
mod value;

pub use action::{ActionDef, EnumDef, EnumValue, FlagsDef, FlagsValue, ParamKind, ReturnKind};
pub use class::{ActionHandler, Class, ClassAction, ClassBuilder};
pub use object::{InvokeError, Object, invoke_action};
pub use value::{Arg, ComposeError, Value, compose_args};
