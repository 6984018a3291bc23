use std::fmt;
use std::sync::Arc;

use crate::action::{EnumDef, FlagsDef, ParamKind};

/// An argument as a binding stores it: the parsed literal form, not yet
/// checked against any signature.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
	Long(i64),
	Double(f64),
	Str(Arc<str>),
	/// An unquoted word, resolved against enum or flags parameters (or
	/// passed through as a string) at compose time.
	Ident(Arc<str>),
}

impl Arg {
	pub fn str(value: &str) -> Self {
		Self::Str(Arc::from(value))
	}

	pub fn ident(value: &str) -> Self {
		Self::Ident(Arc::from(value))
	}

	pub(crate) fn kind_name(&self) -> &'static str {
		match self {
			Self::Long(_) => "long",
			Self::Double(_) => "double",
			Self::Str(_) => "string",
			Self::Ident(_) => "identifier",
		}
	}
}

impl fmt::Display for Arg {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Long(v) => write!(f, "{v}"),
			Self::Double(v) => write!(f, "{v}"),
			Self::Str(v) => write!(f, "{v:?}"),
			Self::Ident(v) => f.write_str(v),
		}
	}
}

/// A composed argument, shaped to the parameter it binds.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Long(i64),
	Double(f64),
	Str(Arc<str>),
	Bool(bool),
	Enum { def: EnumDef, value: i64 },
	Flags { def: FlagsDef, value: u32 },
}

impl Value {
	pub fn as_long(&self) -> Option<i64> {
		match self {
			Self::Long(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_double(&self) -> Option<f64> {
		match self {
			Self::Double(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<i64> {
		match self {
			Self::Enum { value, .. } => Some(*value),
			_ => None,
		}
	}

	pub fn as_flags(&self) -> Option<u32> {
		match self {
			Self::Flags { value, .. } => Some(*value),
			_ => None,
		}
	}
}

/// Why an argument list failed to bind to a signature.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComposeError {
	#[error("expected {expected} arguments, got {got}")]
	Arity { expected: usize, got: usize },
	#[error("argument {index}: cannot bind {arg} to {param}")]
	Mismatch { index: usize, arg: &'static str, param: &'static str },
	#[error("argument {index}: {value} is not a value of enum {name}")]
	UnknownEnumValue { index: usize, name: Arc<str>, value: i64 },
	#[error("argument {index}: {word:?} does not name a value of {name}")]
	UnknownWord { index: usize, name: Arc<str>, word: Arc<str> },
	#[error("argument {index}: {value:#x} has bits outside flags {name}")]
	InvalidFlagBits { index: usize, name: Arc<str>, value: i64 },
}

/// Binds stored arguments to a declared parameter list. Arity must match
/// and every argument must coerce; any failure rejects the whole list.
pub fn compose_args(args: &[Arg], params: &[ParamKind]) -> Result<Vec<Value>, ComposeError> {
	if args.len() != params.len() {
		return Err(ComposeError::Arity { expected: params.len(), got: args.len() });
	}
	args.iter()
		.zip(params)
		.enumerate()
		.map(|(index, (arg, param))| compose_one(index, arg, param))
		.collect()
}

fn compose_one(index: usize, arg: &Arg, param: &ParamKind) -> Result<Value, ComposeError> {
	match (arg, param) {
		(Arg::Long(v), ParamKind::Long) => Ok(Value::Long(*v)),
		(Arg::Long(v), ParamKind::Double) => Ok(Value::Double(*v as f64)),
		(Arg::Long(v), ParamKind::Bool) => Ok(Value::Bool(*v != 0)),
		(Arg::Long(v), ParamKind::Enum(def)) => match def.by_value(*v) {
			Some(found) => Ok(Value::Enum { def: def.clone(), value: found.value }),
			None => Err(ComposeError::UnknownEnumValue { index, name: def.name_arc(), value: *v }),
		},
		(Arg::Long(v), ParamKind::Flags(def)) => match u32::try_from(*v) {
			Ok(bits) if bits & !def.mask() == 0 => Ok(Value::Flags { def: def.clone(), value: bits }),
			_ => Err(ComposeError::InvalidFlagBits { index, name: def.name_arc(), value: *v }),
		},
		(Arg::Double(v), ParamKind::Double) => Ok(Value::Double(*v)),
		(Arg::Str(v), ParamKind::Str) => Ok(Value::Str(v.clone())),
		(Arg::Ident(v), ParamKind::Str) => Ok(Value::Str(v.clone())),
		(Arg::Ident(v), ParamKind::Enum(def)) => match def.by_word(v) {
			Some(found) => Ok(Value::Enum { def: def.clone(), value: found.value }),
			None => Err(ComposeError::UnknownWord { index, name: def.name_arc(), word: v.clone() }),
		},
		(Arg::Ident(v), ParamKind::Flags(def)) => match def.by_word(v) {
			Some(found) => Ok(Value::Flags { def: def.clone(), value: found.value }),
			None => Err(ComposeError::UnknownWord { index, name: def.name_arc(), word: v.clone() }),
		},
		_ => Err(ComposeError::Mismatch { index, arg: arg.kind_name(), param: param.kind_name() }),
	}
}
