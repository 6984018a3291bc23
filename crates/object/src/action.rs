use std::fmt;
use std::sync::Arc;

/// A named enumeration an action parameter can range over. Cheap to clone;
/// equality is identity, so two definitions with the same values are still
/// distinct types.
#[derive(Clone)]
pub struct EnumDef(Arc<EnumInner>);

struct EnumInner {
	name: Arc<str>,
	values: Box<[EnumValue]>,
}

#[derive(Debug, Clone)]
pub struct EnumValue {
	pub name: Arc<str>,
	pub nick: Arc<str>,
	pub value: i64,
}

impl EnumDef {
	pub fn new<'a>(name: &str, values: impl IntoIterator<Item = (&'a str, &'a str, i64)>) -> Self {
		let values = values
			.into_iter()
			.map(|(name, nick, value)| EnumValue { name: Arc::from(name), nick: Arc::from(nick), value })
			.collect();
		Self(Arc::new(EnumInner { name: Arc::from(name), values }))
	}

	pub fn name(&self) -> &str {
		&self.0.name
	}

	pub(crate) fn name_arc(&self) -> Arc<str> {
		self.0.name.clone()
	}

	pub fn values(&self) -> &[EnumValue] {
		&self.0.values
	}

	pub fn by_value(&self, value: i64) -> Option<&EnumValue> {
		self.0.values.iter().find(|v| v.value == value)
	}

	/// Looks a value up by its full name or its nickname.
	pub fn by_word(&self, word: &str) -> Option<&EnumValue> {
		self.0.values.iter().find(|v| &*v.name == word || &*v.nick == word)
	}
}

impl PartialEq for EnumDef {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for EnumDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("EnumDef").field(&self.0.name).finish()
	}
}

/// A named flags type; values are single bits or bit combinations.
#[derive(Clone)]
pub struct FlagsDef(Arc<FlagsInner>);

struct FlagsInner {
	name: Arc<str>,
	values: Box<[FlagsValue]>,
	mask: u32,
}

#[derive(Debug, Clone)]
pub struct FlagsValue {
	pub name: Arc<str>,
	pub nick: Arc<str>,
	pub value: u32,
}

impl FlagsDef {
	pub fn new<'a>(name: &str, values: impl IntoIterator<Item = (&'a str, &'a str, u32)>) -> Self {
		let values: Box<[FlagsValue]> = values
			.into_iter()
			.map(|(name, nick, value)| FlagsValue { name: Arc::from(name), nick: Arc::from(nick), value })
			.collect();
		let mask = values.iter().fold(0, |mask, v| mask | v.value);
		Self(Arc::new(FlagsInner { name: Arc::from(name), values, mask }))
	}

	pub fn name(&self) -> &str {
		&self.0.name
	}

	pub(crate) fn name_arc(&self) -> Arc<str> {
		self.0.name.clone()
	}

	pub fn values(&self) -> &[FlagsValue] {
		&self.0.values
	}

	/// Union of every defined bit.
	pub fn mask(&self) -> u32 {
		self.0.mask
	}

	pub fn by_word(&self, word: &str) -> Option<&FlagsValue> {
		self.0.values.iter().find(|v| &*v.name == word || &*v.nick == word)
	}
}

impl PartialEq for FlagsDef {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for FlagsDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("FlagsDef").field(&self.0.name).finish()
	}
}

/// The parameter types an action can declare.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
	Long,
	Double,
	Str,
	Bool,
	Enum(EnumDef),
	Flags(FlagsDef),
}

impl ParamKind {
	pub(crate) fn kind_name(&self) -> &'static str {
		match self {
			Self::Long => "long",
			Self::Double => "double",
			Self::Str => "string",
			Self::Bool => "bool",
			Self::Enum(_) => "enum",
			Self::Flags(_) => "flags",
		}
	}
}

/// How an action's handler result is interpreted by binding activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnKind {
	/// No result; running the handler counts as handling the event.
	#[default]
	Unit,
	/// The handler's boolean says whether the event was handled.
	Handled,
	/// A result the binding engine cannot interpret; such actions cannot
	/// be fired from bindings.
	Other,
}

/// Declared signature of one action.
#[derive(Debug, Clone)]
pub struct ActionDef {
	name: Arc<str>,
	params: Vec<ParamKind>,
	ret: ReturnKind,
	invocable: bool,
}

impl ActionDef {
	pub fn new(name: &str) -> Self {
		Self { name: Arc::from(name), params: Vec::new(), ret: ReturnKind::Unit, invocable: true }
	}

	pub fn param(mut self, kind: ParamKind) -> Self {
		self.params.push(kind);
		self
	}

	pub fn returns(mut self, ret: ReturnKind) -> Self {
		self.ret = ret;
		self
	}

	/// Marks an action that exists for other callers but must not be fired
	/// from a binding.
	pub fn non_invocable(mut self) -> Self {
		self.invocable = false;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub(crate) fn name_arc(&self) -> Arc<str> {
		self.name.clone()
	}

	pub fn params(&self) -> &[ParamKind] {
		&self.params
	}

	pub fn return_kind(&self) -> ReturnKind {
		self.ret
	}

	pub fn is_invocable(&self) -> bool {
		self.invocable
	}
}
