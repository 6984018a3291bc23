//! Textual binding configuration.
//!
//! ```text
//! file      = binding*
//! binding   = "binding" string "{" directive* "}"
//! directive = bind | unbind | path
//! bind      = "bind" string "{" invocation* "}"
//! unbind    = "unbind" string
//! path      = "path" kind string ("priority" level)?
//! kind      = "widget" | "widget-class" | "class"
//! invocation= string "(" (arg ("," arg)*)? ")"
//! arg       = number | string | identifier
//! ```
//!
//! `#` starts a comment running to the end of the line. Structural
//! damage (an unterminated block or string, an unknown directive) aborts
//! parsing; a bad accelerator or bad invocation syntax is recorded as a
//! [`ConfigProblem`], the enclosing directive is dropped whole, and
//! parsing continues with the next one.

use std::sync::Arc;

use bindery_keymap::Accel;
use tracing::warn;

use crate::invocation::Invocation;
use crate::registry::BindingRegistry;
use crate::set::{BindingSet, PathPriority, PathType};
use bindery_object::Arg;

#[cfg(test)]
mod tests;

/// Classification of a recoverable configuration problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigProblemKind {
	/// Accelerator string couldn't be parsed.
	InvalidAccel,
	/// Invocation or argument syntax inside a bind block was malformed.
	InvalidArguments,
}

/// A problem encountered while applying configuration text. The directive
/// it came from was dropped; surrounding registry state is untouched.
#[derive(Debug, Clone)]
pub struct ConfigProblem {
	pub set: Arc<str>,
	pub accel: Arc<str>,
	pub kind: ConfigProblemKind,
	pub message: Arc<str>,
	/// Byte offset of the offending token in the source text.
	pub offset: usize,
}

/// Structural configuration error; nothing past it was applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {position}")]
pub struct ParseError {
	pub message: String,
	pub position: usize,
}

/// Applies configuration text to the registry.
///
/// Sets named by `binding` blocks are found or created; only newly
/// created ones are marked parsed and therefore subject to
/// [`BindingRegistry::reset_parsed`]. Returns the recoverable problems;
/// a structural error aborts and leaves any directives already applied
/// in place.
pub fn parse_bindings(
	registry: &BindingRegistry,
	source: &str,
) -> Result<Vec<ConfigProblem>, ParseError> {
	let mut parser = Parser::new(source);
	let mut problems = Vec::new();

	loop {
		parser.skip_trivia();
		if parser.is_end() {
			break;
		}
		let keyword_at = parser.position;
		let keyword = parser.word();
		if keyword != "binding" {
			return Err(ParseError {
				message: format!("expected `binding`, found {keyword:?}"),
				position: keyword_at,
			});
		}
		parse_binding_block(&mut parser, registry, &mut problems)?;
	}

	if !problems.is_empty() {
		let samples: Vec<_> = problems.iter().take(5).collect();
		warn!(count = problems.len(), ?samples, "binding configuration problems");
	}
	Ok(problems)
}

fn parse_binding_block(
	parser: &mut Parser<'_>,
	registry: &BindingRegistry,
	problems: &mut Vec<ConfigProblem>,
) -> Result<(), ParseError> {
	parser.skip_trivia();
	let (name, _) = parser.string()?;
	let set = registry.config_set(&name);
	parser.skip_trivia();
	parser.take('{')?;

	loop {
		parser.skip_trivia();
		match parser.peek() {
			Some('}') => {
				parser.next();
				return Ok(());
			}
			None => return Err(parser.error("unterminated binding block".into())),
			_ => {}
		}

		let directive_at = parser.position;
		let directive = parser.word();
		match directive.as_str() {
			"bind" => parse_bind(parser, registry, &set, problems)?,
			"unbind" => parse_unbind(parser, registry, &set, problems)?,
			"path" => parse_path(parser, registry, &set)?,
			other => {
				return Err(ParseError {
					message: format!("unknown directive {other:?} in binding block"),
					position: directive_at,
				});
			}
		}
	}
}

fn parse_bind(
	parser: &mut Parser<'_>,
	registry: &BindingRegistry,
	set: &BindingSet,
	problems: &mut Vec<ConfigProblem>,
) -> Result<(), ParseError> {
	parser.skip_trivia();
	let (accel_text, accel_at) = parser.string()?;
	parser.skip_trivia();
	parser.take('{')?;

	let accel = match Accel::parse(&accel_text) {
		Ok(accel) => Some(accel),
		Err(error) => {
			problems.push(problem(
				set,
				&accel_text,
				ConfigProblemKind::InvalidAccel,
				&error.to_string(),
				accel_at,
			));
			None
		}
	};

	// The block is applied whole or not at all: a bad invocation poisons
	// it without disturbing whatever the chord was bound to before.
	let mut invocations = Vec::new();
	let mut poisoned = false;
	loop {
		parser.skip_trivia();
		match parser.peek() {
			Some('}') => {
				parser.next();
				break;
			}
			Some('"') => match parse_invocation(parser) {
				Ok(invocation) => invocations.push(invocation),
				Err(error) => {
					problems.push(problem(
						set,
						&accel_text,
						ConfigProblemKind::InvalidArguments,
						&error.message,
						error.position,
					));
					poisoned = true;
					parser.skip_block_rest()?;
					break;
				}
			},
			Some(_) => {
				let at = parser.position;
				problems.push(problem(
					set,
					&accel_text,
					ConfigProblemKind::InvalidArguments,
					"expected a quoted action name",
					at,
				));
				poisoned = true;
				parser.skip_block_rest()?;
				break;
			}
			None => return Err(parser.error("unterminated bind block".into())),
		}
	}

	if !poisoned && let Some(accel) = accel {
		registry.bind(set, accel.keyval, accel.modifiers, invocations);
	}
	Ok(())
}

fn parse_unbind(
	parser: &mut Parser<'_>,
	registry: &BindingRegistry,
	set: &BindingSet,
	problems: &mut Vec<ConfigProblem>,
) -> Result<(), ParseError> {
	parser.skip_trivia();
	let (accel_text, accel_at) = parser.string()?;
	match Accel::parse(&accel_text) {
		Ok(accel) => registry.skip_entry(set, accel.keyval, accel.modifiers),
		Err(error) => problems.push(problem(
			set,
			&accel_text,
			ConfigProblemKind::InvalidAccel,
			&error.to_string(),
			accel_at,
		)),
	}
	Ok(())
}

fn parse_path(
	parser: &mut Parser<'_>,
	registry: &BindingRegistry,
	set: &BindingSet,
) -> Result<(), ParseError> {
	parser.skip_trivia();
	let kind_at = parser.position;
	let kind = parser.word();
	let path_type = match kind.as_str() {
		"widget" => PathType::Widget,
		"widget-class" => PathType::WidgetClass,
		"class" => PathType::Class,
		other => {
			return Err(ParseError {
				message: format!("unknown path kind {other:?}"),
				position: kind_at,
			});
		}
	};
	parser.skip_trivia();
	let (pattern, _) = parser.string()?;

	let mut priority = PathPriority::CONFIG;
	parser.skip_trivia();
	if parser.try_keyword("priority") {
		parser.skip_trivia();
		let level_at = parser.position;
		let level = parser.word();
		priority = match level.as_str() {
			"lowest" => PathPriority::LOWEST,
			"toolkit" => PathPriority::TOOLKIT,
			"application" => PathPriority::APPLICATION,
			"theme" => PathPriority::THEME,
			"config" => PathPriority::CONFIG,
			"highest" => PathPriority::HIGHEST,
			other => {
				return Err(ParseError {
					message: format!("unknown priority level {other:?}"),
					position: level_at,
				});
			}
		};
	}

	registry.add_path(set, path_type, &pattern, priority);
	Ok(())
}

fn parse_invocation(parser: &mut Parser<'_>) -> Result<Invocation, ParseError> {
	let (action, _) = parser.string()?;
	parser.skip_trivia();
	parser.take('(')?;

	let mut args = Vec::new();
	parser.skip_trivia();
	if parser.peek() == Some(')') {
		parser.next();
		return Ok(Invocation::with_args(&action, args));
	}
	loop {
		parser.skip_trivia();
		args.push(parse_arg(parser)?);
		parser.skip_trivia();
		match parser.next() {
			Some(',') => {}
			Some(')') => break,
			Some(ch) => {
				return Err(ParseError {
					message: format!("expected `,` or `)`, found '{ch}'"),
					position: parser.position - ch.len_utf8(),
				});
			}
			None => return Err(parser.error("expected `)`, found end of input".into())),
		}
	}
	Ok(Invocation::with_args(&action, args))
}

fn parse_arg(parser: &mut Parser<'_>) -> Result<Arg, ParseError> {
	match parser.peek() {
		Some('"') => {
			let (value, _) = parser.string()?;
			Ok(Arg::str(&value))
		}
		Some(ch) if ch == '-' || ch.is_ascii_digit() => parse_number(parser),
		Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => Ok(Arg::ident(&parser.word())),
		Some(ch) => Err(parser.error(format!("expected an argument, found '{ch}'"))),
		None => Err(parser.error("expected an argument, found end of input".into())),
	}
}

fn parse_number(parser: &mut Parser<'_>) -> Result<Arg, ParseError> {
	let start = parser.position;
	let mut text = String::new();
	if parser.peek() == Some('-') {
		parser.next();
		text.push('-');
	}
	let digits = parser.take_while(|ch| ch.is_ascii_digit());
	if digits.is_empty() {
		return Err(parser.error("expected digits".into()));
	}
	text.push_str(&digits);

	let mut is_float = false;
	if parser.peek() == Some('.') {
		parser.next();
		is_float = true;
		let fraction = parser.take_while(|ch| ch.is_ascii_digit());
		if fraction.is_empty() {
			return Err(parser.error("expected digits after decimal point".into()));
		}
		text.push('.');
		text.push_str(&fraction);
	}
	if parser.peek().is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
		return Err(parser.error("malformed number".into()));
	}

	if is_float {
		let value: f64 = text.parse().map_err(|_| ParseError {
			message: format!("malformed number {text:?}"),
			position: start,
		})?;
		Ok(Arg::Double(value))
	} else {
		let value: i64 = text.parse().map_err(|_| ParseError {
			message: format!("number {text:?} out of range"),
			position: start,
		})?;
		Ok(Arg::Long(value))
	}
}

fn problem(
	set: &BindingSet,
	accel: &str,
	kind: ConfigProblemKind,
	message: &str,
	offset: usize,
) -> ConfigProblem {
	ConfigProblem {
		set: set.name_arc(),
		accel: Arc::from(accel),
		kind,
		message: Arc::from(message),
		offset,
	}
}

/// Maintains the parser's state for recursive descent parsing.
struct Parser<'a> {
	/// The unconsumed remainder of the input.
	input: &'a str,
	/// Current byte position in the original input.
	position: usize,
}

impl<'a> Parser<'a> {
	fn new(input: &'a str) -> Self {
		Self { input, position: 0 }
	}

	fn peek(&self) -> Option<char> {
		self.input.chars().next()
	}

	fn next(&mut self) -> Option<char> {
		let ch = self.peek()?;
		self.position += ch.len_utf8();
		self.input = &self.input[ch.len_utf8()..];
		Some(ch)
	}

	fn is_end(&self) -> bool {
		self.input.is_empty()
	}

	fn take(&mut self, expected: char) -> Result<(), ParseError> {
		match self.next() {
			Some(ch) if ch == expected => Ok(()),
			Some(ch) => Err(ParseError {
				message: format!("expected '{expected}', found '{ch}'"),
				position: self.position - ch.len_utf8(),
			}),
			None => Err(ParseError {
				message: format!("expected '{expected}', found end of input"),
				position: self.position,
			}),
		}
	}

	fn take_while<F>(&mut self, predicate: F) -> String
	where
		F: Fn(char) -> bool,
	{
		let mut result = String::new();
		while let Some(ch) = self.peek() {
			if predicate(ch) {
				result.push(ch);
				self.next();
			} else {
				break;
			}
		}
		result
	}

	/// Whitespace and `#` comments.
	fn skip_trivia(&mut self) {
		loop {
			match self.peek() {
				Some(ch) if ch.is_whitespace() => {
					self.next();
				}
				Some('#') => {
					while let Some(ch) = self.next() {
						if ch == '\n' {
							break;
						}
					}
				}
				_ => return,
			}
		}
	}

	fn word(&mut self) -> String {
		self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
	}

	/// Consumes `keyword` if it is the next word, restoring the parser
	/// state otherwise.
	fn try_keyword(&mut self, keyword: &str) -> bool {
		let snapshot = (self.input, self.position);
		if self.word() == keyword {
			return true;
		}
		self.input = snapshot.0;
		self.position = snapshot.1;
		false
	}

	/// A quoted string; returns the content and its starting offset.
	fn string(&mut self) -> Result<(String, usize), ParseError> {
		self.take('"')?;
		let start = self.position;
		let body = self.string_body()?;
		Ok((body, start))
	}

	/// The remainder of a string whose opening quote is already consumed.
	fn string_body(&mut self) -> Result<String, ParseError> {
		let mut out = String::new();
		loop {
			match self.next() {
				Some('"') => return Ok(out),
				Some('\\') => match self.next() {
					Some(ch @ ('"' | '\\')) => out.push(ch),
					Some('n') => out.push('\n'),
					Some('t') => out.push('\t'),
					Some(ch) => return Err(self.error(format!("unknown escape '\\{ch}'"))),
					None => return Err(self.error("unterminated string".into())),
				},
				Some('\n') | None => return Err(self.error("unterminated string".into())),
				Some(ch) => out.push(ch),
			}
		}
	}

	/// Error recovery: consumes the rest of the enclosing block, honoring
	/// strings and comments so a brace inside either doesn't end it.
	fn skip_block_rest(&mut self) -> Result<(), ParseError> {
		let mut depth = 0usize;
		loop {
			match self.next() {
				Some('}') if depth == 0 => return Ok(()),
				Some('}') => depth -= 1,
				Some('{') => depth += 1,
				Some('"') => {
					self.string_body()?;
				}
				Some('#') => {
					while let Some(ch) = self.next() {
						if ch == '\n' {
							break;
						}
					}
				}
				Some(_) => {}
				None => return Err(self.error("unterminated bind block".into())),
			}
		}
	}

	fn error(&self, message: String) -> ParseError {
		ParseError { message, position: self.position }
	}
}
