use aspect_lexer::{Expect, Tokens};

use crate::error::CompileErrorKind;
use crate::options::Options;
use crate::registry::Registry;

/// Read-only state handed to every tag handler.
///
/// Gives access to the registry and options of the running compile, and
/// exposes the expression parser so handlers can compile their arguments.
#[derive(Debug, Clone, Copy)]
pub struct Context<'r> {
	registry: &'r Registry,
	options: Options,
}

impl<'r> Context<'r> {
	pub fn new(registry: &'r Registry, options: Options) -> Self {
		Self { registry, options }
	}

	pub fn registry(&self) -> &'r Registry {
		self.registry
	}

	pub fn options(&self) -> Options {
		self.options
	}

	/// Compiles a full expression starting at the cursor.
	pub fn expression(&self, tokens: &mut Tokens) -> Result<String, CompileErrorKind> {
		self.parse_expression(tokens)
	}

	/// Compiles an assignable variable reference, accessors included.
	pub fn target(&self, tokens: &mut Tokens) -> Result<String, CompileErrorKind> {
		self.parse_target(tokens)
	}

	/// Compiles the remaining tokens as `name=value` arguments.
	///
	/// With `positional` set, bare expressions are accepted as well and
	/// emitted as `(arg value)` entries.
	pub fn params(&self, tokens: &mut Tokens, positional: bool) -> Result<String, CompileErrorKind> {
		let mut out = String::from("(params");
		while !tokens.is_end() {
			if tokens.is(&[Expect::NAME]) && tokens.is_next(&[Expect::punct("=")]) {
				let name = tokens.take_any()?;
				tokens.advance();
				let value = self.expression(tokens)?;
				out.push_str(&format!(" ({name} {value})"));
			} else if positional {
				let value = self.expression(tokens)?;
				out.push_str(&format!(" (arg {value})"));
			} else {
				return Err(tokens.unexpected(&[Expect::NAME]).into());
			}
		}
		out.push(')');
		Ok(out)
	}
}

/// Quotes `text` as a render-script string literal.
pub fn quote(text: &str) -> String {
	serde_json::Value::from(text).to_string()
}
