//! Expression compiler.
//!
//! Tag expressions compile to prefix s-expressions: `$a.b + 1` becomes
//! `(+ (get (var a) "b") 1)`. Binary operators are parsed by precedence
//! climbing over [`binding_power`]; `|name:arg` modifiers bind tighter than any
//! binary operator and the ternary binds loosest.

use aspect_lexer::{ClassSet, Expect, TokenKind, Tokens, binding_power};

use crate::context::{Context, quote};
use crate::error::CompileErrorKind;
use crate::options::Options;


type ExprResult = Result<String, CompileErrorKind>;

const OPEN_PAREN: Expect = Expect::punct("(");
const CLOSE_PAREN: Expect = Expect::punct(")");
const OPEN_BRACKET: Expect = Expect::punct("[");
const CLOSE_BRACKET: Expect = Expect::punct("]");
const COMMA: Expect = Expect::punct(",");
const COLON: Expect = Expect::punct(":");
const QUESTION: Expect = Expect::punct("?");
const PIPE: Expect = Expect::punct("|");
const DOT: Expect = Expect::punct(".");
const ARROW: Expect = Expect::punct("->");

/// Current token's punctuation, if it belongs to any class in `classes`.
fn punct_in(tokens: &Tokens, classes: ClassSet) -> Option<&'static str> {
	let token = tokens.current()?;
	match token.kind {
		TokenKind::Punct(op) if token.classes().intersects(classes) => Some(op),
		_ => None,
	}
}

impl Context<'_> {
	pub(crate) fn parse_expression(&self, tokens: &mut Tokens) -> ExprResult {
		self.ternary(tokens, false)
	}

	/// `in_branch` is set while parsing the `then` branch of an open ternary,
	/// where a spaced `:` closes the branch instead of adding a modifier
	/// argument.
	fn ternary(&self, tokens: &mut Tokens, in_branch: bool) -> ExprResult {
		let condition = self.binary(tokens, 0, in_branch)?;
		if !tokens.advance_if_one_of(&[QUESTION]) {
			return Ok(condition);
		}
		if tokens.advance_if_one_of(&[COLON]) {
			let otherwise = self.ternary(tokens, in_branch)?;
			return Ok(format!("(?: {condition} {otherwise})"));
		}
		let then = self.ternary(tokens, true)?;
		tokens.take(&[COLON])?;
		let otherwise = self.ternary(tokens, in_branch)?;
		Ok(format!("(? {condition} {then} {otherwise})"))
	}

	pub(crate) fn parse_target(&self, tokens: &mut Tokens) -> ExprResult {
		tokens.need(&[Expect::VARIABLE])?;
		self.variable(tokens)
	}

	fn binary(&self, tokens: &mut Tokens, min_power: u8, in_branch: bool) -> ExprResult {
		let mut lhs = self.unary(tokens, in_branch)?;
		while let Some(op) = punct_in(tokens, ClassSet::BINARY) {
			let Some(power) = binding_power(op) else {
				break;
			};
			if power < min_power {
				break;
			}
			tokens.advance();
			let rhs = self.binary(tokens, power + 1, in_branch)?;
			lhs = format!("({op} {lhs} {rhs})");
		}
		Ok(lhs)
	}

	fn unary(&self, tokens: &mut Tokens, in_branch: bool) -> ExprResult {
		if let Some(op) = punct_in(tokens, ClassSet::UNARY) {
			tokens.advance();
			let operand = self.unary(tokens, in_branch)?;
			return Ok(format!("({op} {operand})"));
		}
		if let Some(op) = punct_in(tokens, ClassSet::INCDEC) {
			tokens.advance();
			let target = self.parse_target(tokens)?;
			let form = if op == "++" { "preinc" } else { "predec" };
			return Ok(format!("({form} {target})"));
		}
		let mut value = self.term(tokens)?;
		while tokens.advance_if_one_of(&[PIPE]) {
			value = self.modifier(tokens, value, in_branch)?;
		}
		Ok(value)
	}

	fn term(&self, tokens: &mut Tokens) -> ExprResult {
		let Some(token) = tokens.current().cloned() else {
			return Err(tokens.unexpected(&[]).into());
		};
		match token.kind {
			TokenKind::Int | TokenKind::Float => {
				tokens.advance();
				Ok(token.text)
			}
			TokenKind::Str => {
				tokens.advance();
				Ok(quote(&token.unquote().unwrap_or_default()))
			}
			TokenKind::Variable => {
				let value = self.variable(tokens)?;
				match punct_in(tokens, ClassSet::INCDEC) {
					Some(op) => {
						tokens.advance();
						let form = if op == "++" { "postinc" } else { "postdec" };
						Ok(format!("({form} {value})"))
					}
					None => Ok(value),
				}
			}
			TokenKind::Name if token.is_special_value() => {
				tokens.advance();
				Ok(token.text.to_ascii_lowercase())
			}
			TokenKind::Name if tokens.is_next(&[OPEN_PAREN]) => self.call(tokens),
			TokenKind::Punct("(") => {
				tokens.advance();
				let inner = self.parse_expression(tokens)?;
				tokens.take(&[CLOSE_PAREN])?;
				Ok(inner)
			}
			TokenKind::Punct("[") => self.list(tokens),
			_ => Err(tokens.unexpected(&[]).into()),
		}
	}

	/// A variable followed by any chain of `.key`, `[expr]`, `->prop` and
	/// `->method()` accessors.
	fn variable(&self, tokens: &mut Tokens) -> ExprResult {
		let name = tokens.need(&[Expect::VARIABLE])?.name().to_string();
		tokens.advance();
		let mut value = format!("(var {name})");
		loop {
			if tokens.advance_if_one_of(&[DOT]) {
				let key = match tokens.current() {
					Some(t) if t.kind == TokenKind::Name => quote(&t.text),
					Some(t) if t.kind == TokenKind::Int => t.text.clone(),
					Some(t) if t.kind == TokenKind::Variable => format!("(var {})", t.name()),
					_ => return Err(tokens.unexpected(&[Expect::NAME]).into()),
				};
				tokens.advance();
				value = format!("(get {value} {key})");
			} else if tokens.advance_if_one_of(&[OPEN_BRACKET]) {
				let key = self.parse_expression(tokens)?;
				tokens.take(&[CLOSE_BRACKET])?;
				value = format!("(get {value} {key})");
			} else if tokens.advance_if_one_of(&[ARROW]) {
				let member = tokens.take(&[Expect::NAME])?;
				if !tokens.is(&[OPEN_PAREN]) {
					value = format!("(prop {value} {})", quote(&member));
					continue;
				}
				if self.options().contains(Options::DENY_METHODS) {
					return Err(CompileErrorKind::DisallowedCall {
						name: format!("->{member}()"),
					});
				}
				let args = self.arguments(tokens)?;
				value = format!("(method {value} {}{args})", quote(&member));
			} else {
				return Ok(value);
			}
		}
	}

	fn call(&self, tokens: &mut Tokens) -> ExprResult {
		let name = tokens.take(&[Expect::NAME])?;
		if !self.registry().is_call_allowed(&name, self.options()) {
			return Err(CompileErrorKind::DisallowedCall { name });
		}
		let args = self.arguments(tokens)?;
		Ok(format!("(fn {name}{args})"))
	}

	/// A parenthesised argument list, each argument prefixed by a space.
	fn arguments(&self, tokens: &mut Tokens) -> ExprResult {
		tokens.take(&[OPEN_PAREN])?;
		let mut out = String::new();
		if tokens.advance_if_one_of(&[CLOSE_PAREN]) {
			return Ok(out);
		}
		loop {
			out.push(' ');
			out.push_str(&self.parse_expression(tokens)?);
			if tokens.advance_if_one_of(&[CLOSE_PAREN]) {
				return Ok(out);
			}
			tokens.take(&[COMMA])?;
		}
	}

	fn list(&self, tokens: &mut Tokens) -> ExprResult {
		tokens.take(&[OPEN_BRACKET])?;
		let mut out = String::from("(list");
		while !tokens.advance_if_one_of(&[CLOSE_BRACKET]) {
			out.push(' ');
			out.push_str(&self.parse_expression(tokens)?);
			if !tokens.is(&[CLOSE_BRACKET]) {
				tokens.take(&[COMMA])?;
			}
		}
		out.push(')');
		Ok(out)
	}

	fn modifier(&self, tokens: &mut Tokens, value: String, in_branch: bool) -> ExprResult {
		let name = tokens.take(&[Expect::NAME])?;
		let symbol = self.registry().modifier(&name, self.options())?;
		let mut out = format!("(mod {symbol} {value}");
		loop {
			let spaced = tokens.previous().is_some_and(|t| !t.whitespace.is_empty());
			if (in_branch && spaced && tokens.is(&[COLON])) || !tokens.advance_if_one_of(&[COLON]) {
				break;
			}
			out.push(' ');
			if let Some(op) = punct_in(tokens, ClassSet::UNARY) {
				tokens.advance();
				out.push_str(&format!("({op} {})", self.term(tokens)?));
			} else {
				out.push_str(&self.term(tokens)?);
			}
		}
		out.push(')');
		Ok(out)
	}
}
