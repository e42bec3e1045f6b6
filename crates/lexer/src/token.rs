use std::fmt;

use crate::class::{ClassSet, classes_of};

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
	/// `$name`.
	Variable,
	/// Bare identifier or keyword: `foreach`, `as`, `true`, `upper`.
	Name,
	/// Integer literal.
	Int,
	/// Floating point literal.
	Float,
	/// Single or double quoted string, quotes included in the text.
	Str,
	/// `/* ... */` comment.
	Comment,
	/// Operator or punctuation, matched longest-first.
	Punct(&'static str),
	/// Unrecognised character or unterminated string.
	Other,
}

impl TokenKind {
	/// Operator classes this kind belongs to.
	pub fn classes(self) -> ClassSet {
		classes_of(self)
	}
}

impl fmt::Display for TokenKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Variable => f.write_str("variable"),
			Self::Name => f.write_str("name"),
			Self::Int => f.write_str("integer"),
			Self::Float => f.write_str("float"),
			Self::Str => f.write_str("string"),
			Self::Comment => f.write_str("comment"),
			Self::Punct(p) => f.write_str(p),
			Self::Other => f.write_str("character"),
		}
	}
}

/// A single lexed token.
///
/// Immutable once produced: the cursor rebuilds its sequence instead of
/// editing tokens in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub kind: TokenKind,
	/// Source text of the token.
	pub text: String,
	/// Whitespace that followed the token in the source.
	pub whitespace: String,
	/// 1-based line the token starts on.
	pub line: u32,
}

const SPECIAL_VALUES: &[&str] = &["true", "false", "null", "TRUE", "FALSE", "NULL"];

impl Token {
	pub fn new(kind: TokenKind, text: impl Into<String>, line: u32) -> Self {
		Self {
			kind,
			text: text.into(),
			whitespace: String::new(),
			line,
		}
	}

	pub fn classes(&self) -> ClassSet {
		classes_of(self.kind)
	}

	/// Returns `true` for `true`, `false`, `null` and their upper-case forms.
	pub fn is_special_value(&self) -> bool {
		self.kind == TokenKind::Name && SPECIAL_VALUES.contains(&self.text.as_str())
	}

	/// Variable name without the leading `$`, or the plain text otherwise.
	pub fn name(&self) -> &str {
		match self.kind {
			TokenKind::Variable => self.text.trim_start_matches('$'),
			_ => &self.text,
		}
	}

	/// Decodes a string literal. Returns `None` for any other kind.
	///
	/// Single-quoted strings only understand `\'` and `\\`; double-quoted ones
	/// also decode `\n`, `\t`, `\r`, `\"` and `\$`. Unknown escapes are kept
	/// verbatim.
	pub fn unquote(&self) -> Option<String> {
		if self.kind != TokenKind::Str {
			return None;
		}
		let quote = self.text.chars().next()?;
		let inner = self.text.get(1..self.text.len() - 1)?;
		let mut out = String::with_capacity(inner.len());
		let mut chars = inner.chars();
		while let Some(ch) = chars.next() {
			if ch != '\\' {
				out.push(ch);
				continue;
			}
			match (quote, chars.next()) {
				(_, Some('\\')) => out.push('\\'),
				(q, Some(c)) if c == q => out.push(c),
				('"', Some('n')) => out.push('\n'),
				('"', Some('t')) => out.push('\t'),
				('"', Some('r')) => out.push('\r'),
				('"', Some('$')) => out.push('$'),
				(_, Some(c)) => {
					out.push('\\');
					out.push(c);
				}
				(_, None) => out.push('\\'),
			}
		}
		Some(out)
	}
}
