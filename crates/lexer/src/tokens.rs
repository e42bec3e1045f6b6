//! Cursor over a token sequence.

use crate::class::{Class, ClassSet};
use crate::error::UnexpectedToken;
use crate::lexer::tokenize_from;
use crate::token::{Token, TokenKind};

#[cfg(test)]
mod tests;

/// Tokens of context shown on each side of the cursor in error snippets.
const SNIPPET_CONTEXT: usize = 3;

/// Something a token can be checked against: a concrete kind (including a
/// literal punctuation string) or any member of a class set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
	Kind(TokenKind),
	Class(ClassSet),
}

impl Expect {
	pub const VARIABLE: Self = Self::Kind(TokenKind::Variable);
	pub const NAME: Self = Self::Kind(TokenKind::Name);

	/// Expects the literal punctuation `p`.
	pub const fn punct(p: &'static str) -> Self {
		Self::Kind(TokenKind::Punct(p))
	}

	pub fn matches(&self, token: &Token) -> bool {
		match self {
			Self::Kind(kind) => token.kind == *kind,
			Self::Class(classes) => token.classes().intersects(*classes),
		}
	}

	fn label(&self) -> Option<String> {
		match self {
			Self::Kind(kind) => Some(kind.to_string()),
			Self::Class(_) => None,
		}
	}
}

impl From<TokenKind> for Expect {
	fn from(kind: TokenKind) -> Self {
		Self::Kind(kind)
	}
}

impl From<ClassSet> for Expect {
	fn from(classes: ClassSet) -> Self {
		Self::Class(classes)
	}
}

impl From<Class> for Expect {
	fn from(class: Class) -> Self {
		Self::Class(class.as_set())
	}
}

fn matches_any(expects: &[Expect], token: &Token) -> bool {
	expects.iter().any(|e| e.matches(token))
}

fn single_label(expects: &[Expect]) -> Option<String> {
	match expects {
		[only] => only.label(),
		_ => None,
	}
}

/// Cursor over the tokens of one tag body.
///
/// Owned by a single compile pass. The cursor may sit one past the last token,
/// which is the end-of-stream position.
#[derive(Debug, Clone, Default)]
pub struct Tokens {
	tokens: Vec<Token>,
	pos: usize,
	/// Line reported once the cursor has run off the end.
	last_line: u32,
}

impl Tokens {
	pub fn new(source: &str) -> Self {
		Self::with_line(source, 1)
	}

	/// Lexes `source` whose first character sits on `line`.
	pub fn with_line(source: &str, line: u32) -> Self {
		Self::from_tokens(tokenize_from(source, line), line)
	}

	pub fn from_tokens(tokens: Vec<Token>, fallback_line: u32) -> Self {
		let last_line = tokens.last().map_or(fallback_line, |t| t.line);
		Self {
			tokens,
			pos: 0,
			last_line,
		}
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	pub fn position(&self) -> usize {
		self.pos
	}

	pub fn as_slice(&self) -> &[Token] {
		&self.tokens
	}

	/// Returns `true` once the cursor has moved past the last token.
	pub fn is_end(&self) -> bool {
		self.pos >= self.tokens.len()
	}

	/// Returns `true` when the cursor sits on the last token.
	pub fn is_last(&self) -> bool {
		!self.tokens.is_empty() && self.pos == self.tokens.len() - 1
	}

	pub fn current(&self) -> Option<&Token> {
		self.tokens.get(self.pos)
	}

	pub fn previous(&self) -> Option<&Token> {
		self.pos.checked_sub(1).and_then(|p| self.tokens.get(p))
	}

	/// The token after the current one, without moving.
	pub fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.pos + 1)
	}

	/// Text of the current token.
	pub fn text(&self) -> Option<&str> {
		self.current().map(|t| t.text.as_str())
	}

	/// Line of the current token, or of the last token at end of stream.
	pub fn line(&self) -> u32 {
		self.current().map_or(self.last_line, |t| t.line)
	}

	pub fn advance(&mut self) -> &mut Self {
		if self.pos < self.tokens.len() {
			self.pos += 1;
		}
		self
	}

	pub fn back(&mut self) -> &mut Self {
		self.pos = self.pos.saturating_sub(1);
		self
	}

	/// Jumps to the end-of-stream position.
	pub fn end(&mut self) -> &mut Self {
		self.pos = self.tokens.len();
		self
	}

	pub fn is(&self, expects: &[Expect]) -> bool {
		self.current().is_some_and(|t| matches_any(expects, t))
	}

	pub fn is_next(&self, expects: &[Expect]) -> bool {
		self.peek().is_some_and(|t| matches_any(expects, t))
	}

	pub fn is_prev(&self, expects: &[Expect]) -> bool {
		self.previous().is_some_and(|t| matches_any(expects, t))
	}

	/// Advances one token and requires the new current token to match.
	pub fn expect_one_of(&mut self, expects: &[Expect]) -> Result<&Token, UnexpectedToken> {
		self.advance();
		self.need(expects)?;
		Ok(&self.tokens[self.pos])
	}

	/// Advances one token, requires it to match, and consumes it.
	pub fn expect_and_consume(&mut self, expects: &[Expect]) -> Result<String, UnexpectedToken> {
		self.advance();
		self.take(expects)
	}

	/// Advances past the current token only if it matches.
	pub fn advance_if_one_of(&mut self, expects: &[Expect]) -> bool {
		let hit = self.is(expects);
		if hit {
			self.advance();
		}
		hit
	}

	/// Requires the current token to match without moving.
	pub fn need(&self, expects: &[Expect]) -> Result<&Token, UnexpectedToken> {
		match self.current() {
			Some(token) if matches_any(expects, token) => Ok(token),
			_ => Err(self.unexpected(expects)),
		}
	}

	/// Requires the current token to match, returns its text and moves past it.
	pub fn take(&mut self, expects: &[Expect]) -> Result<String, UnexpectedToken> {
		let text = self.need(expects)?.text.clone();
		self.advance();
		Ok(text)
	}

	/// Returns the current token's text and moves past it, whatever it is.
	pub fn take_any(&mut self) -> Result<String, UnexpectedToken> {
		let text = self
			.current()
			.map(|t| t.text.clone())
			.ok_or_else(|| self.unexpected(&[]))?;
		self.advance();
		Ok(text)
	}

	/// Requires the current token to be the bare word `word` and moves past it.
	pub fn take_keyword(&mut self, word: &str) -> Result<(), UnexpectedToken> {
		match self.current() {
			Some(t) if t.kind == TokenKind::Name && t.text == word => {
				self.advance();
				Ok(())
			}
			_ => {
				let mut err = self.unexpected(&[]);
				err.message = self.describe(Some(word));
				err.expected = Some(word.to_string());
				Err(err)
			}
		}
	}

	/// Concatenates text and trailing whitespace from the cursor up to (not
	/// including) the first token matching `stops`, or to the end of stream.
	///
	/// Leaves the cursor on the stop token.
	pub fn collect_until(&mut self, stops: &[Expect]) -> String {
		let mut out = String::new();
		while let Some(token) = self.current() {
			if matches_any(stops, token) {
				break;
			}
			out.push_str(&token.text);
			out.push_str(&token.whitespace);
			self.pos += 1;
		}
		out
	}

	/// Source text of tokens `offset..offset + limit` (to the end when `limit`
	/// is `None`), without moving the cursor.
	pub fn substr(&self, offset: usize, limit: Option<usize>) -> String {
		let start = offset.min(self.tokens.len());
		let end = limit.map_or(self.tokens.len(), |l| (start + l).min(self.tokens.len()));
		self.tokens[start..end]
			.iter()
			.flat_map(|t| [t.text.as_str(), t.whitespace.as_str()])
			.collect()
	}

	/// Keeps only the tokens `keep` accepts.
	pub fn filter(&mut self, mut keep: impl FnMut(&Token) -> bool) {
		self.tokens.retain(|t| keep(t));
		self.pos = self.pos.min(self.tokens.len());
	}

	/// Re-lexes the text from `offset` onward with `text` appended, replacing
	/// every token from `offset` on.
	///
	/// A cursor past `offset` is moved back to it.
	pub fn splice(&mut self, offset: usize, text: &str) {
		let offset = offset.min(self.tokens.len());
		let line = self.tokens.get(offset).map_or(self.last_line, |t| t.line);
		let mut source = self.substr(offset, None);
		source.push_str(text);
		self.tokens.truncate(offset);

		let body = source.trim_start();
		let leading = &source[..source.len() - body.len()];
		if let Some(last) = self.tokens.last_mut() {
			last.whitespace.push_str(leading);
		}
		let leading_lines = leading.bytes().filter(|b| *b == b'\n').count() as u32;
		self.tokens.extend(tokenize_from(body, line + leading_lines));

		if self.pos > offset {
			self.pos = offset;
		}
		self.last_line = self.tokens.last().map_or(line, |t| t.line);
	}

	/// Describes the current token for an error message.
	pub fn describe(&self, expected: Option<&str>) -> String {
		let suffix = expected
			.map(|e| format!(", expected '{e}'"))
			.unwrap_or_default();
		match self.current() {
			None => format!("unexpected end of expression{suffix}"),
			Some(t) => format!("unexpected token '{}'{suffix}", t.text),
		}
	}

	/// Up to `before` tokens before the cursor, the current token, and up to
	/// `after` tokens after it.
	pub fn snippet(&self, before: usize, after: usize) -> &[Token] {
		let Some(max) = self.tokens.len().checked_sub(1) else {
			return &[];
		};
		let anchor = self.pos.min(max);
		let from = anchor.saturating_sub(before);
		let to = (anchor + after).min(max);
		&self.tokens[from..=to]
	}

	/// [`Tokens::snippet`] rendered back to text, newlines shown as `↵`.
	pub fn snippet_string(&self, before: usize, after: usize) -> String {
		let text: String = self
			.snippet(before, after)
			.iter()
			.flat_map(|t| [t.text.as_str(), t.whitespace.as_str()])
			.collect();
		text.replace('\n', "↵").trim().to_string()
	}

	/// Builds the error for the current token not matching `expects`.
	pub fn unexpected(&self, expects: &[Expect]) -> UnexpectedToken {
		let expected = single_label(expects);
		UnexpectedToken {
			message: self.describe(expected.as_deref()),
			found: self.current().map(|t| t.text.clone()),
			line: self.line(),
			expected,
			snippet: self.snippet_string(SNIPPET_CONTEXT, SNIPPET_CONTEXT),
		}
	}
}
