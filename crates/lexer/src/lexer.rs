use crate::class::{PUNCTUATION, WORD_OPERATORS};
use crate::token::{Token, TokenKind};


/// Splits `source` into tokens, numbering lines from 1.
pub fn tokenize(source: &str) -> Vec<Token> {
	tokenize_from(source, 1)
}

/// Splits `source` into tokens, numbering lines from `first_line`.
///
/// Whitespace is folded into the preceding token. Leading whitespace has no
/// token to attach to and is dropped, though its newlines still advance the
/// line counter.
pub fn tokenize_from(source: &str, first_line: u32) -> Vec<Token> {
	let mut lexer = Lexer {
		src: source,
		pos: 0,
		line: first_line,
		tokens: Vec::new(),
	};
	lexer.run();
	lexer.tokens
}

struct Lexer<'a> {
	src: &'a str,
	pos: usize,
	line: u32,
	tokens: Vec<Token>,
}

impl Lexer<'_> {
	fn run(&mut self) {
		loop {
			self.whitespace();
			let Some(ch) = self.peek(0) else {
				break;
			};
			let start = self.pos;
			let line = self.line;
			let kind = self.token(ch);
			let text = &self.src[start..self.pos];
			self.line += count_newlines(text);
			self.tokens.push(Token::new(kind, text, line));
		}
	}

	fn peek(&self, n: usize) -> Option<char> {
		self.src[self.pos..].chars().nth(n)
	}

	fn rest(&self) -> &str {
		&self.src[self.pos..]
	}

	fn bump(&mut self) -> Option<char> {
		let ch = self.peek(0)?;
		self.pos += ch.len_utf8();
		Some(ch)
	}

	fn bump_while(&mut self, predicate: impl Fn(char) -> bool) {
		while let Some(ch) = self.peek(0)
			&& predicate(ch)
		{
			self.pos += ch.len_utf8();
		}
	}

	fn whitespace(&mut self) {
		let start = self.pos;
		self.bump_while(char::is_whitespace);
		if start == self.pos {
			return;
		}
		let ws = &self.src[start..self.pos];
		self.line += count_newlines(ws);
		if let Some(last) = self.tokens.last_mut() {
			last.whitespace.push_str(ws);
		}
	}

	fn token(&mut self, ch: char) -> TokenKind {
		match ch {
			'$' if self.peek(1).is_some_and(is_ident_start) => {
				self.bump();
				self.bump_while(is_ident_continue);
				TokenKind::Variable
			}
			c if is_ident_start(c) => self.word(),
			c if c.is_ascii_digit() => self.number(),
			'"' | '\'' => self.string(ch),
			'/' if self.peek(1) == Some('*') => self.comment(),
			_ => self.punct(),
		}
	}

	fn word(&mut self) -> TokenKind {
		let start = self.pos;
		self.bump_while(is_ident_continue);
		let word = &self.src[start..self.pos];
		match WORD_OPERATORS.iter().copied().find(|op| *op == word) {
			Some(op) => TokenKind::Punct(op),
			None => TokenKind::Name,
		}
	}

	fn number(&mut self) -> TokenKind {
		self.bump_while(|c| c.is_ascii_digit());
		let mut kind = TokenKind::Int;
		if self.peek(0) == Some('.') && self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
			self.bump();
			self.bump_while(|c| c.is_ascii_digit());
			kind = TokenKind::Float;
		}
		if matches!(self.peek(0), Some('e' | 'E')) {
			let digits_at = match self.peek(1) {
				Some('+' | '-') => 2,
				_ => 1,
			};
			if self.peek(digits_at).is_some_and(|c| c.is_ascii_digit()) {
				for _ in 0..digits_at {
					self.bump();
				}
				self.bump_while(|c| c.is_ascii_digit());
				kind = TokenKind::Float;
			}
		}
		kind
	}

	fn string(&mut self, quote: char) -> TokenKind {
		self.bump();
		while let Some(ch) = self.bump() {
			match ch {
				'\\' => {
					self.bump();
				}
				c if c == quote => return TokenKind::Str,
				_ => {}
			}
		}
		TokenKind::Other
	}

	fn comment(&mut self) -> TokenKind {
		match self.src[self.pos + 2..].find("*/") {
			Some(end) => {
				self.pos += 2 + end + 2;
				TokenKind::Comment
			}
			None => {
				self.pos = self.src.len();
				TokenKind::Other
			}
		}
	}

	fn punct(&mut self) -> TokenKind {
		let rest = self.rest();
		if let Some(p) = PUNCTUATION.iter().copied().find(|p| rest.starts_with(p)) {
			self.pos += p.len();
			return TokenKind::Punct(p);
		}
		self.bump();
		TokenKind::Other
	}
}

fn is_ident_start(ch: char) -> bool {
	ch == '_' || ch.is_alphabetic()
}

fn is_ident_continue(ch: char) -> bool {
	ch == '_' || ch.is_alphanumeric()
}

fn count_newlines(text: &str) -> u32 {
	text.bytes().filter(|b| *b == b'\n').count() as u32
}
