//! Single-pass template compiler.
//!
//! The source is scanned for `{...}` tags. Literal text between tags becomes
//! `text` statements; each tag body is tokenised and dispatched to the action,
//! child tag or expression it names. Open blocks live on a stack of
//! [`Frame`]s, so closing and child tags always resolve against the innermost
//! block that accepts them.

use aspect_lexer::{Expect, TokenKind, Tokens};
use tracing::{debug, trace};

use crate::context::{Context, quote};
use crate::error::{CompileError, CompileErrorKind, HandlerResult};
use crate::frame::Frame;
use crate::options::Options;
use crate::registry::{Action, Behavior, BlockCompiler, BlockHandler, FunctionParser, Registry};


const IGNORE_CLOSE: &str = "{/ignore}";

/// A compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
	pub name: String,
	/// Render script, one statement per line.
	pub code: String,
}

/// Compiles template sources against a [`Registry`] under fixed options.
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'r> {
	cx: Context<'r>,
}

impl<'r> Compiler<'r> {
	pub fn new(registry: &'r Registry, options: Options) -> Self {
		Self {
			cx: Context::new(registry, options),
		}
	}

	/// Compiles `source`, reporting errors against template `name`.
	pub fn compile(&self, name: &str, source: &str) -> Result<Compiled, CompileError> {
		debug!(template = name, bytes = source.len(), "compiling template");
		let mut pass = Pass {
			cx: self.cx,
			template: name,
			frames: Vec::new(),
			out: Output::default(),
		};
		if let Err(err) = pass.run(source) {
			debug!(template = name, line = err.line, error = %err.kind, "compile failed");
			return Err(err);
		}
		Ok(Compiled {
			name: name.to_string(),
			code: pass.out.code,
		})
	}
}

/// State of one compile.
struct Pass<'c, 'r> {
	cx: Context<'r>,
	template: &'c str,
	frames: Vec<Frame<'r>>,
	out: Output,
}

impl<'r> Pass<'_, 'r> {
	fn run(&mut self, source: &str) -> Result<(), CompileError> {
		let mut rest = source;
		let mut line = 1;
		let mut text = String::new();

		while let Some(open) = rest.find('{') {
			let before = &rest[..open];
			let after = &rest[open + 1..];
			text.push_str(before);
			line += count_newlines(before);

			if after.chars().next().is_none_or(char::is_whitespace) {
				text.push('{');
				rest = after;
				continue;
			}

			if let Some(comment) = after.strip_prefix('*') {
				let end = comment.find("*}").ok_or_else(|| {
					self.error(CompileErrorKind::UnterminatedTag { what: "comment" }, line)
				})?;
				line += count_newlines(&comment[..end]);
				rest = &comment[end + 2..];
				continue;
			}

			let end = tag_end(after).ok_or_else(|| {
				self.error(CompileErrorKind::UnterminatedTag { what: "tag" }, line)
			})?;
			let body = &after[..end];
			rest = &after[end + 1..];

			if body.trim_end() == "ignore" {
				let close = rest.find(IGNORE_CLOSE).ok_or_else(|| {
					let kind = CompileErrorKind::UnclosedBlock {
						tag: "ignore".to_string(),
						line,
					};
					self.error(kind, line)
				})?;
				text.push_str(&rest[..close]);
				line += count_newlines(body) + count_newlines(&rest[..close]);
				rest = &rest[close + IGNORE_CLOSE.len()..];
				continue;
			}

			self.out.text(&mut text);
			self.tag(body, line)?;
			line += count_newlines(body);
		}

		text.push_str(rest);
		self.out.text(&mut text);

		match self.frames.last() {
			Some(frame) => {
				let kind = CompileErrorKind::UnclosedBlock {
					tag: frame.name.clone(),
					line: frame.line,
				};
				Err(self.error(kind, frame.line))
			}
			None => Ok(()),
		}
	}

	fn error(&self, kind: CompileErrorKind, line: u32) -> CompileError {
		CompileError {
			template: self.template.to_string(),
			line: kind.line().unwrap_or(line),
			kind,
		}
	}

	fn tag(&mut self, body: &str, line: u32) -> Result<(), CompileError> {
		trace!(template = self.template, line, tag = body, "tag");
		let mut tokens = Tokens::with_line(body, line);
		tokens.filter(|t| t.kind != TokenKind::Comment);
		self.dispatch(&mut tokens, line)
			.map_err(|kind| self.error(kind, line))
	}

	fn dispatch(&mut self, tokens: &mut Tokens, line: u32) -> Result<(), CompileErrorKind> {
		let code = if tokens.is(&[Expect::punct("/")]) && tokens.is_next(&[Expect::NAME]) {
			tokens.advance();
			let name = tokens.take_any()?;
			self.close(&name, tokens)?
		} else if let Some(name) = tag_name(tokens) {
			self.named(&name, tokens, line)?
		} else {
			format!("echo {}", self.cx.expression(tokens)?)
		};
		if !tokens.is_end() {
			return Err(tokens.unexpected(&[]).into());
		}
		self.out.emit(line, &code);
		Ok(())
	}

	/// Resolves `{name ...}`: a child tag of an open block first, then a
	/// registered action, then a function call expression.
	fn named(&mut self, name: &str, tokens: &mut Tokens, line: u32) -> HandlerResult {
		if let Some((index, handler)) = self.owner_of(name)? {
			tokens.advance();
			return handler(tokens, &mut self.frames[index], &self.cx);
		}

		let registry = self.cx.registry();
		if let Some(action) = registry.lookup(name) {
			tokens.advance();
			return self.action(action, tokens, line);
		}

		if tokens.is_next(&[Expect::punct("(")]) {
			return Ok(format!("echo {}", self.cx.expression(tokens)?));
		}

		let owners = registry.owners_of(name);
		if !owners.is_empty() {
			return Err(CompileErrorKind::OrphanTag {
				tag: name.to_string(),
				owners: owners.into_iter().map(str::to_string).collect(),
			});
		}
		Err(CompileErrorKind::UnknownTag {
			tag: name.to_string(),
			suggestion: registry.suggest_tag(name),
		})
	}

	/// Innermost open block owning child tag `tag`.
	///
	/// Only the top frame may own a non-floating tag; finding the owner deeper
	/// in the stack is an error.
	fn owner_of(&self, tag: &str) -> Result<Option<(usize, BlockHandler)>, CompileErrorKind> {
		let top = self.frames.len().saturating_sub(1);
		for (index, frame) in self.frames.iter().enumerate().rev() {
			let Some(handler) = frame.action.child(tag) else {
				continue;
			};
			if index == top || frame.action.is_floating(tag) {
				return Ok(Some((index, handler)));
			}
			return Err(CompileErrorKind::MisplacedTag {
				tag: tag.to_string(),
				owner: frame.name.clone(),
				owner_line: frame.line,
				inside: self.frames[top].name.clone(),
			});
		}
		Ok(None)
	}

	fn action(&mut self, action: &'r Action, tokens: &mut Tokens, line: u32) -> HandlerResult {
		match action.behavior() {
			Behavior::InlineCompiler(parse) => parse(tokens, &self.cx),
			Behavior::InlineFunction { function, parser } => {
				let params = self.cx.params(tokens, *parser == FunctionParser::Smart)?;
				Ok(format!("echo (call {function} {params})"))
			}
			Behavior::BlockCompiler(BlockCompiler { open, .. })
			| Behavior::BlockFunction { open, .. } => {
				let mut frame = Frame::new(action, line);
				let code = open(tokens, &mut frame, &self.cx)?;
				self.frames.push(frame);
				Ok(code)
			}
		}
	}

	fn close(&mut self, name: &str, tokens: &mut Tokens) -> HandlerResult {
		if let Some(action) = self.cx.registry().lookup(name)
			&& !action.kind().is_block()
		{
			return Err(CompileErrorKind::TagKindMismatch {
				tag: name.to_string(),
				kind: action.kind(),
				usage: "closed",
			});
		}
		let mut frame = match self.frames.pop() {
			Some(frame) if frame.action.name() == name => frame,
			Some(frame) => {
				return Err(CompileErrorKind::MismatchedClose {
					tag: name.to_string(),
					open: Some((frame.name, frame.line)),
				});
			}
			None => {
				return Err(CompileErrorKind::MismatchedClose {
					tag: name.to_string(),
					open: None,
				});
			}
		};
		let close = frame
			.action
			.close_handler()
			.ok_or_else(|| CompileErrorKind::invalid(name, "has no closing handler"))?;
		close(tokens, &mut frame, &self.cx)
	}
}

/// Generated code with line markers.
#[derive(Debug, Default)]
struct Output {
	code: String,
	line: Option<u32>,
}

impl Output {
	/// Emits pending literal text and clears it.
	fn text(&mut self, text: &mut String) {
		if text.is_empty() {
			return;
		}
		self.push(&format!("text {}", quote(text)));
		text.clear();
	}

	/// Emits a handler's fragment, preceded by a marker when the source line
	/// changed since the last fragment.
	fn emit(&mut self, line: u32, code: &str) {
		if code.is_empty() {
			return;
		}
		if self.line != Some(line) {
			self.push(&format!("@{line}"));
			self.line = Some(line);
		}
		for statement in code.lines() {
			self.push(statement);
		}
	}

	fn push(&mut self, statement: &str) {
		self.code.push_str(statement);
		self.code.push('\n');
	}
}

/// Name a tag starts with, unless it is a literal like `true`.
fn tag_name(tokens: &Tokens) -> Option<String> {
	tokens
		.current()
		.filter(|t| t.kind == TokenKind::Name && !t.is_special_value())
		.map(|t| t.text.clone())
}

/// Byte offset of the `}` ending a tag body: the first one outside quotes at
/// brace depth zero.
fn tag_end(body: &str) -> Option<usize> {
	let mut depth = 0usize;
	let mut quote = None;
	let mut escaped = false;
	for (i, ch) in body.char_indices() {
		if let Some(q) = quote {
			if escaped {
				escaped = false;
			} else if ch == '\\' {
				escaped = true;
			} else if ch == q {
				quote = None;
			}
			continue;
		}
		match ch {
			'"' | '\'' => quote = Some(ch),
			'{' => depth += 1,
			'}' if depth == 0 => return Some(i),
			'}' => depth -= 1,
			_ => {}
		}
	}
	None
}

fn count_newlines(text: &str) -> u32 {
	text.bytes().filter(|b| *b == b'\n').count() as u32
}
