use aspect_lexer::{Expect, Tokens};

use crate::context::Context;
use crate::error::{CompileErrorKind, HandlerResult};
use crate::frame::Frame;

const SEEN_ELSE: &str = "else";

/// `{foreach $list as $value}` or `{foreach $list as $key => $value}`.
pub(super) fn foreach_open(
	tokens: &mut Tokens,
	_: &mut Frame<'_>,
	cx: &Context<'_>,
) -> HandlerResult {
	let list = cx.expression(tokens)?;
	tokens.take_keyword("as")?;
	let first = loop_variable(tokens)?;
	let (key, value) = if tokens.advance_if_one_of(&[Expect::punct("=>")]) {
		(first, loop_variable(tokens)?)
	} else {
		("_".to_string(), first)
	};
	Ok(format!("foreach {list} {key} {value}"))
}

pub(super) fn foreach_else(
	_: &mut Tokens,
	frame: &mut Frame<'_>,
	_: &Context<'_>,
) -> HandlerResult {
	once_else(frame, "foreachelse")
}

/// `{for $i = 1 to 10 step 2}`; `step` defaults to 1.
pub(super) fn for_open(tokens: &mut Tokens, _: &mut Frame<'_>, cx: &Context<'_>) -> HandlerResult {
	let var = loop_variable(tokens)?;
	tokens.take(&[Expect::punct("=")])?;
	let from = cx.expression(tokens)?;
	tokens.take_keyword("to")?;
	let to = cx.expression(tokens)?;
	if tokens.is_end() {
		tokens.splice(tokens.len(), " step 1");
	}
	tokens.take_keyword("step")?;
	let step = cx.expression(tokens)?;
	Ok(format!("for {var} {from} {to} {step}"))
}

pub(super) fn for_else(_: &mut Tokens, frame: &mut Frame<'_>, _: &Context<'_>) -> HandlerResult {
	once_else(frame, "forelse")
}

pub(super) fn while_open(
	tokens: &mut Tokens,
	_: &mut Frame<'_>,
	cx: &Context<'_>,
) -> HandlerResult {
	Ok(format!("while {}", cx.expression(tokens)?))
}

fn loop_variable(tokens: &mut Tokens) -> Result<String, CompileErrorKind> {
	let name = tokens.need(&[Expect::VARIABLE])?.name().to_string();
	tokens.advance();
	Ok(name)
}

fn once_else(frame: &mut Frame<'_>, tag: &str) -> HandlerResult {
	if frame.has(SEEN_ELSE) {
		return Err(CompileErrorKind::invalid(tag, "already used in this block"));
	}
	frame.set(SEEN_ELSE, "");
	Ok(tag.to_string())
}
