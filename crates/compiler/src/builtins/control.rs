use aspect_lexer::Tokens;

use crate::context::Context;
use crate::error::{CompileErrorKind, HandlerResult};
use crate::frame::Frame;

const SEEN_ELSE: &str = "else";
const SEEN_DEFAULT: &str = "default";

pub(super) fn if_open(tokens: &mut Tokens, _: &mut Frame<'_>, cx: &Context<'_>) -> HandlerResult {
	Ok(format!("if {}", cx.expression(tokens)?))
}

pub(super) fn if_elseif(
	tokens: &mut Tokens,
	frame: &mut Frame<'_>,
	cx: &Context<'_>,
) -> HandlerResult {
	if frame.has(SEEN_ELSE) {
		return Err(CompileErrorKind::invalid("elseif", "follows {else}"));
	}
	Ok(format!("elseif {}", cx.expression(tokens)?))
}

pub(super) fn if_else(_: &mut Tokens, frame: &mut Frame<'_>, _: &Context<'_>) -> HandlerResult {
	if frame.has(SEEN_ELSE) {
		return Err(CompileErrorKind::invalid("else", "already used in this block"));
	}
	frame.set(SEEN_ELSE, "");
	Ok("else".to_string())
}

pub(super) fn switch_open(
	tokens: &mut Tokens,
	_: &mut Frame<'_>,
	cx: &Context<'_>,
) -> HandlerResult {
	Ok(format!("switch {}", cx.expression(tokens)?))
}

pub(super) fn switch_case(
	tokens: &mut Tokens,
	frame: &mut Frame<'_>,
	cx: &Context<'_>,
) -> HandlerResult {
	if frame.has(SEEN_DEFAULT) {
		return Err(CompileErrorKind::invalid("case", "follows {default}"));
	}
	Ok(format!("case {}", cx.expression(tokens)?))
}

pub(super) fn switch_default(
	_: &mut Tokens,
	frame: &mut Frame<'_>,
	_: &Context<'_>,
) -> HandlerResult {
	if frame.has(SEEN_DEFAULT) {
		return Err(CompileErrorKind::invalid("default", "already used in this block"));
	}
	frame.set(SEEN_DEFAULT, "");
	Ok("default".to_string())
}
