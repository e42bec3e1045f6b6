use aspect_lexer::{Expect, Tokens};

use crate::context::{Context, quote};
use crate::error::HandlerResult;
use crate::frame::Frame;
use crate::options::Options;

/// `{include "file.tpl" name=value ...}`.
///
/// With [`Options::FORCE_INCLUDE`], a literal template name is embedded at
/// compile time rather than loaded on render.
pub(super) fn include(tokens: &mut Tokens, cx: &Context<'_>) -> HandlerResult {
	let name = cx.expression(tokens)?;
	let params = cx.params(tokens, false)?;
	let verb = if name.starts_with('"') && cx.options().contains(Options::FORCE_INCLUDE) {
		"embed"
	} else {
		"include"
	};
	Ok(format!("{verb} {name} {params}"))
}

/// `{extends "layout.tpl"}`.
pub(super) fn extends(tokens: &mut Tokens, cx: &Context<'_>) -> HandlerResult {
	Ok(format!("extends {}", cx.expression(tokens)?))
}

/// `{block header}` or `{block "header"}`; the name is taken verbatim.
pub(super) fn block_open(
	tokens: &mut Tokens,
	_: &mut Frame<'_>,
	_: &Context<'_>,
) -> HandlerResult {
	let name = match tokens.current().and_then(|t| t.unquote()) {
		Some(name) => {
			tokens.advance();
			name
		}
		None => tokens.collect_until(&[]).trim().to_string(),
	};
	if name.is_empty() {
		return Err(tokens.unexpected(&[Expect::NAME]).into());
	}
	Ok(format!("block {}", quote(&name)))
}
