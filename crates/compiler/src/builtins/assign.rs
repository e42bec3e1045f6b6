use aspect_lexer::{Class, Tokens};

use crate::context::Context;
use crate::error::HandlerResult;

/// `{var $x = expr}` and compound forms such as `{var $x += 1}`.
pub(super) fn var(tokens: &mut Tokens, cx: &Context<'_>) -> HandlerResult {
	let target = cx.target(tokens)?;
	let op = tokens.take(&[Class::Equals.into()])?;
	let value = cx.expression(tokens)?;
	Ok(match op.strip_suffix('=').filter(|base| !base.is_empty()) {
		Some(base) => format!("set {target} ({base} {target} {value})"),
		None => format!("set {target} {value}"),
	})
}
