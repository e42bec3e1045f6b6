//! Built-in tags.
//!
//! | tag | kind | children (`*` floating) |
//! |---|---|---|
//! | `foreach` | block | `foreachelse`, `break`*, `continue`* |
//! | `for` | block | `forelse`, `break`*, `continue`* |
//! | `while` | block | `break`*, `continue`* |
//! | `if` | block | `elseif`, `else` |
//! | `switch` | block | `case`, `default`, `break`* |
//! | `block` | block | |
//! | `var`, `include`, `extends` | inline | |
//! | `capture` | block function | |
//! | `mailto` | inline function | |

mod assign;
mod control;
mod loops;
mod template;

use aspect_lexer::Tokens;

use crate::context::Context;
use crate::error::{CompileErrorKind, HandlerResult};
use crate::frame::Frame;
use crate::registry::{BlockCompiler, FunctionParser, RegistryBuilder};

pub(crate) fn register(builder: &mut RegistryBuilder) {
	builder
		.add_block_compiler(
			"foreach",
			BlockCompiler::new(loops::foreach_open, end)
				.tag("foreachelse", loops::foreach_else)
				.floating_tag("break", loop_break)
				.floating_tag("continue", loop_continue),
		)
		.add_block_compiler(
			"for",
			BlockCompiler::new(loops::for_open, end)
				.tag("forelse", loops::for_else)
				.floating_tag("break", loop_break)
				.floating_tag("continue", loop_continue),
		)
		.add_block_compiler(
			"while",
			BlockCompiler::new(loops::while_open, end)
				.floating_tag("break", loop_break)
				.floating_tag("continue", loop_continue),
		)
		.add_block_compiler(
			"if",
			BlockCompiler::new(control::if_open, end)
				.tag("elseif", control::if_elseif)
				.tag("else", control::if_else),
		)
		.add_block_compiler(
			"switch",
			BlockCompiler::new(control::switch_open, end)
				.tag("case", control::switch_case)
				.tag("default", control::switch_default)
				.floating_tag("break", loop_break),
		)
		.add_block_compiler(
			"block",
			BlockCompiler::new(template::block_open, end),
		)
		.add_compiler("var", assign::var)
		.add_compiler("include", template::include)
		.add_compiler("extends", template::extends)
		.add_block_function("capture", "Func::capture", None, None)
		.add_function("mailto", "Func::mailto", FunctionParser::Standard);
}

/// Closes any block compiler.
fn end(_: &mut Tokens, _: &mut Frame<'_>, _: &Context<'_>) -> HandlerResult {
	Ok("end".to_string())
}

fn loop_break(_: &mut Tokens, _: &mut Frame<'_>, _: &Context<'_>) -> HandlerResult {
	Ok("break".to_string())
}

fn loop_continue(_: &mut Tokens, _: &mut Frame<'_>, _: &Context<'_>) -> HandlerResult {
	Ok("continue".to_string())
}

/// Default block-function opener: compiles the arguments and starts
/// capturing the body.
pub(crate) fn function_open(
	tokens: &mut Tokens,
	frame: &mut Frame<'_>,
	cx: &Context<'_>,
) -> HandlerResult {
	let params = cx.params(tokens, false)?;
	frame.set("params", params);
	Ok("begin".to_string())
}

/// Default block-function closer: hands the captured body and the opener's
/// arguments to the function.
pub(crate) fn function_close(
	_: &mut Tokens,
	frame: &mut Frame<'_>,
	_: &Context<'_>,
) -> HandlerResult {
	let Some(function) = frame.action.function() else {
		return Err(CompileErrorKind::invalid(&frame.name, "not a block function"));
	};
	let params = frame.get("params").unwrap_or("(params)");
	Ok(format!("finish {function} {params}"))
}
