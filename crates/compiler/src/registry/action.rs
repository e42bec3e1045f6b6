//! Action descriptors and handler types.

use std::fmt;

use aspect_lexer::Tokens;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::Context;
use crate::error::HandlerResult;
use crate::frame::Frame;

/// Compiles a whole inline tag, e.g. `{var $x = 1}`.
pub type ParseHandler = fn(&mut Tokens, &Context<'_>) -> HandlerResult;

/// Compiles the opener, a child tag, or the closer of a block.
///
/// Receives the block's own frame; it may record state there for later tags
/// of the same block.
pub type BlockHandler = fn(&mut Tokens, &mut Frame<'_>, &Context<'_>) -> HandlerResult;

/// The four shapes a registered tag can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
	InlineCompiler,
	BlockCompiler,
	InlineFunction,
	BlockFunction,
}

impl ActionKind {
	/// Returns `true` for kinds that open a block and need a closing tag.
	pub fn is_block(self) -> bool {
		matches!(self, Self::BlockCompiler | Self::BlockFunction)
	}
}

impl fmt::Display for ActionKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::InlineCompiler => "an inline compiler",
			Self::BlockCompiler => "a block compiler",
			Self::InlineFunction => "an inline function",
			Self::BlockFunction => "a block function",
		})
	}
}

/// How an inline function's arguments are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunctionParser {
	/// Named `key=value` arguments only.
	#[default]
	Standard,
	/// Named arguments plus bare positional expressions.
	Smart,
}

/// Handlers of a block compiler.
#[derive(Clone)]
pub struct BlockCompiler {
	pub open: BlockHandler,
	pub close: BlockHandler,
	/// Child tags this block owns.
	pub tags: FxHashMap<String, BlockHandler>,
	/// Child tags that may appear inside nested blocks.
	pub floating: FxHashSet<String>,
}

impl BlockCompiler {
	pub fn new(open: BlockHandler, close: BlockHandler) -> Self {
		Self {
			open,
			close,
			tags: FxHashMap::default(),
			floating: FxHashSet::default(),
		}
	}

	/// Adds a child tag that must appear directly inside this block.
	pub fn tag(mut self, name: &str, handler: BlockHandler) -> Self {
		self.tags.insert(name.to_string(), handler);
		self
	}

	/// Adds a child tag that may appear at any depth below this block.
	pub fn floating_tag(mut self, name: &str, handler: BlockHandler) -> Self {
		self.floating.insert(name.to_string());
		self.tag(name, handler)
	}
}

/// What a registered tag does.
#[derive(Clone)]
pub enum Behavior {
	InlineCompiler(ParseHandler),
	BlockCompiler(BlockCompiler),
	InlineFunction {
		/// Runtime symbol the call is emitted against.
		function: String,
		parser: FunctionParser,
	},
	BlockFunction {
		/// Runtime symbol receiving the captured body and the arguments.
		function: String,
		open: BlockHandler,
		close: BlockHandler,
	},
}

/// A registered tag.
#[derive(Clone)]
pub struct Action {
	name: String,
	behavior: Behavior,
}

impl fmt::Debug for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Action")
			.field("name", &self.name)
			.field("kind", &self.kind())
			.finish_non_exhaustive()
	}
}

impl Action {
	pub fn new(name: impl Into<String>, behavior: Behavior) -> Self {
		Self {
			name: name.into(),
			behavior,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn behavior(&self) -> &Behavior {
		&self.behavior
	}

	pub fn kind(&self) -> ActionKind {
		match self.behavior {
			Behavior::InlineCompiler(_) => ActionKind::InlineCompiler,
			Behavior::BlockCompiler(_) => ActionKind::BlockCompiler,
			Behavior::InlineFunction { .. } => ActionKind::InlineFunction,
			Behavior::BlockFunction { .. } => ActionKind::BlockFunction,
		}
	}

	/// Runtime symbol of a function action.
	pub fn function(&self) -> Option<&str> {
		match &self.behavior {
			Behavior::InlineFunction { function, .. } | Behavior::BlockFunction { function, .. } => {
				Some(function.as_str())
			}
			_ => None,
		}
	}

	/// Handler for child tag `tag`, when this action owns it.
	pub fn child(&self, tag: &str) -> Option<BlockHandler> {
		match &self.behavior {
			Behavior::BlockCompiler(block) => block.tags.get(tag).copied(),
			_ => None,
		}
	}

	pub fn owns(&self, tag: &str) -> bool {
		self.child(tag).is_some()
	}

	pub fn is_floating(&self, tag: &str) -> bool {
		match &self.behavior {
			Behavior::BlockCompiler(block) => block.floating.contains(tag),
			_ => false,
		}
	}

	pub(crate) fn close_handler(&self) -> Option<BlockHandler> {
		match &self.behavior {
			Behavior::BlockCompiler(block) => Some(block.close),
			Behavior::BlockFunction { close, .. } => Some(*close),
			_ => None,
		}
	}
}
