use aspect_lexer::UnexpectedToken;

use crate::registry::ActionKind;

/// A template failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} in {template} on line {line}")]
pub struct CompileError {
	/// Name of the template being compiled.
	pub template: String,
	/// 1-based source line the failure was detected on.
	pub line: u32,
	pub kind: CompileErrorKind,
}

/// What went wrong while compiling a tag.
///
/// Tag handlers return this; the compiler attaches the template name and line
/// to produce a [`CompileError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileErrorKind {
	/// A tag body did not parse.
	#[error(transparent)]
	UnexpectedToken(#[from] UnexpectedToken),
	/// The template ended while a block was still open.
	#[error("unclosed tag {{{tag}}} opened on line {line}")]
	UnclosedBlock { tag: String, line: u32 },
	/// A closing tag does not match the innermost open block.
	#[error("unexpected closing tag {{/{tag}}}: {}", describe_open(open))]
	MismatchedClose {
		tag: String,
		/// The block actually open, with its opening line.
		open: Option<(String, u32)>,
	},
	/// No action, child tag or function has this name.
	#[error("unknown tag {{{tag}}}{}", suggestion.as_ref().map(|s| format!(" (did you mean {{{s}}}?)")).unwrap_or_default())]
	UnknownTag {
		tag: String,
		suggestion: Option<String>,
	},
	/// An action was used in a form its kind does not support.
	#[error("{{{tag}}} is {kind} and cannot be {usage}")]
	TagKindMismatch {
		tag: String,
		kind: ActionKind,
		usage: &'static str,
	},
	/// A call was rejected by the active options or the allow-list.
	#[error("call to '{name}' is not allowed")]
	DisallowedCall { name: String },
	/// A `|name` modifier has no registration and is no allowed function.
	#[error("unknown modifier '{name}'")]
	UnknownModifier { name: String },
	/// A child tag appeared with none of its owning blocks open.
	#[error("{{{tag}}} is only valid inside {}", owners.iter().map(|o| format!("{{{o}}}")).collect::<Vec<_>>().join(", "))]
	OrphanTag { tag: String, owners: Vec<String> },
	/// A non-floating child tag appeared below a nested block.
	#[error("{{{tag}}} must be a direct child of {{{owner}}} (line {owner_line}), found inside {{{inside}}}")]
	MisplacedTag {
		tag: String,
		owner: String,
		owner_line: u32,
		inside: String,
	},
	/// A tag, comment or raw region was never closed.
	#[error("unterminated {what}")]
	UnterminatedTag { what: &'static str },
	/// A child tag is known but not valid in its block's current state.
	#[error("invalid {{{tag}}}: {reason}")]
	InvalidTag { tag: String, reason: String },
}

impl CompileErrorKind {
	/// Line carried by the error itself, when more precise than the tag's.
	pub(crate) fn line(&self) -> Option<u32> {
		match self {
			Self::UnexpectedToken(err) => Some(err.line),
			Self::UnclosedBlock { line, .. } => Some(*line),
			_ => None,
		}
	}

	pub(crate) fn invalid(tag: &str, reason: impl Into<String>) -> Self {
		Self::InvalidTag {
			tag: tag.to_string(),
			reason: reason.into(),
		}
	}
}

fn describe_open(open: &Option<(String, u32)>) -> String {
	match open {
		Some((name, line)) => format!("{{{name}}} opened on line {line} is still open"),
		None => "nothing open".to_string(),
	}
}

/// Result of a tag handler: the code fragment to emit.
pub type HandlerResult = Result<String, CompileErrorKind>;
