/// An assertive cursor step met a token of the wrong kind, or the end of the
/// stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct UnexpectedToken {
	/// Human-readable description, e.g. `unexpected token '}', expected ')'`.
	pub message: String,
	/// Text of the offending token, `None` at end of stream.
	pub found: Option<String>,
	/// Line of the offending token, or of the last token at end of stream.
	pub line: u32,
	/// The single token that was expected, when there was exactly one.
	pub expected: Option<String>,
	/// Tokens around the cursor rendered back to text.
	pub snippet: String,
}
