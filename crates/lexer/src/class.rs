//! Operator classification.
//!
//! A static table maps every punctuation literal to the set of classes it
//! belongs to. The expression parser works in terms of classes and binding
//! powers, never in terms of individual operator spellings.

use crate::token::TokenKind;

/// A named group of token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
	/// Identifiers and keywords.
	Name,
	/// Prefix operators: `!`, `~`, `-`.
	Unary,
	/// Infix operators between two values.
	Binary,
	/// Assignment and compound assignment.
	Equals,
	/// Integer, float and string literals.
	Scalar,
	/// `++` and `--`.
	IncDec,
	/// Logical connectives.
	Boolean,
	/// Arithmetic and bitwise operators.
	Math,
	/// Equality and ordering comparisons.
	Comparison,
}

bitflags::bitflags! {
	/// A set of operator classes.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct ClassSet: u16 {
		const NAME = 1 << 0;
		const UNARY = 1 << 1;
		const BINARY = 1 << 2;
		const EQUALS = 1 << 3;
		const SCALAR = 1 << 4;
		const INCDEC = 1 << 5;
		const BOOLEAN = 1 << 6;
		const MATH = 1 << 7;
		const COMPARISON = 1 << 8;
	}
}

impl Class {
	pub const fn as_set(self) -> ClassSet {
		match self {
			Self::Name => ClassSet::NAME,
			Self::Unary => ClassSet::UNARY,
			Self::Binary => ClassSet::BINARY,
			Self::Equals => ClassSet::EQUALS,
			Self::Scalar => ClassSet::SCALAR,
			Self::IncDec => ClassSet::INCDEC,
			Self::Boolean => ClassSet::BOOLEAN,
			Self::Math => ClassSet::MATH,
			Self::Comparison => ClassSet::COMPARISON,
		}
	}
}

impl From<Class> for ClassSet {
	fn from(class: Class) -> Self {
		class.as_set()
	}
}

impl FromIterator<Class> for ClassSet {
	fn from_iter<I: IntoIterator<Item = Class>>(iter: I) -> Self {
		iter.into_iter()
			.fold(ClassSet::empty(), |set, class| set | class.as_set())
	}
}

const LOGIC: ClassSet = ClassSet::BINARY.union(ClassSet::BOOLEAN);
const ARITH: ClassSet = ClassSet::BINARY.union(ClassSet::MATH);
const COMPARE: ClassSet = ClassSet::BINARY.union(ClassSet::COMPARISON);

/// Punctuation recognised by the lexer, longest spellings first.
pub(crate) const PUNCTUATION: &[&str] = &[
	"===", "!==", "<<=", ">>=", "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=",
	"/=", "%=", ".=", "&=", "|=", "^=", "<<", ">>", "->", "=>", "::", "+", "-", "*", "/", "%",
	"=", "<", ">", "!", "~", "^", "&", "|", ".", ",", ":", ";", "?", "(", ")", "[", "]", "{",
	"}", "@", "#",
];

/// Operators spelled as words.
pub(crate) const WORD_OPERATORS: &[&str] = &["and", "or", "xor"];

static PUNCT_CLASSES: &[(&str, ClassSet)] = &[
	("!", ClassSet::UNARY),
	("~", ClassSet::UNARY),
	("-", ARITH.union(ClassSet::UNARY)),
	("+", ARITH),
	("*", ARITH),
	("/", ARITH),
	("%", ARITH),
	("^", ARITH),
	("&", ARITH),
	("|", ClassSet::MATH),
	("<<", ARITH),
	(">>", ARITH),
	("&&", LOGIC),
	("||", LOGIC),
	("and", LOGIC),
	("or", LOGIC),
	("xor", LOGIC),
	("==", COMPARE),
	("===", COMPARE),
	("!=", COMPARE),
	("!==", COMPARE),
	("<", COMPARE),
	("<=", COMPARE),
	(">", COMPARE),
	(">=", COMPARE),
	("=", ClassSet::EQUALS),
	("+=", ClassSet::EQUALS),
	("-=", ClassSet::EQUALS),
	("*=", ClassSet::EQUALS),
	("/=", ClassSet::EQUALS),
	("%=", ClassSet::EQUALS),
	(".=", ClassSet::EQUALS),
	("&=", ClassSet::EQUALS),
	("|=", ClassSet::EQUALS),
	("^=", ClassSet::EQUALS),
	("<<=", ClassSet::EQUALS),
	(">>=", ClassSet::EQUALS),
	("++", ClassSet::INCDEC),
	("--", ClassSet::INCDEC),
];

/// Returns the classes a token kind belongs to.
pub fn classes_of(kind: TokenKind) -> ClassSet {
	match kind {
		TokenKind::Name => ClassSet::NAME,
		TokenKind::Int | TokenKind::Float | TokenKind::Str => ClassSet::SCALAR,
		TokenKind::Punct(p) => PUNCT_CLASSES
			.iter()
			.find(|(op, _)| *op == p)
			.map(|(_, classes)| *classes)
			.unwrap_or_default(),
		TokenKind::Variable | TokenKind::Comment | TokenKind::Other => ClassSet::empty(),
	}
}

/// Binding power of a binary operator; higher binds tighter.
///
/// Returns `None` for anything that is not a binary operator.
pub fn binding_power(op: &str) -> Option<u8> {
	let power = match op {
		"or" => 1,
		"xor" => 2,
		"and" => 3,
		"||" => 4,
		"&&" => 5,
		"^" => 6,
		"&" => 7,
		"==" | "!=" | "===" | "!==" => 8,
		"<" | "<=" | ">" | ">=" => 9,
		"<<" | ">>" => 10,
		"+" | "-" => 11,
		"*" | "/" | "%" => 12,
		_ => return None,
	};
	Some(power)
}
