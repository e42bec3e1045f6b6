//! Lexer for the expressions embedded in Aspect template tags.
//!
//! Tag bodies (`{foreach $users as $user}`, `{$x + 1|escape}`) are split into
//! classified [`Token`]s. Whitespace never becomes a token of its own: it is
//! folded into the trailing [`Token::whitespace`] of the token before it, so the
//! original text can always be rebuilt from the stream.
//!
//! [`Tokens`] is the cursor the compiler drives over one tag body. Besides plain
//! navigation it offers assertive steps that fail with [`UnexpectedToken`], raw
//! text accumulation, filtering and re-lexing of the tail of the stream.
//!
//! Operators are grouped into classes ([`Class`], [`ClassSet`]) so an expression
//! parser can ask "is this a binary operator?" without listing every literal.

mod class;
mod error;
mod lexer;
mod token;
mod tokens;

pub use class::{Class, ClassSet, binding_power, classes_of};
pub use error::UnexpectedToken;
pub use lexer::{tokenize, tokenize_from};
pub use token::{Token, TokenKind};
pub use tokens::{Expect, Tokens};
