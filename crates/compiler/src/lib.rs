//! Compiler for Aspect templates.
//!
//! A template is literal text interleaved with `{...}` tags. [`Compiler`]
//! translates it in a single pass into a line-oriented render script: literal
//! text becomes `text` statements, expressions become s-expressions, and block
//! tags become structured statements closed by `end`.
//!
//! Which tags exist is decided by a [`Registry`]. [`Registry::standard`]
//! carries the built-in control flow (`if`, `foreach`, `for`, `while`,
//! `switch`), assignment, includes, template inheritance and the default
//! modifiers; hosts extend it through [`RegistryBuilder`] with their own
//! handlers.
//!
//! ```text
//! {if $user}Hello, {$user.name|upper}!{/if}
//! ```
//!
//! compiles to
//!
//! ```text
//! @1
//! if (var user)
//! text "Hello, "
//! echo (mod strtoupper (get (var user) "name"))
//! text "!"
//! end
//! ```

mod builtins;
mod compiler;
mod context;
mod error;
mod expr;
mod frame;
mod options;
pub mod registry;

pub use compiler::{Compiled, Compiler};
pub use context::{Context, quote};
pub use error::{CompileError, CompileErrorKind, HandlerResult};
pub use frame::Frame;
pub use options::{Options, UnknownOption};
pub use registry::{Registry, RegistryBuilder};
