//! Cache orchestration for Aspect templates.
//!
//! [`Engine::resolve`] turns a template identifier into a compiled
//! [`Template`], reusing work across two tiers:
//!
//! * an in-memory [`CacheStrategy`], keyed by identifier,
//! * a persisted [`Store`] holding one record per identifier and option set.
//!
//! Source text comes from [`Provider`]s, selected by the identifier's scheme
//! prefix (`mem:welcome.tpl`). With [`Options::CHECK_MTIME`] set, both tiers
//! are validated against the provider's modification stamp before reuse; with
//! [`Options::FORCE_COMPILE`] every resolve compiles afresh.
//!
//! [`Options::CHECK_MTIME`]: aspect_compiler::Options::CHECK_MTIME
//! [`Options::FORCE_COMPILE`]: aspect_compiler::Options::FORCE_COMPILE

mod cache;
mod config;
mod engine;
mod error;
mod provider;
mod store;
mod template;

pub use aspect_compiler::{Options, Registry, RegistryBuilder};
pub use cache::{CacheStrategy, NoOpCache, RetainingCache, strategy_for};
pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, Filter};
pub use error::{EngineError, ProviderError, Result, StoreError};
pub use provider::{FsProvider, MemoryProvider, Provider};
pub use store::{Record, Store};
pub use template::{Stamp, Template};
