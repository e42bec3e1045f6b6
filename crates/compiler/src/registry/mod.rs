//! Registry of tags, modifiers and callable functions.
//!
//! A [`RegistryBuilder`] collects registrations, then freezes them into an
//! immutable [`Registry`] that compile passes share by reference.

mod action;

pub use action::{
	Action, ActionKind, Behavior, BlockCompiler, BlockHandler, FunctionParser, ParseHandler,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::error::CompileErrorKind;
use crate::options::Options;

#[cfg(test)]
mod tests;

/// Functions callable even under [`Options::DENY_INLINE_FUNCS`].
const ALLOWED_FUNCTIONS: &[&str] = &[
	"empty",
	"isset",
	"count",
	"is_string",
	"is_array",
	"is_numeric",
	"is_int",
	"is_object",
	"strtotime",
	"gettype",
	"is_double",
	"json_encode",
	"json_decode",
	"ip2long",
	"long2ip",
	"strip_tags",
	"nl2br",
];

/// Functions the standard runtime provides beyond the allow-list.
const HOST_FUNCTIONS: &[&str] = &[
	"strtoupper",
	"strtolower",
	"ucfirst",
	"urlencode",
	"trim",
	"implode",
	"explode",
	"in_array",
	"array_keys",
	"max",
	"min",
	"round",
	"date",
	"sprintf",
	"htmlspecialchars",
];

const MODIFIERS: &[(&str, &str)] = &[
	("upper", "strtoupper"),
	("lower", "strtolower"),
	("date_format", "Modifier::date_format"),
	("date", "Modifier::date"),
	("truncate", "Modifier::truncate"),
	("escape", "Modifier::escape"),
	("e", "Modifier::escape"),
	("url", "urlencode"),
	("unescape", "Modifier::unescape"),
	("strip", "Modifier::strip"),
	("default", "Modifier::default_value"),
];

/// Immutable lookup tables for one compile configuration.
#[derive(Debug, Clone, Default)]
pub struct Registry {
	actions: FxHashMap<String, Action>,
	modifiers: FxHashMap<String, String>,
	allowed: FxHashSet<String>,
	callables: FxHashSet<String>,
}

impl Registry {
	pub fn builder() -> RegistryBuilder {
		RegistryBuilder::new()
	}

	/// Registry with every built-in tag, modifier and function.
	pub fn standard() -> Self {
		RegistryBuilder::standard().build()
	}

	pub fn lookup(&self, name: &str) -> Option<&Action> {
		self.actions.get(name)
	}

	pub fn action_names(&self) -> impl Iterator<Item = &str> {
		self.actions.keys().map(String::as_str)
	}

	/// Names of every action owning child tag `tag`, sorted.
	pub fn owners_of(&self, tag: &str) -> Vec<&str> {
		let mut owners: Vec<&str> = self
			.actions
			.values()
			.filter(|a| a.owns(tag))
			.map(Action::name)
			.collect();
		owners.sort_unstable();
		owners
	}

	/// Whether a template may call host function `name` under `options`.
	pub fn is_call_allowed(&self, name: &str, options: Options) -> bool {
		if self.allowed.contains(name) {
			return true;
		}
		!options.contains(Options::DENY_INLINE_FUNCS) && self.callables.contains(name)
	}

	/// Runtime symbol for modifier `name`.
	///
	/// Falls back to a host function of the same name, which must be callable
	/// under `options`.
	pub fn modifier(&self, name: &str, options: Options) -> Result<&str, CompileErrorKind> {
		if let Some(symbol) = self.modifiers.get(name) {
			return Ok(symbol.as_str());
		}
		let Some(function) = self.allowed.get(name).or_else(|| self.callables.get(name)) else {
			return Err(CompileErrorKind::UnknownModifier {
				name: name.to_string(),
			});
		};
		if !self.is_call_allowed(name, options) {
			return Err(CompileErrorKind::DisallowedCall {
				name: name.to_string(),
			});
		}
		Ok(function.as_str())
	}

	/// Closest known tag name to `name`, for error messages.
	pub fn suggest_tag(&self, name: &str) -> Option<String> {
		let children = self.actions.values().filter_map(|a| match a.behavior() {
			Behavior::BlockCompiler(block) => Some(block.tags.keys()),
			_ => None,
		});
		self.actions
			.keys()
			.chain(children.flatten())
			.min_by_key(|k| strsim::levenshtein(name, k))
			.filter(|k| strsim::levenshtein(name, k) <= 2)
			.cloned()
	}
}

/// Collects registrations for a [`Registry`].
///
/// Registering a name twice replaces the earlier entry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
	actions: FxHashMap<String, Action>,
	modifiers: FxHashMap<String, String>,
	allowed: FxHashSet<String>,
	callables: FxHashSet<String>,
}

impl RegistryBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder preloaded with the built-in tags, modifiers and functions.
	pub fn standard() -> Self {
		let mut builder = Self::new();
		crate::builtins::register(&mut builder);
		for (name, symbol) in MODIFIERS {
			builder.add_modifier(name, symbol);
		}
		builder.allow_functions(ALLOWED_FUNCTIONS.iter().copied());
		builder.host_functions(HOST_FUNCTIONS.iter().copied());
		builder
	}

	pub fn register(&mut self, action: Action) -> &mut Self {
		trace!(action = action.name(), kind = %action.kind(), "register action");
		self.actions.insert(action.name().to_string(), action);
		self
	}

	pub fn add_compiler(&mut self, name: &str, parse: ParseHandler) -> &mut Self {
		self.register(Action::new(name, Behavior::InlineCompiler(parse)))
	}

	pub fn add_block_compiler(&mut self, name: &str, block: BlockCompiler) -> &mut Self {
		self.register(Action::new(name, Behavior::BlockCompiler(block)))
	}

	/// Adds an inline function parsed with `parser`.
	pub fn add_function(&mut self, name: &str, function: &str, parser: FunctionParser) -> &mut Self {
		self.register(Action::new(
			name,
			Behavior::InlineFunction {
				function: function.to_string(),
				parser,
			},
		))
	}

	pub fn add_function_smart(&mut self, name: &str, function: &str) -> &mut Self {
		self.add_function(name, function, FunctionParser::Smart)
	}

	/// Adds a block function. Missing handlers default to the standard
	/// argument-capturing opener and closer.
	pub fn add_block_function(
		&mut self,
		name: &str,
		function: &str,
		open: Option<BlockHandler>,
		close: Option<BlockHandler>,
	) -> &mut Self {
		self.register(Action::new(
			name,
			Behavior::BlockFunction {
				function: function.to_string(),
				open: open.unwrap_or(crate::builtins::function_open),
				close: close.unwrap_or(crate::builtins::function_close),
			},
		))
	}

	pub fn add_modifier(&mut self, name: &str, function: &str) -> &mut Self {
		self.modifiers.insert(name.to_string(), function.to_string());
		self
	}

	/// Marks functions callable under every option set.
	pub fn allow_functions<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> &mut Self {
		self.allowed.extend(names.into_iter().map(str::to_string));
		self
	}

	/// Declares functions the host provides; callable unless
	/// [`Options::DENY_INLINE_FUNCS`] is set.
	pub fn host_functions<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> &mut Self {
		self.callables.extend(names.into_iter().map(str::to_string));
		self
	}

	pub fn build(self) -> Registry {
		Registry {
			actions: self.actions,
			modifiers: self.modifiers,
			allowed: self.allowed,
			callables: self.callables,
		}
	}
}
