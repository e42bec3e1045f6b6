//! Compile and cache option flags.

bitflags::bitflags! {
	/// Flags that change how templates are compiled and cached.
	///
	/// The full bit pattern takes part in artifact identity: the same template
	/// compiled under two different option sets yields two distinct artifacts.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct Options: u32 {
		/// Reject method calls (`$obj->m()`) in expressions.
		const DENY_METHODS = 0x10;
		/// Only call host functions explicitly marked as allowed.
		const DENY_INLINE_FUNCS = 0x20;
		/// Embed statically named includes instead of loading them at render time.
		const FORCE_INCLUDE = 0x40;
		/// Compare source and artifact timestamps before reusing an artifact.
		const CHECK_MTIME = 0x80;
		/// Never cache: compile on every request.
		const FORCE_COMPILE = 0x100;
	}
}

/// Option names accepted in configuration, in declaration order.
const OPTION_NAMES: &[(&str, Options)] = &[
	("disable_methods", Options::DENY_METHODS),
	("disable_native_funcs", Options::DENY_INLINE_FUNCS),
	("force_include", Options::FORCE_INCLUDE),
	("compile_check", Options::CHECK_MTIME),
	("force_compile", Options::FORCE_COMPILE),
];

/// An option name that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown option: {name}{}", suggestion.as_ref().map(|s| format!(" (did you mean '{s}'?)")).unwrap_or_default())]
pub struct UnknownOption {
	pub name: String,
	pub suggestion: Option<String>,
}

impl Options {
	/// Looks up a single flag by its configuration name.
	pub fn from_option_name(name: &str) -> Result<Self, UnknownOption> {
		OPTION_NAMES
			.iter()
			.find(|(n, _)| *n == name)
			.map(|(_, flag)| *flag)
			.ok_or_else(|| UnknownOption {
				name: name.to_string(),
				suggestion: suggest_option(name),
			})
	}

	/// Builds a mask from `(name, enabled)` pairs.
	///
	/// Disabled entries are still validated so a typo never passes silently.
	pub fn from_names<'a>(
		entries: impl IntoIterator<Item = (&'a str, bool)>,
	) -> Result<Self, UnknownOption> {
		let mut options = Self::empty();
		for (name, enabled) in entries {
			let flag = Self::from_option_name(name)?;
			options.set(flag, enabled);
		}
		Ok(options)
	}

	/// Configuration names of the flags set in `self`.
	pub fn names(self) -> impl Iterator<Item = &'static str> {
		OPTION_NAMES
			.iter()
			.filter(move |(_, flag)| self.contains(*flag))
			.map(|(name, _)| *name)
	}
}

fn suggest_option(name: &str) -> Option<String> {
	OPTION_NAMES
		.iter()
		.map(|(n, _)| *n)
		.min_by_key(|n| strsim::levenshtein(name, n))
		.filter(|n| strsim::levenshtein(name, n) <= 3)
		.map(str::to_string)
}
