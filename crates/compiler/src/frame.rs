use rustc_hash::FxHashMap;

use crate::registry::Action;

/// An open block on the compile stack.
///
/// Handlers of the block keep per-block state here, e.g. whether an `{else}`
/// has been seen.
#[derive(Debug)]
pub struct Frame<'r> {
	/// Tag name the block was opened with.
	pub name: String,
	/// Line of the opening tag.
	pub line: u32,
	pub action: &'r Action,
	state: FxHashMap<&'static str, String>,
}

impl<'r> Frame<'r> {
	pub fn new(action: &'r Action, line: u32) -> Self {
		Self {
			name: action.name().to_string(),
			line,
			action,
			state: FxHashMap::default(),
		}
	}

	pub fn set(&mut self, key: &'static str, value: impl Into<String>) {
		self.state.insert(key, value.into());
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.state.get(key).map(String::as_str)
	}

	pub fn has(&self, key: &str) -> bool {
		self.state.contains_key(key)
	}
}
