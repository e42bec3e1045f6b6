//! Compiled template artifacts.

use std::sync::Arc;
use std::time::SystemTime;

use aspect_compiler::{Options, Registry};

/// Where an artifact's freshness stamp came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
	/// Compiled from source last modified at this time.
	Source(SystemTime),
	/// Loaded from a persisted record written at this time.
	Persisted(SystemTime),
}

impl Stamp {
	/// Whether an artifact with this stamp still matches a source last
	/// modified at `source`.
	pub fn is_fresh(self, source: SystemTime) -> bool {
		match self {
			Self::Source(seen) => seen == source,
			Self::Persisted(written) => source <= written,
		}
	}
}

/// A compiled template as handed out by the engine.
///
/// Artifacts loaded from the store are unbound until the engine attaches its
/// registry; the engine never returns an unbound artifact.
#[derive(Debug, Clone)]
pub struct Template {
	name: String,
	code: String,
	options: Options,
	stamp: Option<Stamp>,
	registry: Option<Arc<Registry>>,
}

impl Template {
	pub fn new(name: impl Into<String>, code: impl Into<String>, options: Options) -> Self {
		Self {
			name: name.into(),
			code: code.into(),
			options,
			stamp: None,
			registry: None,
		}
	}

	pub fn with_stamp(mut self, stamp: Stamp) -> Self {
		self.stamp = Some(stamp);
		self
	}

	/// Attaches the registry the render script's symbols resolve against.
	pub fn bind(&mut self, registry: Arc<Registry>) {
		self.registry = Some(registry);
	}

	pub fn is_bound(&self) -> bool {
		self.registry.is_some()
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Render script.
	pub fn code(&self) -> &str {
		&self.code
	}

	pub fn options(&self) -> Options {
		self.options
	}

	/// `None` for artifacts that cannot be validated, such as runtime compiles.
	pub fn stamp(&self) -> Option<Stamp> {
		self.stamp
	}

	pub fn registry(&self) -> Option<&Arc<Registry>> {
		self.registry.as_ref()
	}
}
