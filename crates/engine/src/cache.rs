//! In-memory artifact caches.

use std::fmt::Debug;
use std::sync::Arc;

use aspect_compiler::Options;
use rustc_hash::FxHashMap;

use crate::template::Template;

/// Storage policy for resolved artifacts, keyed by template name.
///
/// A cache belongs to one engine and one option set; the engine replaces it
/// whenever its options change.
pub trait CacheStrategy: Send + Sync + Debug {
	fn get(&self, name: &str) -> Option<Arc<Template>>;

	fn insert(&mut self, template: Arc<Template>);

	/// Drops the entry for `name`, returning whether there was one.
	fn remove(&mut self, name: &str) -> bool;

	fn clear(&mut self);

	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Short name used in logs.
	fn name(&self) -> &'static str;
}

/// Keeps every artifact until it is removed.
#[derive(Debug, Default)]
pub struct RetainingCache {
	entries: FxHashMap<String, Arc<Template>>,
}

impl CacheStrategy for RetainingCache {
	fn get(&self, name: &str) -> Option<Arc<Template>> {
		self.entries.get(name).cloned()
	}

	fn insert(&mut self, template: Arc<Template>) {
		self.entries.insert(template.name().to_string(), template);
	}

	fn remove(&mut self, name: &str) -> bool {
		self.entries.remove(name).is_some()
	}

	fn clear(&mut self) {
		self.entries.clear();
	}

	fn len(&self) -> usize {
		self.entries.len()
	}

	fn name(&self) -> &'static str {
		"retaining"
	}
}

/// Discards everything; every lookup misses.
#[derive(Debug, Default)]
pub struct NoOpCache;

impl CacheStrategy for NoOpCache {
	fn get(&self, _: &str) -> Option<Arc<Template>> {
		None
	}

	fn insert(&mut self, _: Arc<Template>) {}

	fn remove(&mut self, _: &str) -> bool {
		false
	}

	fn clear(&mut self) {}

	fn len(&self) -> usize {
		0
	}

	fn name(&self) -> &'static str {
		"noop"
	}
}

/// Picks the cache for an option set: [`NoOpCache`] under
/// [`Options::FORCE_COMPILE`], [`RetainingCache`] otherwise.
pub fn strategy_for(options: Options) -> Box<dyn CacheStrategy> {
	if options.contains(Options::FORCE_COMPILE) {
		Box::new(NoOpCache)
	} else {
		Box::new(RetainingCache::default())
	}
}
