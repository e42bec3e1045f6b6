//! The cache orchestrator.

use std::sync::Arc;

use aspect_compiler::{Compiler, Options, Registry};
use rustc_hash::FxHashMap;
use tracing::{debug, info, trace};

use crate::cache::{CacheStrategy, strategy_for};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::provider::{FsProvider, Provider};
use crate::store::Store;
use crate::template::{Stamp, Template};

/// Source or code rewrite applied around compilation.
pub type Filter = fn(&str) -> String;

/// Resolves template identifiers to compiled, bound artifacts.
///
/// Lookups go through the in-memory cache first, then the persisted store,
/// and compile from source only when neither has a usable artifact.
/// Identifiers are `[scheme ":"] path`; the scheme picks a provider registered
/// with [`Engine::add_provider`], and identifiers without one go to the
/// default provider.
#[derive(Debug)]
pub struct Engine {
	registry: Arc<Registry>,
	options: Options,
	store: Store,
	provider: Arc<dyn Provider>,
	providers: FxHashMap<String, Arc<dyn Provider>>,
	cache: Box<dyn CacheStrategy>,
	pre_filters: Vec<Filter>,
	post_filters: Vec<Filter>,
}

impl Engine {
	/// Creates an engine over the standard registry with no options set.
	pub fn new(provider: Arc<dyn Provider>, store: Store) -> Self {
		let options = Options::empty();
		Self {
			registry: Arc::new(Registry::standard()),
			options,
			store,
			provider,
			providers: FxHashMap::default(),
			cache: strategy_for(options),
			pre_filters: Vec::new(),
			post_filters: Vec::new(),
		}
	}

	/// Replaces the registry. Cached artifacts are dropped.
	pub fn with_registry(mut self, registry: Registry) -> Self {
		self.registry = Arc::new(registry);
		self.cache.clear();
		self
	}

	/// Builds a filesystem-backed engine from configuration.
	pub fn from_config(config: &EngineConfig) -> Result<Self> {
		let provider = FsProvider::new(config.template_dirs.iter().cloned());
		let mut store = Store::new(&config.compile_dir);
		if let Some(extension) = &config.extension {
			store = store.with_extension(extension.as_str());
		}
		let mut engine = Self::new(Arc::new(provider), store);
		engine.set_options(config.options()?);
		Ok(engine)
	}

	pub fn options(&self) -> Options {
		self.options
	}

	/// Changes the options and starts over with a fresh cache.
	pub fn set_options(&mut self, options: Options) {
		self.options = options;
		self.cache = strategy_for(options);
		debug!(options = ?options, cache = self.cache.name(), "options changed");
	}

	pub fn registry(&self) -> &Arc<Registry> {
		&self.registry
	}

	pub fn store(&self) -> &Store {
		&self.store
	}

	pub fn cache(&self) -> &dyn CacheStrategy {
		self.cache.as_ref()
	}

	/// Routes identifiers prefixed with `scheme:` to `provider`.
	pub fn add_provider(&mut self, scheme: &str, provider: Arc<dyn Provider>) -> &mut Self {
		self.providers.insert(scheme.to_string(), provider);
		self
	}

	/// Adds a rewrite run over template source before compiling.
	pub fn add_pre_filter(&mut self, filter: Filter) -> &mut Self {
		self.pre_filters.push(filter);
		self
	}

	/// Adds a rewrite run over generated code after compiling.
	pub fn add_post_filter(&mut self, filter: Filter) -> &mut Self {
		self.post_filters.push(filter);
		self
	}

	/// Returns the artifact for `name`, compiling it if needed.
	pub fn resolve(&mut self, name: &str) -> Result<Arc<Template>> {
		if let Some(template) = self.cache.get(name) {
			if !self.options.contains(Options::CHECK_MTIME) || self.is_fresh(&template)? {
				trace!(template = name, "cache hit");
				return Ok(template);
			}
			debug!(template = name, "cached template is stale");
			let template = Arc::new(self.compile(name, true)?);
			self.cache.insert(Arc::clone(&template));
			return Ok(template);
		}

		if self.options.contains(Options::FORCE_COMPILE) {
			return Ok(Arc::new(self.compile(name, true)?));
		}

		trace!(template = name, "cache miss");
		let template = Arc::new(self.load(name)?);
		self.cache.insert(Arc::clone(&template));
		Ok(template)
	}

	/// Compiles `name` from its source, bypassing every cache.
	///
	/// With `persist` the result is also written to the store.
	pub fn compile(&self, name: &str, persist: bool) -> Result<Template> {
		let (provider, path) = self.provider_for(name)?;
		let modified = provider.modified(path)?;
		let source = provider.load_text(path)?;
		let code = self.compile_source(name, &source)?;
		if persist {
			self.store.persist(&self.record_path(name), &code)?;
		}
		let mut template = Template::new(name, code, self.options).with_stamp(Stamp::Source(modified));
		template.bind(Arc::clone(&self.registry));
		Ok(template)
	}

	/// Compiles a source string that has no provider behind it. Nothing is
	/// cached or persisted.
	pub fn compile_code(&self, source: &str, name: &str) -> Result<Template> {
		let code = self.compile_source(name, source)?;
		let mut template = Template::new(name, code, self.options);
		template.bind(Arc::clone(&self.registry));
		Ok(template)
	}

	/// Puts a prebuilt artifact into the cache under its own name.
	pub fn add_template(&mut self, mut template: Template) -> Arc<Template> {
		template.bind(Arc::clone(&self.registry));
		let template = Arc::new(template);
		self.cache.insert(Arc::clone(&template));
		template
	}

	/// Persisted record path for `name` under the current options.
	pub fn record_path(&self, name: &str) -> std::path::PathBuf {
		self.store.path_for(name, self.options)
	}

	/// Drops `name` from the cache and deletes its persisted record.
	///
	/// Returns whether a record was deleted; evicting an absent record is not
	/// an error.
	pub fn evict(&mut self, name: &str) -> Result<bool> {
		self.cache.remove(name);
		let removed = self.store.remove(&self.record_path(name))?;
		info!(template = name, removed, "evicted template");
		Ok(removed)
	}

	/// Bulk eviction of every persisted record. Not supported.
	pub fn evict_all(&mut self) -> Result<()> {
		Err(EngineError::Unsupported {
			operation: "evict_all",
		})
	}

	/// Loads `name` from the store, compiling and persisting it when there
	/// is no usable record.
	fn load(&self, name: &str) -> Result<Template> {
		let path = self.record_path(name);
		if let Some(record) = self.store.load(&path)? {
			let mut template = Template::new(name, record.code, self.options)
				.with_stamp(Stamp::Persisted(record.modified));
			if !self.options.contains(Options::CHECK_MTIME) || self.is_fresh(&template)? {
				debug!(template = name, path = %path.display(), "loaded persisted record");
				template.bind(Arc::clone(&self.registry));
				return Ok(template);
			}
			debug!(template = name, "persisted record is stale");
		}
		self.compile(name, true)
	}

	fn is_fresh(&self, template: &Template) -> Result<bool> {
		let Some(stamp) = template.stamp() else {
			return Ok(true);
		};
		let (provider, path) = self.provider_for(template.name())?;
		Ok(stamp.is_fresh(provider.modified(path)?))
	}

	fn compile_source(&self, name: &str, source: &str) -> Result<String> {
		let filtered;
		let source = if self.pre_filters.is_empty() {
			source
		} else {
			filtered = self
				.pre_filters
				.iter()
				.fold(source.to_string(), |text, filter| filter(&text));
			filtered.as_str()
		};
		let compiled = Compiler::new(&self.registry, self.options).compile(name, source)?;
		let code = self
			.post_filters
			.iter()
			.fold(compiled.code, |code, filter| filter(&code));
		debug!(template = name, bytes = code.len(), "compiled template");
		Ok(code)
	}

	fn provider_for<'n>(&self, name: &'n str) -> Result<(&dyn Provider, &'n str)> {
		let Some((scheme, path)) = split_scheme(name) else {
			return Ok((self.provider.as_ref(), name));
		};
		match self.providers.get(scheme) {
			Some(provider) => Ok((provider.as_ref(), path)),
			None => Err(EngineError::UnknownScheme {
				scheme: scheme.to_string(),
				name: name.to_string(),
				suggestion: self.suggest_scheme(scheme),
			}),
		}
	}

	fn suggest_scheme(&self, scheme: &str) -> Option<String> {
		self.providers
			.keys()
			.min_by_key(|known| strsim::levenshtein(scheme, known))
			.filter(|known| strsim::levenshtein(scheme, known) <= 2)
			.cloned()
	}
}

/// Splits `scheme:path` when the prefix is a non-empty ASCII alphanumeric run.
fn split_scheme(name: &str) -> Option<(&str, &str)> {
	name.split_once(':')
		.filter(|(scheme, _)| !scheme.is_empty() && scheme.bytes().all(|b| b.is_ascii_alphanumeric()))
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("page.tpl", None)]
	#[case("mem:page.tpl", Some(("mem", "page.tpl")))]
	#[case("db2:a:b", Some(("db2", "a:b")))]
	#[case(":page", None)]
	#[case("my-scheme:page", None)]
	#[case("dir/x:y", None)]
	fn schemes(#[case] name: &str, #[case] expected: Option<(&str, &str)>) {
		assert_eq!(split_scheme(name), expected);
	}
}
