//! Template source providers.
//!
//! A provider turns the path part of a template identifier into source text.
//! The engine also asks it for a modification stamp when artifacts have to be
//! validated before reuse.

use std::fmt::Debug;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::ProviderError;


/// Supplies raw template source.
pub trait Provider: Send + Sync + Debug {
	/// Loads the source text for `path`.
	fn load_text(&self, path: &str) -> Result<String, ProviderError>;

	/// Last modification stamp of the source at `path`.
	fn modified(&self, path: &str) -> Result<SystemTime, ProviderError>;
}

/// Reads templates from an ordered list of directories.
///
/// The first directory containing the path wins. Absolute paths and paths
/// that climb out with `..` are never resolved.
#[derive(Debug, Clone, Default)]
pub struct FsProvider {
	dirs: Vec<PathBuf>,
}

impl FsProvider {
	pub fn new<P: Into<PathBuf>>(dirs: impl IntoIterator<Item = P>) -> Self {
		Self {
			dirs: dirs.into_iter().map(Into::into).collect(),
		}
	}

	pub fn dirs(&self) -> &[PathBuf] {
		&self.dirs
	}

	fn locate(&self, path: &str) -> Result<PathBuf, ProviderError> {
		let relative = Path::new(path);
		let contained = relative
			.components()
			.all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
		if contained
			&& let Some(found) = self.dirs.iter().map(|d| d.join(relative)).find(|p| p.is_file())
		{
			return Ok(found);
		}
		Err(ProviderError::NotFound {
			name: path.to_string(),
		})
	}
}

impl Provider for FsProvider {
	fn load_text(&self, path: &str) -> Result<String, ProviderError> {
		let file = self.locate(path)?;
		fs::read_to_string(&file).map_err(|source| ProviderError::Io { path: file, source })
	}

	fn modified(&self, path: &str) -> Result<SystemTime, ProviderError> {
		let file = self.locate(path)?;
		fs::metadata(&file)
			.and_then(|meta| meta.modified())
			.map_err(|source| ProviderError::Io { path: file, source })
	}
}

/// In-process sources with explicit modification stamps.
///
/// Counts successful [`Provider::load_text`] calls, which lets callers observe
/// whether a resolve actually went back to the source.
#[derive(Debug, Default)]
pub struct MemoryProvider {
	sources: RwLock<FxHashMap<String, (String, SystemTime)>>,
	loads: AtomicUsize,
}

impl MemoryProvider {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a source.
	pub fn insert(&self, name: impl Into<String>, text: impl Into<String>, modified: SystemTime) {
		self.sources.write().insert(name.into(), (text.into(), modified));
	}

	pub fn remove(&self, name: &str) -> bool {
		self.sources.write().remove(name).is_some()
	}

	/// Number of sources handed out so far.
	pub fn loads(&self) -> usize {
		self.loads.load(Ordering::Relaxed)
	}
}

impl Provider for MemoryProvider {
	fn load_text(&self, path: &str) -> Result<String, ProviderError> {
		let sources = self.sources.read();
		let (text, _) = sources.get(path).ok_or_else(|| ProviderError::NotFound {
			name: path.to_string(),
		})?;
		self.loads.fetch_add(1, Ordering::Relaxed);
		Ok(text.clone())
	}

	fn modified(&self, path: &str) -> Result<SystemTime, ProviderError> {
		self.sources
			.read()
			.get(path)
			.map(|(_, stamp)| *stamp)
			.ok_or_else(|| ProviderError::NotFound {
				name: path.to_string(),
			})
	}
}
