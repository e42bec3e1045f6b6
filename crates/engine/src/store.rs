//! Persisted compile records.
//!
//! Every `(identifier, options)` pair owns one file under the store directory,
//! holding the generated code and nothing else. Records are written to a
//! temporary file and renamed into place, so a reader sees either no record or
//! a complete one.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use aspect_compiler::Options;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::StoreError;


/// A record read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
	pub code: String,
	/// Modification time of the record file.
	pub modified: SystemTime,
}

/// Directory of persisted records.
#[derive(Debug, Clone)]
pub struct Store {
	dir: PathBuf,
	extension: String,
}

impl Store {
	pub const DEFAULT_EXTENSION: &'static str = "aspect";

	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self {
			dir: dir.into(),
			extension: Self::DEFAULT_EXTENSION.to_string(),
		}
	}

	pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
		self.extension = extension.into();
		self
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Deterministic record path for `name` compiled under `options`.
	///
	/// The file name is `<base>.<digest>.<len>.<ext>`, where the digest and
	/// length are taken over `"{name}:{bits}"` and `base` is the last segment
	/// of `name`.
	pub fn path_for(&self, name: &str, options: Options) -> PathBuf {
		let key = format!("{name}:{}", options.bits());
		let base = name.rsplit(['/', '\\', ':']).next().unwrap_or(name);
		self.dir.join(format!(
			"{base}.{}.{}.{}",
			xxh3_64(key.as_bytes()),
			key.len(),
			self.extension
		))
	}

	/// Reads the record at `path`, or `None` if there is none.
	pub fn load(&self, path: &Path) -> Result<Option<Record>, StoreError> {
		let read = |source| StoreError::Read {
			path: path.to_path_buf(),
			source,
		};
		let code = match fs::read_to_string(path) {
			Ok(code) => code,
			Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
			Err(err) => return Err(read(err)),
		};
		let modified = fs::metadata(path).and_then(|meta| meta.modified()).map_err(read)?;
		Ok(Some(Record { code, modified }))
	}

	/// Atomically writes `code` to `path`, returning the record's mtime.
	pub fn persist(&self, path: &Path, code: &str) -> Result<SystemTime, StoreError> {
		let temp_error = |source| StoreError::TempFile {
			dir: self.dir.clone(),
			source,
		};
		fs::create_dir_all(&self.dir).map_err(temp_error)?;
		let mut temp = tempfile::Builder::new()
			.prefix(".aspect-")
			.tempfile_in(&self.dir)
			.map_err(temp_error)?;
		temp.write_all(code.as_bytes())
			.map_err(|source| StoreError::Write {
				path: temp.path().to_path_buf(),
				source,
			})?;
		let file = temp.persist(path).map_err(|err| StoreError::Rename {
			path: path.to_path_buf(),
			source: err.error,
		})?;
		let modified = file
			.metadata()
			.and_then(|meta| meta.modified())
			.map_err(|source| StoreError::Read {
				path: path.to_path_buf(),
				source,
			})?;
		debug!(path = %path.display(), bytes = code.len(), "persisted record");
		Ok(modified)
	}

	/// Deletes the record at `path`. Returns whether one existed.
	pub fn remove(&self, path: &Path) -> Result<bool, StoreError> {
		match fs::remove_file(path) {
			Ok(()) => Ok(true),
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
			Err(source) => Err(StoreError::Remove {
				path: path.to_path_buf(),
				source,
			}),
		}
	}
}
