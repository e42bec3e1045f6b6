//! Engine error types.

use std::path::PathBuf;

use aspect_compiler::CompileError;
use thiserror::Error;

use crate::config::ConfigError;

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by [`Engine`](crate::Engine).
#[derive(Debug, Error)]
pub enum EngineError {
	/// The template failed to compile. Nothing was cached or persisted.
	#[error(transparent)]
	Compile(#[from] CompileError),

	/// The source could not be loaded.
	#[error(transparent)]
	Provider(#[from] ProviderError),

	/// The persisted store could not be read or written.
	#[error(transparent)]
	Store(#[from] StoreError),

	/// The identifier names a scheme with no registered provider.
	#[error("no provider for scheme '{scheme}' in {name}{}", suggestion.as_ref().map(|s| format!(" (did you mean '{s}'?)")).unwrap_or_default())]
	UnknownScheme {
		scheme: String,
		name: String,
		suggestion: Option<String>,
	},

	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The operation is declared but deliberately left unimplemented.
	#[error("{operation} is not supported")]
	Unsupported { operation: &'static str },
}

/// Errors raised by a [`Provider`](crate::Provider).
#[derive(Debug, Error)]
pub enum ProviderError {
	/// No source exists for the identifier.
	#[error("template {name} not found")]
	NotFound { name: String },

	/// The source exists but could not be read.
	#[error("I/O error reading {path}: {source}")]
	Io {
		path: PathBuf,
		source: std::io::Error,
	},
}

/// Errors raised by the persisted [`Store`](crate::Store).
///
/// Store failures are fatal and never retried.
#[derive(Debug, Error)]
pub enum StoreError {
	/// A temporary file could not be created in the store directory.
	#[error("cannot open temporary file in {dir}: {source}. Is the directory writable?")]
	TempFile {
		dir: PathBuf,
		source: std::io::Error,
	},

	#[error("cannot write {path}: {source}")]
	Write {
		path: PathBuf,
		source: std::io::Error,
	},

	/// The temporary file could not be moved onto the record path.
	#[error("cannot rename temporary file onto {path}: {source}")]
	Rename {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("cannot read {path}: {source}")]
	Read {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("cannot remove {path}: {source}")]
	Remove {
		path: PathBuf,
		source: std::io::Error,
	},
}
