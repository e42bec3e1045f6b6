//! TOML engine configuration.
//!
//! ```toml
//! template_dirs = ["templates"]
//! compile_dir = "/tmp/aspect"
//! extension = "aspect"
//!
//! [options]
//! compile_check = true
//! force_compile = false
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use aspect_compiler::{Options, UnknownOption};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		path: PathBuf,
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or structure.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// An `[options]` key that names no option.
	#[error(transparent)]
	Option(#[from] UnknownOption),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Engine settings as read from a config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
	/// Directories searched for templates, in order.
	#[serde(default)]
	pub template_dirs: Vec<PathBuf>,
	/// Where persisted records are written.
	pub compile_dir: PathBuf,
	/// Persisted record extension. Defaults to [`Store::DEFAULT_EXTENSION`](crate::Store::DEFAULT_EXTENSION).
	#[serde(default)]
	pub extension: Option<String>,
	/// Option flags by configuration name.
	#[serde(default)]
	pub options: BTreeMap<String, bool>,
}

impl EngineConfig {
	/// Parses and validates a config document.
	pub fn from_toml_str(text: &str) -> Result<Self> {
		let config: Self = toml::from_str(text)?;
		config.options()?;
		Ok(config)
	}

	/// Reads a config file. Relative directories resolve against the file's
	/// own directory.
	pub fn load(path: &Path) -> Result<Self> {
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let mut config = Self::from_toml_str(&text)?;
		if let Some(base) = path.parent() {
			for dir in &mut config.template_dirs {
				*dir = base.join(&*dir);
			}
			config.compile_dir = base.join(&config.compile_dir);
		}
		Ok(config)
	}

	/// The configured option mask.
	pub fn options(&self) -> Result<Options> {
		Ok(Options::from_names(
			self.options.iter().map(|(name, enabled)| (name.as_str(), *enabled)),
		)?)
	}
}
