//! Multi-file configuration loading.
//!
//! Files are read breadth-first starting from the main file. Every file may
//! carry an `include` directive; included paths are relative to the including
//! file's directory. Top-level sections are merged and must be unique. A file
//! reached through two branches is merged once; a file that includes one of
//! its own ancestors is a circular include.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// Configuration loader that handles multi-file configurations with includes.
pub struct ConfigLoader {
	/// Base path for resolving the main file.
	base_path: PathBuf,
	/// Canonical paths already merged.
	loaded_files: HashSet<PathBuf>,
	/// File each top-level section came from, for error reporting.
	section_sources: HashMap<String, PathBuf>,
}

/// A file waiting to be read, with the canonical include chain leading to it.
struct PendingFile {
	path: PathBuf,
	ancestors: Vec<PathBuf>,
}

impl ConfigLoader {
	pub fn new(base_path: impl AsRef<Path>) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
			loaded_files: HashSet::new(),
			section_sources: HashMap::new(),
		}
	}

	/// Loads a configuration file and everything it includes.
	pub async fn load_config(&mut self, config_path: impl AsRef<Path>) -> Result<Config, ConfigError> {
		let main_path = resolve_path(&self.base_path, config_path.as_ref())?;

		let mut combined = toml::Table::new();
		let mut pending = VecDeque::from([PendingFile {
			path: main_path,
			ancestors: Vec::new(),
		}]);
		while let Some(PendingFile { path, ancestors }) = pending.pop_front() {
			let canonical_path = canonicalize(&path)?;
			if ancestors.contains(&canonical_path) {
				return Err(ConfigError::Validation(format!(
					"Circular include detected: {} includes itself",
					canonical_path.display()
				)));
			}
			if !self.loaded_files.insert(canonical_path.clone()) {
				tracing::debug!(file = %canonical_path.display(), "Skipping file already included");
				continue;
			}

			let mut table = load_table(&path).await?;

			let dir = path.parent().unwrap_or_else(|| Path::new("."));
			let mut chain = ancestors;
			chain.push(canonical_path);
			for include in extract_includes(&table)? {
				pending.push_back(PendingFile {
					path: resolve_path(dir, &include)?,
					ancestors: chain.clone(),
				});
			}
			table.remove("include");

			self.merge(&mut combined, table, &path)?;
		}

		tracing::debug!(files = self.loaded_files.len(), "Loaded configuration");
		Config::from_table(combined)
	}

	fn merge(
		&mut self,
		combined: &mut toml::Table,
		table: toml::Table,
		source: &Path,
	) -> Result<(), ConfigError> {
		for (key, value) in table {
			if let Some(existing_source) = self.section_sources.get(&key) {
				return Err(ConfigError::Validation(format!(
					"Duplicate section '{}' found in {} and {}. \
					Each top-level section must be unique across all configuration files.",
					key,
					existing_source.display(),
					source.display()
				)));
			}
			self.section_sources
				.insert(key.clone(), source.to_path_buf());
			combined.insert(key, value);
		}
		Ok(())
	}
}

/// Reads the `include` directive: a string or an array of strings.
fn extract_includes(table: &toml::Table) -> Result<Vec<PathBuf>, ConfigError> {
	match table.get("include") {
		None => Ok(Vec::new()),
		Some(toml::Value::String(path)) => Ok(vec![PathBuf::from(path)]),
		Some(toml::Value::Array(items)) => items
			.iter()
			.map(|item| {
				item.as_str().map(PathBuf::from).ok_or_else(|| {
					ConfigError::Validation("Include array must contain only strings".into())
				})
			})
			.collect(),
		Some(_) => Err(ConfigError::Validation(
			"Include must be a string or array of strings".into(),
		)),
	}
}

fn canonicalize(path: &Path) -> Result<PathBuf, ConfigError> {
	path.canonicalize().map_err(|e| {
		ConfigError::Io(std::io::Error::new(
			std::io::ErrorKind::NotFound,
			format!("Cannot resolve path {}: {}", path.display(), e),
		))
	})
}

/// Reads one file, resolving environment variables before parsing.
async fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
	let content = tokio::fs::read_to_string(path).await?;
	let resolved = resolve_env_vars(&content)?;
	Ok(toml::from_str(&resolved)?)
}

fn resolve_path(base: &Path, path: &Path) -> Result<PathBuf, ConfigError> {
	let resolved = if path.is_absolute() {
		path.to_path_buf()
	} else {
		base.join(path)
	};

	if !resolved.exists() {
		return Err(ConfigError::Io(std::io::Error::new(
			std::io::ErrorKind::NotFound,
			format!("Configuration file not found: {}", resolved.display()),
		)));
	}

	Ok(resolved)
}
