//! Configuration sources for layered settings
//!
//! Sources are merged in priority order: environment variables (100) >
//! TOML file (50) > defaults (0).

use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Prefix of the environment variables read by [`EnvSource::compass`]
pub const ENV_PREFIX: &str = "COMPASS_";

/// Separator for nested keys in environment variable names
///
/// `COMPASS_DATABASE__URL` sets `database.url`.
pub const ENV_NESTING_SEPARATOR: &str = "__";

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Environment variable configuration source
pub struct EnvSource {
	prefix: Option<String>,
}

impl EnvSource {
	/// Create a source reading every environment variable
	pub fn new() -> Self {
		Self { prefix: None }
	}

	/// Create a source reading `COMPASS_*` variables
	pub fn compass() -> Self {
		Self::new().with_prefix(ENV_PREFIX)
	}

	/// Set a prefix filter for environment variables
	///
	/// # Examples
	///
	/// ```
	/// use compass_conf::sources::EnvSource;
	///
	/// let source = EnvSource::new().with_prefix("APP_");
	// Only loads env vars starting with APP_
	/// ```
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	/// Load configuration from an explicit list of variables
	///
	/// Keys are lowercased with the prefix removed; `__` splits a key into
	/// nested tables. Values stay strings: the typed settings decide how to
	/// read them, so `off` or `2024` is never reinterpreted here.
	pub fn load_from<I>(&self, vars: I) -> IndexMap<String, Value>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		let mut config = IndexMap::new();

		for (key, value) in vars {
			let clean_key = match &self.prefix {
				Some(prefix) => match key.strip_prefix(prefix.as_str()) {
					Some(rest) => rest,
					None => continue,
				},
				None => key.as_str(),
			};
			let lower_key = clean_key.to_lowercase();

			let path: Vec<&str> = lower_key.split(ENV_NESTING_SEPARATOR).collect();
			if path.iter().any(|segment| segment.is_empty()) {
				continue;
			}
			insert_nested(&mut config, &path, Value::String(value));
		}

		config
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		Ok(self.load_from(std::env::vars()))
	}

	fn priority(&self) -> u8 {
		100 // Highest priority
	}

	fn description(&self) -> String {
		match &self.prefix {
			Some(prefix) => format!("Environment variables (prefix: {})", prefix),
			None => "Environment variables".to_string(),
		}
	}
}

fn insert_nested(config: &mut IndexMap<String, Value>, path: &[&str], value: Value) {
	let Some((first, rest)) = path.split_first() else {
		return;
	};
	if rest.is_empty() {
		config.insert((*first).to_string(), value);
		return;
	}

	let entry = config
		.entry((*first).to_string())
		.or_insert_with(|| Value::Object(serde_json::Map::new()));
	insert_into_table(entry, rest, value);
}

fn insert_into_table(target: &mut Value, path: &[&str], value: Value) {
	let Some((first, rest)) = path.split_first() else {
		*target = value;
		return;
	};
	if !target.is_object() {
		*target = Value::Object(serde_json::Map::new());
	}
	if let Value::Object(table) = target {
		let child = table
			.entry((*first).to_string())
			.or_insert(Value::Null);
		insert_into_table(child, rest, value);
	}
}

/// TOML file configuration source
///
/// A missing file loads as empty.
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	/// Create a new TOML file configuration source
	///
	/// # Examples
	///
	/// ```
	/// use compass_conf::sources::TomlFileSource;
	/// use std::path::PathBuf;
	///
	/// let source = TomlFileSource::new(PathBuf::from("compass.toml"));
	/// ```
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let toml_value: toml::Value = toml::from_str(&content)?;

		// Convert TOML value to JSON value
		let json_value = serde_json::to_value(&toml_value)?;

		let map = json_value
			.as_object()
			.ok_or_else(|| SourceError::Parse("Expected table at root".to_string()))?;

		Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
	}

	fn priority(&self) -> u8 {
		50 // Medium priority
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Default value configuration source
pub struct DefaultSource {
	values: IndexMap<String, Value>,
}

impl DefaultSource {
	pub fn new() -> Self {
		Self {
			values: IndexMap::new(),
		}
	}

	pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
		self.values.insert(key.into(), value);
		self
	}

	/// Use every field of a serializable struct as a default
	pub fn from_serialize<T: serde::Serialize>(defaults: &T) -> Result<Self, SourceError> {
		match serde_json::to_value(defaults)? {
			Value::Object(map) => Ok(Self {
				values: map.into_iter().collect(),
			}),
			_ => Err(SourceError::Parse(
				"Defaults must serialize to a table".to_string(),
			)),
		}
	}
}

impl Default for DefaultSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		0 // Lowest priority
	}

	fn description(&self) -> String {
		"Default values".to_string()
	}
}
