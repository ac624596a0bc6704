//! Typed Compass settings

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::builder::SettingsBuilder;
use crate::sources::{DefaultSource, EnvSource, SourceError, TomlFileSource};

pub const DEFAULT_DATABASE_URL: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE_NAME: &str = "compass";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_PAGE_SIZE: u64 = 100;
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 1000;

/// Errors raised while loading or validating settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Settings source error: {0}")]
	Source(#[from] SourceError),

	#[error("Invalid settings: {0}")]
	Invalid(String),
}

/// Document store backend selected at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
	/// In-process store, nothing persists across runs
	Memory,
	#[default]
	Mongodb,
}

impl fmt::Display for BackendKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BackendKind::Memory => write!(f, "memory"),
			BackendKind::Mongodb => write!(f, "mongodb"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
	pub backend: BackendKind,
	pub url: Option<String>,
	pub name: String,
	#[serde(
		skip_serializing_if = "Option::is_none",
		deserialize_with = "optional_number_or_string"
	)]
	pub max_pool_size: Option<u32>,
	#[serde(
		skip_serializing_if = "Option::is_none",
		deserialize_with = "optional_number_or_string"
	)]
	pub min_pool_size: Option<u32>,
}

impl Default for DatabaseSettings {
	fn default() -> Self {
		Self {
			backend: BackendKind::default(),
			url: Some(DEFAULT_DATABASE_URL.to_string()),
			name: DEFAULT_DATABASE_NAME.to_string(),
			max_pool_size: None,
			min_pool_size: None,
		}
	}
}

/// A numeric setting written natively (TOML) or as text (environment)
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
	Number(T),
	Text(String),
}

impl<T> NumberOrString<T>
where
	T: FromStr,
	T::Err: fmt::Display,
{
	fn resolve<E: de::Error>(self) -> Result<T, E> {
		match self {
			NumberOrString::Number(value) => Ok(value),
			NumberOrString::Text(text) => text
				.trim()
				.parse()
				.map_err(|e| E::custom(format!("invalid number '{}': {}", text, e))),
		}
	}
}

fn number_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de> + FromStr,
	T::Err: fmt::Display,
{
	NumberOrString::<T>::deserialize(deserializer)?.resolve()
}

fn optional_number_or_string<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de> + FromStr,
	T::Err: fmt::Display,
{
	Option::<NumberOrString<T>>::deserialize(deserializer)?
		.map(NumberOrString::resolve)
		.transpose()
}

/// Settings for the taxonomy services and the admin tooling
///
/// # Examples
///
/// ```
/// use compass_conf::{BackendKind, Settings};
///
/// let settings = Settings::default();
/// assert_eq!(settings.database.backend, BackendKind::Mongodb);
/// assert_eq!(settings.max_page_size, 1000);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub database: DatabaseSettings,
	/// `EnvFilter` directive used when `RUST_LOG` is unset
	pub log_level: String,
	#[serde(deserialize_with = "number_or_string")]
	pub default_page_size: u64,
	#[serde(deserialize_with = "number_or_string")]
	pub max_page_size: u64,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			database: DatabaseSettings::default(),
			log_level: DEFAULT_LOG_LEVEL.to_string(),
			default_page_size: DEFAULT_PAGE_SIZE,
			max_page_size: DEFAULT_MAX_PAGE_SIZE,
		}
	}
}

impl Settings {
	/// Load settings from defaults, an optional TOML file and `COMPASS_*`
	/// environment variables, then validate them
	pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
		let mut builder =
			SettingsBuilder::new().add_source(DefaultSource::from_serialize(&Settings::default())?);
		if let Some(path) = path {
			builder = builder.add_source(TomlFileSource::new(path));
		}
		builder = builder.add_source(EnvSource::compass());

		Self::from_builder(builder)
	}

	/// Merge the builder's sources into validated settings
	pub fn from_builder(builder: SettingsBuilder) -> Result<Self, SettingsError> {
		let settings: Settings = builder.build()?.into_typed()?;
		settings.validate()?;
		Ok(settings)
	}

	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.default_page_size == 0 {
			return Err(SettingsError::Invalid(
				"default_page_size must be at least 1".to_string(),
			));
		}
		if self.max_page_size == 0 {
			return Err(SettingsError::Invalid(
				"max_page_size must be at least 1".to_string(),
			));
		}
		if self.default_page_size > self.max_page_size {
			return Err(SettingsError::Invalid(format!(
				"default_page_size ({}) exceeds max_page_size ({})",
				self.default_page_size, self.max_page_size
			)));
		}

		let database = &self.database;
		if database.backend == BackendKind::Mongodb
			&& database.url.as_deref().is_none_or(|url| url.trim().is_empty())
		{
			return Err(SettingsError::Invalid(
				"database.url is required for the mongodb backend".to_string(),
			));
		}
		if database.name.trim().is_empty() {
			return Err(SettingsError::Invalid(
				"database.name must not be empty".to_string(),
			));
		}
		if let (Some(min), Some(max)) = (database.min_pool_size, database.max_pool_size)
			&& min > max
		{
			return Err(SettingsError::Invalid(format!(
				"database.min_pool_size ({}) exceeds database.max_pool_size ({})",
				min, max
			)));
		}
		Ok(())
	}
}
