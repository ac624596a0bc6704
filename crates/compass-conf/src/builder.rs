//! Merge configuration sources by priority

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::sources::{ConfigSource, SourceError};

/// Collects configuration sources and merges them
///
/// Sources are applied from lowest to highest priority. Tables are merged
/// key by key, any other value replaces what a lower source set. Sources
/// with equal priority apply in insertion order.
///
/// # Examples
///
/// ```
/// use compass_conf::builder::SettingsBuilder;
/// use compass_conf::sources::DefaultSource;
/// use serde_json::json;
///
/// let merged = SettingsBuilder::new()
///     .add_source(DefaultSource::new().with_value("log_level", json!("info")))
///     .build()
///     .unwrap();
/// assert_eq!(merged.get("log_level"), Some(&json!("info")));
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Descriptions of the registered sources, lowest priority first
	pub fn describe(&self) -> Vec<String> {
		self.ordered().map(|source| source.description()).collect()
	}

	fn ordered(&self) -> impl Iterator<Item = &dyn ConfigSource> {
		let mut ordered: Vec<&dyn ConfigSource> = self.sources.iter().map(|s| s.as_ref()).collect();
		ordered.sort_by_key(|source| source.priority());
		ordered.into_iter()
	}

	pub fn build(self) -> Result<MergedSettings, SourceError> {
		let mut values = IndexMap::new();
		for source in self.ordered() {
			for (key, value) in source.load()? {
				match values.get_mut(&key) {
					Some(existing) => merge_value(existing, value),
					None => {
						values.insert(key, value);
					}
				}
			}
		}
		Ok(MergedSettings { values })
	}
}

fn merge_value(target: &mut Value, incoming: Value) {
	match (target, incoming) {
		(Value::Object(target), Value::Object(incoming)) => {
			for (key, value) in incoming {
				match target.get_mut(&key) {
					Some(existing) => merge_value(existing, value),
					None => {
						target.insert(key, value);
					}
				}
			}
		}
		(target, incoming) => *target = incoming,
	}
}

/// Result of merging every source
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSettings {
	values: IndexMap<String, Value>,
}

impl MergedSettings {
	/// Look a value up by dotted path, e.g. `database.url`
	pub fn get(&self, path: &str) -> Option<&Value> {
		let mut segments = path.split('.');
		let mut current = self.values.get(segments.next()?)?;
		for segment in segments {
			current = current.get(segment)?;
		}
		Some(current)
	}

	pub fn values(&self) -> &IndexMap<String, Value> {
		&self.values
	}

	/// Deserialize the merged values into a typed settings struct
	pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, SourceError> {
		let object: serde_json::Map<String, Value> = self.values.into_iter().collect();
		Ok(serde_json::from_value(Value::Object(object))?)
	}
}
