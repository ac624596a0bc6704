//! Unit tests for SettingsBuilder

use compass_conf::{ConfigSource, DefaultSource, Settings, SettingsBuilder, SourceError};
use indexmap::IndexMap;
use rstest::rstest;
use serde_json::{Value, json};

struct FixedSource {
	priority: u8,
	values: Value,
}

impl ConfigSource for FixedSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		match &self.values {
			Value::Object(map) => Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
			_ => Err(SourceError::Parse("not a table".into())),
		}
	}

	fn priority(&self) -> u8 {
		self.priority
	}

	fn description(&self) -> String {
		format!("fixed ({})", self.priority)
	}
}

#[rstest]
fn test_higher_priority_wins_regardless_of_insertion_order() {
	// Arrange
	let builder = SettingsBuilder::new()
		.add_source(FixedSource {
			priority: 100,
			values: json!({ "log_level": "debug" }),
		})
		.add_source(FixedSource {
			priority: 50,
			values: json!({ "log_level": "warn", "max_page_size": 500 }),
		});

	// Act
	let merged = builder.build().unwrap();

	// Assert
	assert_eq!(merged.get("log_level"), Some(&json!("debug")));
	assert_eq!(merged.get("max_page_size"), Some(&json!(500)));
}

#[rstest]
fn test_nested_tables_merge_key_by_key() {
	// Arrange
	let builder = SettingsBuilder::new()
		.add_source(DefaultSource::from_serialize(&Settings::default()).unwrap())
		.add_source(FixedSource {
			priority: 50,
			values: json!({ "database": { "name": "catalog" } }),
		});

	// Act
	let settings: Settings = builder.build().unwrap().into_typed().unwrap();

	// Assert
	assert_eq!(settings.database.name, "catalog");
	assert_eq!(
		settings.database.url.as_deref(),
		Some("mongodb://localhost:27017")
	);
}

#[rstest]
fn test_describe_lists_sources_lowest_priority_first() {
	let builder = SettingsBuilder::new()
		.add_source(FixedSource {
			priority: 90,
			values: json!({}),
		})
		.add_source(DefaultSource::new());

	assert_eq!(builder.describe(), vec!["Default values", "fixed (90)"]);
}

#[rstest]
fn test_failing_source_aborts_build() {
	let builder = SettingsBuilder::new().add_source(FixedSource {
		priority: 10,
		values: json!("flat"),
	});

	assert!(matches!(builder.build(), Err(SourceError::Parse(_))));
}

#[rstest]
fn test_dotted_get_misses_return_none() {
	let merged = SettingsBuilder::new()
		.add_source(DefaultSource::new().with_value("database", json!({ "name": "compass" })))
		.build()
		.unwrap();

	assert_eq!(merged.get("database.name"), Some(&json!("compass")));
	assert_eq!(merged.get("database.url"), None);
	assert_eq!(merged.get("cache"), None);
}
