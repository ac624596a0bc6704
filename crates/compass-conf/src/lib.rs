//! # compass-conf
//!
//! Layered settings for Compass.
//!
//! Values come from three sources, highest priority first:
//!
//! 1. `COMPASS_*` environment variables (`COMPASS_DATABASE__URL` sets
//!    `database.url`)
//! 2. A TOML file, when one is given
//! 3. Built-in defaults
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use compass_conf::Settings;
//! use std::path::Path;
//!
//! let settings = Settings::load(Some(Path::new("compass.toml"))).unwrap();
//! println!("store: {} at {:?}", settings.database.backend, settings.database.url);
//! ```
//!
//! ## Module Organization
//!
//! - [`sources`]: `ConfigSource` implementations
//! - [`builder`]: priority merge of sources
//! - [`settings`]: typed `Settings` and validation

pub mod builder;
pub mod settings;
pub mod sources;

pub use builder::{MergedSettings, SettingsBuilder};
pub use settings::{BackendKind, DatabaseSettings, Settings, SettingsError};
pub use sources::{ConfigSource, DefaultSource, EnvSource, SourceError, TomlFileSource};
