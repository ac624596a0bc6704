//! Process setup and teardown for the admin CLI
//!
//! Settings are loaded first so the configured log level can seed the
//! subscriber; the store is connected last and closed by the caller.

use anyhow::Context;
use compass_conf::{BackendKind, DatabaseSettings, Settings};
use compass_db::{DocumentStore, MemoryStore};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

/// Load settings from the optional TOML file and `COMPASS_*` variables
pub(crate) fn load_settings(config: Option<&Path>) -> anyhow::Result<Settings> {
	let settings = Settings::load(config).with_context(|| match config {
		Some(path) => format!("failed to load settings from {}", path.display()),
		None => "failed to load settings".to_string(),
	})?;
	Ok(settings)
}

/// `EnvFilter` directive for the configured level raised by `-v` flags
pub(crate) fn filter_directive(log_level: &str, verbosity: u8) -> String {
	match verbosity {
		0 => log_level.to_string(),
		1 => "debug".to_string(),
		_ => "trace".to_string(),
	}
}

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` wins over the configured level unless `-v` was given.
pub(crate) fn init_logging(settings: &Settings, verbosity: u8) {
	let directive = filter_directive(&settings.log_level, verbosity);
	let filter = if verbosity == 0 {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive))
	} else {
		EnvFilter::new(&directive)
	};

	// A subscriber may already be installed when embedded in tests
	let _ = fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.try_init();
}

/// Open the configured store and make sure it answers
pub(crate) async fn connect_store(
	database: &DatabaseSettings,
) -> anyhow::Result<Arc<dyn DocumentStore>> {
	let store: Arc<dyn DocumentStore> = match database.backend {
		BackendKind::Memory => {
			tracing::warn!("using the in-memory store; changes are lost on exit");
			Arc::new(MemoryStore::new())
		}
		BackendKind::Mongodb => connect_mongodb(database).await?,
	};

	store
		.health_check()
		.await
		.with_context(|| format!("{} store failed its health check", database.backend))?;
	tracing::info!(backend = %database.backend, "store connected");
	Ok(store)
}

#[cfg(feature = "mongodb")]
async fn connect_mongodb(database: &DatabaseSettings) -> anyhow::Result<Arc<dyn DocumentStore>> {
	use compass_db::MongoStore;

	let url = database
		.url
		.as_deref()
		.context("database.url is required for the mongodb backend")?;
	let mut builder = MongoStore::builder().url(url).database(&database.name);
	if let Some(size) = database.max_pool_size {
		builder = builder.max_pool_size(size);
	}
	if let Some(size) = database.min_pool_size {
		builder = builder.min_pool_size(size);
	}

	let store = builder
		.build()
		.await
		.with_context(|| format!("failed to connect to {}", url))?;
	Ok(Arc::new(store))
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongodb(_database: &DatabaseSettings) -> anyhow::Result<Arc<dyn DocumentStore>> {
	anyhow::bail!("compass-admin was built without the mongodb feature")
}

/// Release the store's connections
pub(crate) async fn teardown(store: Arc<dyn DocumentStore>) {
	if let Err(e) = store.close().await {
		tracing::warn!(error = %e, "failed to close the store cleanly");
	}
}
