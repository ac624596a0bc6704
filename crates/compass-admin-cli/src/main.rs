//! Compass Admin CLI
//!
//! Command-line tool for managing the tags and categories of the Compass
//! solution catalog.
//!
//! ## Usage
//!
//! ```bash
//! compass-admin tag create "Stream Processing" --description "Kafka, Flink"
//! compass-admin tag attach kafka-tuning stream-processing
//! compass-admin tag list --sort -created_at --include-unused
//! compass-admin category update data --rename data-engineering --cascade
//! compass-admin --json category usage
//! ```
//!
//! Settings come from `--config`, `COMPASS_*` environment variables and
//! built-in defaults; see `compass-conf`.

mod bootstrap;
mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;
use compass_taxonomy::{CategoryService, TagService};

use crate::commands::{EntryCommand, OutputFormat};

#[derive(Parser)]
#[command(name = "compass-admin")]
#[command(about = "Compass taxonomy administration utility", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Verbosity level (can be repeated)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbosity: u8,

	/// Path to a TOML settings file
	#[arg(long, value_name = "PATH", global = true)]
	config: Option<PathBuf>,

	/// Print results as JSON
	#[arg(long, global = true)]
	json: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Manage tags
	Tag {
		#[command(subcommand)]
		action: EntryCommand,
	},

	/// Manage categories
	Category {
		#[command(subcommand)]
		action: EntryCommand,
	},
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();

	match run(cli).await {
		Ok(output) => println!("{}", output),
		Err(e) => {
			eprintln!("{} {:#}", "Error:".red().bold(), e);
			process::exit(commands::exit_code(&e));
		}
	}
}

async fn run(cli: Cli) -> anyhow::Result<String> {
	let settings = bootstrap::load_settings(cli.config.as_deref())?;
	bootstrap::init_logging(&settings, cli.verbosity);

	let store = bootstrap::connect_store(&settings.database).await?;
	let format = if cli.json {
		OutputFormat::Json
	} else {
		OutputFormat::Human
	};

	let result = match cli.command {
		Commands::Tag { action } => {
			let tags = TagService::new(store.clone()).with_max_page_size(settings.max_page_size);
			commands::execute(&tags, action, &settings, format).await
		}
		Commands::Category { action } => {
			let categories =
				CategoryService::new(store.clone()).with_max_page_size(settings.max_page_size);
			commands::execute(&categories, action, &settings, format).await
		}
	};

	bootstrap::teardown(store).await;
	result
}
