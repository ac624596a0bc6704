//! Tag and category subcommands
//!
//! Both entry kinds share one set of subcommands. [`Taxonomy`] adapts the
//! two services to it, and [`execute`] renders the outcome as text or JSON.

use async_trait::async_trait;
use clap::Subcommand;
use colored::Colorize;
use compass_conf::Settings;
use compass_taxonomy::{
	Category, CategoryService, ListQuery, Page, Tag, TagService, TaxonomyEntry, TaxonomyError,
	TaxonomyPatch,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Subcommands shared by `tag` and `category`
#[derive(Debug, Clone, Subcommand)]
pub(crate) enum EntryCommand {
	/// Create an entry
	Create {
		#[arg(value_name = "NAME")]
		name: String,

		#[arg(short, long)]
		description: Option<String>,

		/// Recorded as created_by
		#[arg(long, env = "COMPASS_ACTOR")]
		actor: Option<String>,
	},

	/// Show an entry with its usage count
	Show {
		#[arg(value_name = "NAME")]
		name: String,
	},

	/// List entries with their usage counts
	List {
		#[arg(long, default_value_t = 0)]
		skip: u64,

		/// Page size (defaults to the configured default_page_size)
		#[arg(long)]
		limit: Option<u64>,

		/// name, created_at or updated_at, prefixed with '-' for descending
		#[arg(long, default_value = "name", allow_hyphen_values = true)]
		sort: String,

		/// Include entries no approved solution uses
		#[arg(long)]
		include_unused: bool,
	},

	/// Rename an entry or change its description
	Update {
		#[arg(value_name = "NAME")]
		name: String,

		#[arg(long, value_name = "NEW_NAME")]
		rename: Option<String>,

		#[arg(short, long, conflicts_with = "clear_description")]
		description: Option<String>,

		#[arg(long)]
		clear_description: bool,

		/// Move solution references to the new name before renaming
		#[arg(long, requires = "rename")]
		cascade: bool,

		/// Recorded as updated_by
		#[arg(long, env = "COMPASS_ACTOR")]
		actor: Option<String>,
	},

	/// Delete an entry no approved solution uses
	Delete {
		#[arg(value_name = "NAME")]
		name: String,
	},

	/// Associate an entry with a solution
	Attach {
		#[arg(value_name = "SLUG")]
		slug: String,

		#[arg(value_name = "NAME")]
		name: String,
	},

	/// Remove an entry from a solution
	Detach {
		#[arg(value_name = "SLUG")]
		slug: String,

		#[arg(value_name = "NAME")]
		name: String,
	},

	/// Approved-solution counts, for the given names or for every used entry
	Usage {
		#[arg(value_name = "NAME")]
		names: Vec<String>,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
	Human,
	Json,
}

/// Service operations the CLI drives, shared by tags and categories
#[async_trait]
pub(crate) trait Taxonomy: Send + Sync {
	type Entry: TaxonomyEntry + Serialize;

	/// Singular noun used in messages
	const KIND: &'static str;

	async fn create(
		&self,
		name: &str,
		description: Option<String>,
		actor: Option<&str>,
	) -> compass_taxonomy::Result<Self::Entry>;

	async fn get(&self, name: &str) -> compass_taxonomy::Result<Option<Self::Entry>>;

	async fn list(&self, query: &ListQuery) -> compass_taxonomy::Result<Page<Self::Entry>>;

	async fn update(
		&self,
		name: &str,
		patch: TaxonomyPatch,
		actor: Option<&str>,
		cascade: bool,
	) -> compass_taxonomy::Result<Option<Self::Entry>>;

	async fn delete(&self, name: &str) -> compass_taxonomy::Result<bool>;

	async fn attach(&self, slug: &str, name: &str) -> compass_taxonomy::Result<bool>;

	async fn detach(&self, slug: &str, name: &str) -> compass_taxonomy::Result<bool>;

	async fn usage_counts(
		&self,
		names: Option<&[String]>,
	) -> compass_taxonomy::Result<HashMap<String, u64>>;
}

#[async_trait]
impl Taxonomy for TagService {
	type Entry = Tag;
	const KIND: &'static str = "tag";

	async fn create(
		&self,
		name: &str,
		description: Option<String>,
		actor: Option<&str>,
	) -> compass_taxonomy::Result<Tag> {
		TagService::create(self, name, description, actor).await
	}

	async fn get(&self, name: &str) -> compass_taxonomy::Result<Option<Tag>> {
		self.get_by_name(name).await
	}

	async fn list(&self, query: &ListQuery) -> compass_taxonomy::Result<Page<Tag>> {
		TagService::list(self, query).await
	}

	async fn update(
		&self,
		name: &str,
		patch: TaxonomyPatch,
		actor: Option<&str>,
		cascade: bool,
	) -> compass_taxonomy::Result<Option<Tag>> {
		TagService::update(self, name, patch, actor, cascade).await
	}

	async fn delete(&self, name: &str) -> compass_taxonomy::Result<bool> {
		TagService::delete(self, name).await
	}

	async fn attach(&self, slug: &str, name: &str) -> compass_taxonomy::Result<bool> {
		self.add_tag_to_solution(slug, name).await
	}

	async fn detach(&self, slug: &str, name: &str) -> compass_taxonomy::Result<bool> {
		self.remove_tag_from_solution(slug, name).await
	}

	async fn usage_counts(
		&self,
		names: Option<&[String]>,
	) -> compass_taxonomy::Result<HashMap<String, u64>> {
		TagService::usage_counts(self, names).await
	}
}

#[async_trait]
impl Taxonomy for CategoryService {
	type Entry = Category;
	const KIND: &'static str = "category";

	async fn create(
		&self,
		name: &str,
		description: Option<String>,
		actor: Option<&str>,
	) -> compass_taxonomy::Result<Category> {
		CategoryService::create(self, name, description, actor).await
	}

	async fn get(&self, name: &str) -> compass_taxonomy::Result<Option<Category>> {
		self.get_by_name(name).await
	}

	async fn list(&self, query: &ListQuery) -> compass_taxonomy::Result<Page<Category>> {
		CategoryService::list(self, query).await
	}

	async fn update(
		&self,
		name: &str,
		patch: TaxonomyPatch,
		actor: Option<&str>,
		cascade: bool,
	) -> compass_taxonomy::Result<Option<Category>> {
		CategoryService::update(self, name, patch, actor, cascade).await
	}

	async fn delete(&self, name: &str) -> compass_taxonomy::Result<bool> {
		CategoryService::delete(self, name).await
	}

	async fn attach(&self, slug: &str, name: &str) -> compass_taxonomy::Result<bool> {
		self.assign_to_solution(slug, name).await
	}

	async fn detach(&self, slug: &str, name: &str) -> compass_taxonomy::Result<bool> {
		self.clear_from_solution(slug, name).await
	}

	async fn usage_counts(
		&self,
		names: Option<&[String]>,
	) -> compass_taxonomy::Result<HashMap<String, u64>> {
		CategoryService::usage_counts(self, names).await
	}
}

/// Run one subcommand and render its result
pub(crate) async fn execute<T: Taxonomy>(
	service: &T,
	command: EntryCommand,
	settings: &Settings,
	format: OutputFormat,
) -> anyhow::Result<String> {
	match command {
		EntryCommand::Create {
			name,
			description,
			actor,
		} => {
			let entry = service.create(&name, description, actor.as_deref()).await?;
			tracing::info!(kind = T::KIND, name = %entry.record().name, "created");
			render_entry::<T>(&entry, format, Some("Created"))
		}
		EntryCommand::Show { name } => {
			let entry = service
				.get(&name)
				.await?
				.ok_or_else(|| not_found::<T>(&name))?;
			render_entry::<T>(&entry, format, None)
		}
		EntryCommand::List {
			skip,
			limit,
			sort,
			include_unused,
		} => {
			let query = ListQuery::new()
				.skip(skip)
				.limit(limit.unwrap_or(settings.default_page_size))
				.include_unused(include_unused)
				.sort_key(&sort)?;
			let page = service.list(&query).await?;
			render_page::<T>(&page, format)
		}
		EntryCommand::Update {
			name,
			rename,
			description,
			clear_description,
			cascade,
			actor,
		} => {
			let mut patch = TaxonomyPatch::new();
			if let Some(new_name) = rename {
				patch = patch.rename(new_name);
			}
			if let Some(description) = description {
				patch = patch.describe(description);
			}
			if clear_description {
				patch = patch.clear_description();
			}
			if patch.is_empty() {
				return Err(TaxonomyError::InvalidArgument(
					"nothing to update: pass --rename, --description or --clear-description"
						.to_string(),
				)
				.into());
			}

			let entry = service
				.update(&name, patch, actor.as_deref(), cascade)
				.await?
				.ok_or_else(|| not_found::<T>(&name))?;
			tracing::info!(kind = T::KIND, name = %entry.record().name, cascade, "updated");
			render_entry::<T>(&entry, format, Some("Updated"))
		}
		EntryCommand::Delete { name } => {
			if !service.delete(&name).await? {
				return Err(not_found::<T>(&name).into());
			}
			tracing::info!(kind = T::KIND, %name, "deleted");
			render_ack(format, format!("Deleted {} '{}'", T::KIND, name))
		}
		EntryCommand::Attach { slug, name } => {
			if !service.attach(&slug, &name).await? {
				return Err(missing_association::<T>(&slug, &name).into());
			}
			render_ack(
				format,
				format!("Attached {} '{}' to solution '{}'", T::KIND, name, slug),
			)
		}
		EntryCommand::Detach { slug, name } => {
			if !service.detach(&slug, &name).await? {
				return Err(missing_association::<T>(&slug, &name).into());
			}
			render_ack(
				format,
				format!("Detached {} '{}' from solution '{}'", T::KIND, name, slug),
			)
		}
		EntryCommand::Usage { names } => {
			let filter = (!names.is_empty()).then_some(names.as_slice());
			let counts = service.usage_counts(filter).await?;
			render_counts(counts, format)
		}
	}
}

/// Process exit code for a failed command
///
/// Missing entries exit with 1, conflicts and invalid arguments with 2 and
/// anything else with 1.
pub(crate) fn exit_code(error: &anyhow::Error) -> i32 {
	match error.downcast_ref::<TaxonomyError>() {
		Some(TaxonomyError::Conflict { .. } | TaxonomyError::InvalidArgument(_)) => 2,
		_ => 1,
	}
}

fn not_found<T: Taxonomy>(name: &str) -> TaxonomyError {
	TaxonomyError::NotFound(format!("{} '{}'", T::KIND, name))
}

fn missing_association<T: Taxonomy>(slug: &str, name: &str) -> TaxonomyError {
	TaxonomyError::NotFound(format!(
		"solution '{}' or {} '{}'",
		slug,
		T::KIND,
		name
	))
}

fn render_entry<T: Taxonomy>(
	entry: &T::Entry,
	format: OutputFormat,
	action: Option<&str>,
) -> anyhow::Result<String> {
	if format == OutputFormat::Json {
		return Ok(serde_json::to_string_pretty(entry)?);
	}

	let record = entry.record();
	let mut lines = Vec::new();
	match action {
		Some(action) => lines.push(format!("{} {} {}", action, T::KIND, record.name.bold())),
		None => lines.push(format!("{} {}", T::KIND, record.name.bold())),
	}
	if let Some(description) = &record.description {
		lines.push(format!("  description: {}", description));
	}
	lines.push(format!("  usage:       {}", entry.usage_count()));
	lines.push(format!(
		"  created:     {}{}",
		record.created_at,
		by(record.created_by.as_deref())
	));
	lines.push(format!(
		"  updated:     {}{}",
		record.updated_at,
		by(record.updated_by.as_deref())
	));
	Ok(lines.join("\n"))
}

fn by(actor: Option<&str>) -> String {
	actor.map(|a| format!(" by {}", a)).unwrap_or_default()
}

fn render_page<T: Taxonomy>(page: &Page<T::Entry>, format: OutputFormat) -> anyhow::Result<String> {
	if format == OutputFormat::Json {
		return Ok(serde_json::to_string_pretty(page)?);
	}

	let mut lines: Vec<String> = page
		.items
		.iter()
		.map(|entry| format!("{:<40} {:>8}", entry.record().name, entry.usage_count()))
		.collect();
	lines.push(
		format!(
			"{} of {} {}",
			page.items.len(),
			page.total,
			plural(T::KIND, page.total)
		)
		.dimmed()
		.to_string(),
	);
	Ok(lines.join("\n"))
}

fn plural(kind: &str, n: u64) -> String {
	match (kind, n) {
		(_, 1) => kind.to_string(),
		("category", _) => "categories".to_string(),
		_ => format!("{}s", kind),
	}
}

fn render_counts(counts: HashMap<String, u64>, format: OutputFormat) -> anyhow::Result<String> {
	if format == OutputFormat::Json {
		let ordered: BTreeMap<String, u64> = counts.into_iter().collect();
		return Ok(serde_json::to_string_pretty(&ordered)?);
	}

	let mut rows: Vec<(String, u64)> = counts.into_iter().collect();
	rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
	if rows.is_empty() {
		return Ok("no approved usage".dimmed().to_string());
	}
	Ok(rows
		.iter()
		.map(|(name, count)| format!("{:<40} {:>8}", name, count))
		.collect::<Vec<_>>()
		.join("\n"))
}

fn render_ack(format: OutputFormat, message: String) -> anyhow::Result<String> {
	match format {
		OutputFormat::Json => Ok(serde_json::to_string_pretty(
			&serde_json::json!({ "ok": true, "message": message }),
		)?),
		OutputFormat::Human => Ok(message.green().to_string()),
	}
}
