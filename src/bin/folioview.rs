/// FolioView command line
///
/// Runs list-page views over a JSON dump of one admin collection (either
/// the API's `{ "data": [...] }` response or a bare array) and prints the
/// visible page, a CSV export or the status summary.

use clap::{Parser, Subcommand, ValueEnum};
use folioview::{
    decode_collection, distinct_values, export_file_name, AdminConfig, CareerApplication, Collection,
    ConfigError, ContactQuery, FilterSpec, ListPreset, PageSpec, Presence, Project, SortKind, SortOrder,
    SortSpec, SourceError, Subscriber, Target, ViewError, ViewQuery,
};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    View(#[from] ViewError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

/// Filter, sort, paginate and export admin dashboard collections
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file (defaults to FOLIO_* environment variables)
    #[clap(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of the view as JSON
    View {
        #[clap(flatten)]
        input: Input,
        #[clap(flatten)]
        query: QueryArgs,
        /// 1-based page number
        #[clap(long, default_value_t = 1)]
        page: usize,
        /// Rows per page (defaults to the collection's page size)
        #[clap(long)]
        page_size: Option<usize>,
    },
    /// Write the filtered and sorted rows as CSV
    Export {
        #[clap(flatten)]
        input: Input,
        #[clap(flatten)]
        query: QueryArgs,
        /// Output file; a dated name is used when only a directory is given
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
    /// Print status counts and the distinct values of a field
    Summary {
        #[clap(flatten)]
        input: Input,
        /// Field whose distinct values are listed
        #[clap(long)]
        distinct: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
struct Input {
    /// projects, careers, subscribers or contact-queries
    #[clap(long, short)]
    collection: Collection,
    /// JSON dump to read
    #[clap(long, short, value_name = "FILE")]
    file: PathBuf,
}

#[derive(clap::Args, Debug)]
struct QueryArgs {
    /// Search box text
    #[clap(long, short)]
    search: Option<String>,
    /// Equality filter, FIELD=VALUE ("all" disables it)
    #[clap(long = "equals", value_name = "FIELD=VALUE")]
    equals: Vec<String>,
    /// Keep only records where FIELD is present
    #[clap(long = "with", value_name = "FIELD")]
    with: Vec<String>,
    /// Keep only records where FIELD is missing or empty
    #[clap(long = "without", value_name = "FIELD")]
    without: Vec<String>,
    /// Sort field (defaults to newest first by createdAt)
    #[clap(long)]
    sort: Option<String>,
    #[clap(long, value_enum, default_value_t = OrderArg::Asc)]
    order: OrderArg,
    #[clap(long, value_enum, default_value_t = KindArg::Natural)]
    kind: KindArg,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OrderArg {
    Asc,
    Desc,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Natural,
    Instant,
}

impl QueryArgs {
    fn apply(&self, mut query: ViewQuery) -> Result<ViewQuery, CliError> {
        if let Some(search) = &self.search {
            for filter in &mut query.filters {
                if let FilterSpec::Text { query: q, .. } = filter {
                    *q = search.clone();
                }
            }
        }
        for pair in &self.equals {
            let (field, value) = pair
                .split_once('=')
                .ok_or_else(|| CliError::Usage(format!("expected FIELD=VALUE, got {:?}", pair)))?;
            query = query.filter(FilterSpec::equals(field, Target::parse(value)));
        }
        for field in &self.with {
            query = query.filter(FilterSpec::presence(field.as_str(), Presence::With));
        }
        for field in &self.without {
            query = query.filter(FilterSpec::presence(field.as_str(), Presence::Without));
        }
        if let Some(field) = &self.sort {
            let order = match self.order {
                OrderArg::Asc => SortOrder::Ascending,
                OrderArg::Desc => SortOrder::Descending,
            };
            let kind = match self.kind {
                KindArg::Natural => SortKind::Natural,
                KindArg::Instant => SortKind::Instant,
            };
            query = query.sort_by(SortSpec::new(field.as_str(), order).with_kind(kind));
        }
        Ok(query)
    }
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => AdminConfig::from_json_file(path)?,
        None => AdminConfig::from_env()?,
    };

    let collection = match &cli.command {
        Command::View { input, .. } | Command::Export { input, .. } | Command::Summary { input, .. } => {
            input.collection
        }
    };
    match collection {
        Collection::Projects => execute::<Project>(&cli.command, &config),
        Collection::Careers => execute::<CareerApplication>(&cli.command, &config),
        Collection::Subscribers => execute::<Subscriber>(&cli.command, &config),
        Collection::ContactQueries => execute::<ContactQuery>(&cli.command, &config),
    }
}

fn load<R: DeserializeOwned>(input: &Input) -> Result<Vec<R>, CliError> {
    let body = std::fs::read_to_string(&input.file)?;
    let records = decode_collection(&body)?;
    Ok(records)
}

fn execute<R>(command: &Command, config: &AdminConfig) -> Result<(), CliError>
where
    R: ListPreset + DeserializeOwned + Serialize,
{
    match command {
        Command::View {
            input,
            query,
            page,
            page_size,
        } => {
            let records: Vec<R> = load(input)?;
            let size = page_size.unwrap_or(R::PAGE_SIZE);
            let query = query.apply(R::default_query())?.page(PageSpec::new(size, *page));
            let result = query.run(&records)?;

            let output = json!({
                "collection": input.collection,
                "total_count": result.total_count,
                "filtered_count": result.filtered_count,
                "page_count": result.page_count,
                "page": result.page.page,
                "range": result.range(),
                "pages": result.page.window(config.page_window),
                "visible": result.visible,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Export { input, query, output } => {
            let export = R::csv_export().ok_or_else(|| {
                CliError::Usage(format!("{} has no CSV export", input.collection))
            })?;
            let records: Vec<R> = load(input)?;
            let rows = query.apply(R::default_query())?.derive(&records)?;

            let written = match output {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(export_file_name(R::NAME, chrono::Local::now().date_naive()))
                    } else {
                        path.clone()
                    };
                    let file = std::fs::File::create(&path)?;
                    let written = export.write(&rows, file)?;
                    info!("wrote {}", path.display());
                    written
                }
                None => export.write(&rows, std::io::stdout().lock())?,
            };
            info!("exported {} {}", written, R::NAME);
        }
        Command::Summary { input, distinct } => {
            let records: Vec<R> = load(input)?;
            let mut state = R::list_state();
            state.replace_records(records)?;

            let values = distinct
                .as_deref()
                .map(|field| distinct_values(state.records(), field));
            let output = json!({
                "collection": input.collection,
                "total": state.records().len(),
                "status": state.status_counts(),
                "distinct": values,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
