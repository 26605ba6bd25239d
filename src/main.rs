//! Command-line interface for the statboard binary.
//!
//! Loads the run configuration, validates the repository list, fetches status
//! from GitHub and prints the report table to stdout as JSON or Markdown.
//! Logs and the progress bar go to stderr.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process,
    sync::Arc,
};

use clap::{ArgAction, Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use statboard::{
    Error, GitHubSource, ReportTable, RepositorySlug, RunConfig, aggregate_with_progress,
    io_error, load_config, load_registry, parse_slug_list, render_markdown, validate_slugs,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line interface for building repository status reports.
#[derive(Debug, Parser,)]
#[command(name = "statboard", version, about = "Aggregate release status for GitHub repositories")]
struct Cli
{
    /// Path to the YAML run configuration.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf,>,

    /// JSON array of `owner/repo` slugs; replaces the configured list.
    #[arg(long = "repos", value_name = "JSON")]
    repos: Option<String,>,

    /// Qualification registry CSV; replaces the configured path.
    #[arg(long = "registry", value_name = "PATH")]
    registry: Option<PathBuf,>,

    /// GitHub token; anonymous access is used when absent.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String,>,

    /// Base branch of the comparison.
    #[arg(long = "base", value_name = "BRANCH")]
    base: Option<String,>,

    /// Head branch of the comparison.
    #[arg(long = "head", value_name = "BRANCH")]
    head: Option<String,>,

    /// Deadline for each remote call in seconds.
    #[arg(long = "timeout", value_name = "SECONDS")]
    timeout: Option<u64,>,

    /// Number of repositories fetched at the same time.
    #[arg(long = "concurrency", value_name = "N")]
    concurrency: Option<usize,>,

    /// Output format written to stdout.
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum,)]
enum OutputFormat
{
    /// `{"rows": [...]}` with one object per repository.
    Json,
    /// Markdown table with HTML cells.
    Markdown,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    init_tracing();

    if let Err(error,) = run(Cli::parse(),).await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),);
    let _ = tracing_subscriber::fmt().with_env_filter(filter,).with_writer(io::stderr,).try_init();
}

/// Executes a report run.
///
/// # Errors
///
/// Propagates validation, configuration, registry and hard fetch failures.
async fn run(cli: Cli,) -> Result<(), Error,>
{
    let config = resolve_config(&cli,)?;
    let slugs = resolve_slugs(&cli, &config,)?;

    let registry = match config.registry.as_deref() {
        Some(path,) => {
            info!("Loading qualification registry from {}", path.display());
            load_registry(path,)?
        }
        None => None,
    };

    let source = Arc::new(GitHubSource::new(cli.token.as_deref(), config.api_base.as_deref(),)?,);
    let options = config.aggregate_options();

    let progress = ProgressBar::new(slugs.len() as u64,);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}",)
            .expect("valid template",),
    );

    let table = aggregate_with_progress(source, slugs, registry.as_ref(), &options, |slug| {
        progress.set_message(slug.to_string(),);
        progress.inc(1,);
    },)
    .await;
    progress.finish_and_clear();
    let table = table?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_table(&mut handle, &table, cli.format, cli.pretty,)
}

/// Loads the configuration file (if any) and applies CLI overrides.
fn resolve_config(cli: &Cli,) -> Result<RunConfig, Error,>
{
    let mut config = match cli.config.as_deref() {
        Some(path,) => load_config(path,)?,
        None => RunConfig::default(),
    };

    if let Some(registry,) = &cli.registry {
        config.registry = Some(registry.clone(),);
    }
    if let Some(base,) = &cli.base {
        config.base_branch = base.clone();
    }
    if let Some(head,) = &cli.head {
        config.head_branch = head.clone();
    }
    if let Some(timeout,) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(concurrency,) = cli.concurrency {
        config.max_concurrency = concurrency;
    }

    config.validate()?;
    Ok(config,)
}

fn resolve_slugs(cli: &Cli, config: &RunConfig,) -> Result<Vec<RepositorySlug,>, Error,>
{
    match cli.repos.as_deref().map(str::trim,).filter(|value| !value.is_empty(),) {
        Some(raw,) => parse_slug_list(raw,),
        None => validate_slugs(&config.repositories,),
    }
}

fn write_table<W: Write,>(
    writer: &mut W,
    table: &ReportTable,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), Error,>
{
    match format {
        OutputFormat::Json if pretty => serde_json::to_writer_pretty(&mut *writer, table,)?,
        OutputFormat::Json => serde_json::to_writer(&mut *writer, table,)?,
        OutputFormat::Markdown => writer
            .write_all(render_markdown(table,).as_bytes(),)
            .map_err(|source| io_error(Path::new("<stdout>",), source,),)?,
    }

    writer.flush().map_err(|source| io_error(Path::new("<stdout>",), source,),)
}
