//! Repository status aggregation for release dashboards.
//!
//! The library fetches release, milestone and branch data for a list of
//! `owner/repo` slugs, matches releases against a qualification registry and
//! renders one row of HTML fragments per repository. Missing or forbidden
//! resources degrade individual cells; any other remote failure aborts the
//! run.

mod aggregate;
mod badge;
mod branch;
mod config;
mod error;
mod fetch;
mod milestone;
mod qualification;
mod registry;
mod release;
mod report;
mod slug;
mod source;

pub use aggregate::{
    AggregateOptions, DEFAULT_MAX_CONCURRENCY, DEFAULT_TIMEOUT, RepositoryStatus, aggregate,
    aggregate_with_progress, build_row, fetch_repository_status,
};
pub use badge::{Badge, BadgeTheme, BadgeVariant, escape_html, link};
pub use branch::{BranchComparison, IN_SYNC, UNAVAILABLE, describe_divergence};
pub use config::{RunConfig, load_config, parse_config};
pub use error::{Error, io_error};
pub use fetch::{CompareRange, FailureClass, FetchKind, PAGE_SIZE, classify, fetch, guarded};
pub use milestone::{Milestone, MilestoneProgress, summarize_milestones};
pub use qualification::{
    Qualification, QualificationMatch, lookup_exact, lookup_prior, parse_registry_date,
    resolve_qualification,
};
pub use registry::{QualificationEntry, QualificationRegistry, REQUIRED_COLUMNS, load_registry};
pub use release::{
    Release, count_year_to_date_releases, latest_qualifying_release, parse_release_date,
};
pub use report::{
    COLUMNS, DEFAULT_WEB_BASE, ReleaseBadge, ReportRow, ReportTable, RepositoryLinks, RowFormatter,
    render_markdown,
};
pub use slug::{RepositorySlug, parse_slug_list, validate_slug_values, validate_slugs};
pub use source::{ApiRequest, GitHubSource, SourceFailure, StatusSource};
