// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Aggregation of per-repository status into the report table.
///
/// Repositories are fetched concurrently, bounded by a semaphore, with the
/// four requests of a repository issued together. Results land in an
/// index-addressed table so row order always equals input order. The first
/// hard failure aborts the run; outstanding tasks are cancelled when the task
/// set is dropped.
use std::{sync::Arc, time::Duration};

use chrono::{Datelike, Utc};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, info};

use crate::{
    badge::BadgeTheme,
    branch::BranchComparison,
    error::Error,
    fetch::{CompareRange, FetchKind, fetch},
    milestone::{Milestone, summarize_milestones},
    registry::QualificationRegistry,
    release::{Release, count_year_to_date_releases, latest_qualifying_release},
    report::{ReleaseBadge, ReportRow, ReportTable, RepositoryLinks, RowFormatter},
    slug::RepositorySlug,
    source::StatusSource,
};

/// Default deadline for a single remote call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10,);
/// Default number of repositories processed at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Settings for one aggregation run.
#[derive(Debug, Clone,)]
pub struct AggregateOptions
{
    /// Deadline applied to every remote call.
    pub timeout:         Duration,
    /// Upper bound on repositories fetched at the same time.
    pub max_concurrency: usize,
    /// Branches compared for the branch status column.
    pub compare:         CompareRange,
    /// Year used for YTD counting; the current UTC year when `None`.
    pub year:            Option<i32,>,
    /// Builder for browser links.
    pub links:           RepositoryLinks,
    /// Styling applied to every fragment.
    pub theme:           BadgeTheme,
}

impl Default for AggregateOptions
{
    fn default() -> Self
    {
        Self {
            timeout:         DEFAULT_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            compare:         CompareRange::default(),
            year:            None,
            links:           RepositoryLinks::default(),
            theme:           BadgeTheme::default(),
        }
    }
}

/// Raw results of the four requests for one repository; `None` marks an
/// absent or forbidden resource.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct RepositoryStatus
{
    /// Repository the data belongs to.
    pub slug:       RepositorySlug,
    /// Result of the latest-release endpoint.
    pub latest:     Option<Release,>,
    /// Release history, newest first.
    pub releases:   Option<Vec<Release,>,>,
    /// Open milestones.
    pub milestones: Option<Vec<Milestone,>,>,
    /// Base/head comparison.
    pub comparison: Option<BranchComparison,>,
}

impl RepositoryStatus
{
    /// Latest qualifying release: the latest-release endpoint when it
    /// qualifies, otherwise the first qualifying entry of the history.
    pub fn latest_release(&self,) -> Option<&Release,>
    {
        let history = self.releases.as_deref().unwrap_or_default();
        latest_qualifying_release(self.latest.iter().chain(history.iter(),),)
    }
}

/// Issues the four requests for `slug` concurrently.
///
/// # Errors
///
/// Returns the first hard failure reported by any of the requests.
pub async fn fetch_repository_status<S,>(
    source: &S,
    slug: RepositorySlug,
    options: &AggregateOptions,
) -> Result<RepositoryStatus, Error,>
where
    S: StatusSource,
{
    let range = &options.compare;
    let deadline = options.timeout;

    let (latest, releases, milestones, comparison,) = tokio::try_join!(
        fetch::<S, Release,>(source, &slug, FetchKind::LatestRelease, range, deadline),
        fetch::<S, Vec<Release,>,>(source, &slug, FetchKind::ReleaseHistory, range, deadline),
        fetch::<S, Vec<Milestone,>,>(source, &slug, FetchKind::OpenMilestones, range, deadline),
        fetch::<S, BranchComparison,>(source, &slug, FetchKind::BranchComparison, range, deadline),
    )?;

    Ok(RepositoryStatus {
        slug,
        latest,
        releases,
        milestones,
        comparison,
    },)
}

/// Formats one fetched repository into a report row.
pub fn build_row(
    status: &RepositoryStatus,
    registry: Option<&QualificationRegistry,>,
    options: &AggregateOptions,
    year: i32,
) -> ReportRow
{
    let formatter = RowFormatter::new(&options.theme, &options.links, &options.compare,);
    let slug = &status.slug;

    let badge = ReleaseBadge::resolve(slug, status.latest_release(), registry,);
    let progress = summarize_milestones(status.milestones.as_deref().unwrap_or_default(),);
    let ytd = count_year_to_date_releases(status.releases.as_deref().unwrap_or_default(), year,);

    ReportRow {
        repo_label:           formatter.repo_label(slug,),
        latest_release_label: formatter.release_label(slug, &badge,),
        milestones_label:     formatter.milestones_label(slug, &progress,),
        branch_status_label:  formatter.branch_label(slug, status.comparison.as_ref(),),
        ytd_releases_label:   formatter.ytd_label(slug, ytd, year,),
    }
}

/// Builds the report table for `slugs`.
///
/// # Errors
///
/// Returns the first hard failure; no partial table is produced.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use statboard::{AggregateOptions, GitHubSource, aggregate, validate_slugs};
///
/// # async fn example() -> Result<(), statboard::Error> {
/// let source = Arc::new(GitHubSource::new(None, None,)?,);
/// let slugs = validate_slugs(&["octocat/hello-world",],)?;
/// let table = aggregate(source, slugs, None, &AggregateOptions::default(),).await?;
/// assert_eq!(table.rows.len(), 1);
/// # Ok(())
/// # }
/// ```
pub async fn aggregate<S,>(
    source: Arc<S,>,
    slugs: Vec<RepositorySlug,>,
    registry: Option<&QualificationRegistry,>,
    options: &AggregateOptions,
) -> Result<ReportTable, Error,>
where
    S: StatusSource + 'static,
{
    aggregate_with_progress(source, slugs, registry, options, |_| {},).await
}

/// Same as [`aggregate`], invoking `on_complete` after each repository's
/// requests finish (in completion order).
///
/// # Errors
///
/// Returns the first hard failure; no partial table is produced.
pub async fn aggregate_with_progress<S, P,>(
    source: Arc<S,>,
    slugs: Vec<RepositorySlug,>,
    registry: Option<&QualificationRegistry,>,
    options: &AggregateOptions,
    mut on_complete: P,
) -> Result<ReportTable, Error,>
where
    S: StatusSource + 'static,
    P: FnMut(&RepositorySlug,),
{
    let year = options.year.unwrap_or_else(|| Utc::now().year(),);
    let total = slugs.len();
    info!("Aggregating status for {} repositories", total);

    let budget = Arc::new(Semaphore::new(options.max_concurrency.max(1,),),);
    let shared = Arc::new(options.clone(),);
    let mut tasks = JoinSet::new();

    for (index, slug,) in slugs.into_iter().enumerate() {
        let source = Arc::clone(&source,);
        let budget = Arc::clone(&budget,);
        let shared = Arc::clone(&shared,);
        tasks.spawn(async move {
            let _permit = budget
                .acquire_owned()
                .await
                .map_err(|e| Error::service(format!("request budget closed: {e}"),),)?;
            let status = fetch_repository_status(source.as_ref(), slug, &shared,).await?;
            Ok::<_, Error,>((index, status,),)
        },);
    }

    let mut statuses: Vec<Option<RepositoryStatus,>,> = (0..total).map(|_| None,).collect();
    while let Some(joined,) = tasks.join_next().await {
        let (index, status,) =
            joined.map_err(|e| Error::service(format!("repository task failed: {e}"),),)??;
        debug!("Fetched status for {}", status.slug);
        on_complete(&status.slug,);
        statuses[index] = Some(status,);
    }

    let mut rows = Vec::with_capacity(total,);
    for (index, status,) in statuses.into_iter().enumerate() {
        let status = status
            .ok_or_else(|| Error::service(format!("missing status for repository #{index}"),),)?;
        rows.push(build_row(&status, registry, options, year,),);
    }

    info!("Built {} report rows", rows.len());
    Ok(ReportTable {
        rows,
    },)
}
