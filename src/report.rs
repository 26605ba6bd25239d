// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Row formatting for the status report.
///
/// Each cell is a self-contained HTML fragment. The release cell is driven by
/// [`ReleaseBadge`], resolved once per row and rendered by a single match.
use serde::Serialize;

use crate::{
    badge::{Badge, BadgeTheme, BadgeVariant, link},
    branch::{BranchComparison, describe_divergence},
    fetch::CompareRange,
    milestone::MilestoneProgress,
    qualification::{Qualification, QualificationMatch, resolve_qualification},
    registry::QualificationRegistry,
    release::Release,
    slug::RepositorySlug,
};

/// Column names of the output table, in order.
pub const COLUMNS: [&str; 5] =
    ["repo", "latest_release", "upcoming_milestones", "dev_branch_status", "ytd_releases",];

/// Default base URL for browser links.
pub const DEFAULT_WEB_BASE: &str = "https://github.com";

/// One rendered repository row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct ReportRow
{
    /// Repository link.
    #[serde(rename = "repo")]
    pub repo_label:           String,
    /// Latest release badge plus optional qualification badge.
    #[serde(rename = "latest_release")]
    pub latest_release_label: String,
    /// Milestone progress indicators.
    #[serde(rename = "upcoming_milestones")]
    pub milestones_label:     String,
    /// Divergence of the head branch from the base branch.
    #[serde(rename = "dev_branch_status")]
    pub branch_status_label:  String,
    /// Year-to-date release count.
    #[serde(rename = "ytd_releases")]
    pub ytd_releases_label:   String,
}

/// Ordered report table, one row per input repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default,)]
pub struct ReportTable
{
    /// Rows in input order.
    pub rows: Vec<ReportRow,>,
}

/// Release cell state.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum ReleaseBadge<'a,>
{
    /// The repository has no qualifying release.
    NoRelease,
    /// The repository has a release, optionally qualified.
    Released
    {
        /// Latest qualifying release.
        release:       &'a Release,
        /// Registry match for the release, if any.
        qualification: Option<Qualification,>,
    },
}

impl<'a,> ReleaseBadge<'a,>
{
    /// Resolves the cell state for `slug` from its latest release and the
    /// optional registry snapshot.
    pub fn resolve(
        slug: &RepositorySlug,
        release: Option<&'a Release,>,
        registry: Option<&QualificationRegistry,>,
    ) -> Self
    {
        match release {
            None => Self::NoRelease,
            Some(release,) => Self::Released {
                release,
                qualification: registry.and_then(|registry| {
                    resolve_qualification(slug.owner(), slug.name(), &release.tag, registry,)
                },),
            },
        }
    }
}

/// Builds browser URLs below a web base such as `https://github.com`.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct RepositoryLinks
{
    base: String,
}

impl Default for RepositoryLinks
{
    fn default() -> Self
    {
        Self::new(DEFAULT_WEB_BASE,)
    }
}

impl RepositoryLinks
{
    /// Uses `base` without its trailing slashes.
    pub fn new(base: &str,) -> Self
    {
        Self {
            base: base.trim_end_matches('/',).to_owned(),
        }
    }

    /// Repository home page.
    pub fn repository(&self, slug: &RepositorySlug,) -> String
    {
        format!("{}/{}", self.base, slug)
    }

    /// Releases listing.
    pub fn releases(&self, slug: &RepositorySlug,) -> String
    {
        format!("{}/{}/releases", self.base, slug)
    }

    /// Page of a single release tag.
    pub fn release_tag(&self, slug: &RepositorySlug, tag: &str,) -> String
    {
        format!("{}/{}/releases/tag/{}", self.base, slug, tag)
    }

    /// Milestones listing.
    pub fn milestones(&self, slug: &RepositorySlug,) -> String
    {
        format!("{}/{}/milestones", self.base, slug)
    }

    /// Page of a numbered milestone.
    pub fn milestone(&self, slug: &RepositorySlug, number: u64,) -> String
    {
        format!("{}/{}/milestone/{}", self.base, slug, number)
    }

    /// Comparison view between two branches.
    pub fn compare(&self, slug: &RepositorySlug, range: &CompareRange,) -> String
    {
        format!("{}/{}/compare/{}...{}", self.base, slug, range.base, range.head)
    }
}

/// Renders individual report cells.
#[derive(Debug, Clone,)]
pub struct RowFormatter<'a,>
{
    theme: &'a BadgeTheme,
    links: &'a RepositoryLinks,
    range: &'a CompareRange,
}

impl<'a,> RowFormatter<'a,>
{
    /// Creates a formatter using the given theme, link base and branches.
    pub fn new(theme: &'a BadgeTheme, links: &'a RepositoryLinks, range: &'a CompareRange,) -> Self
    {
        Self {
            theme, links, range,
        }
    }

    /// Link to the repository labelled with its slug.
    pub fn repo_label(&self, slug: &RepositorySlug,) -> String
    {
        link(&slug.to_string(), &self.links.repository(slug,),)
    }

    /// Latest release cell.
    pub fn release_label(&self, slug: &RepositorySlug, badge: &ReleaseBadge<'_,>,) -> String
    {
        match badge {
            ReleaseBadge::NoRelease => {
                let href = self.links.releases(slug,);
                Badge::new(BadgeVariant::Amber, "No release",).link(&href,).render(self.theme,)
            }
            ReleaseBadge::Released {
                release,
                qualification,
            } => {
                let href = release
                    .url
                    .clone()
                    .filter(|url| !url.is_empty(),)
                    .unwrap_or_else(|| self.links.release_tag(slug, &release.tag,),);
                let tooltip = match release.date_label() {
                    Some(date,) => format!("Released {date}"),
                    None => "Release date unknown".to_owned(),
                };

                let mut cell = Badge::new(BadgeVariant::Sky, &release.tag,)
                    .tooltip(&tooltip,)
                    .link(&href,)
                    .render(self.theme,);

                if let Some(qualification,) = qualification {
                    cell.push(' ',);
                    cell.push_str(&self.qualification_label(qualification,),);
                }
                cell
            }
        }
    }

    fn qualification_label(&self, qualification: &Qualification,) -> String
    {
        match qualification {
            Qualification::Exact(found,) => {
                let tooltip = match found.date.as_deref() {
                    Some(date,) => format!("Package qualified on {date}"),
                    None => "Package qualified".to_owned(),
                };
                self.render_match(BadgeVariant::Emerald, "Qualified", &tooltip, found,)
            }
            Qualification::Prior(found,) => {
                let mut tooltip = String::from("Previously qualified",);
                if let Some(version,) = found.version.as_deref() {
                    tooltip.push_str(&format!(" (version {version})"),);
                }
                if let Some(date,) = found.date.as_deref() {
                    tooltip.push_str(&format!(" on {date}"),);
                }
                self.render_match(BadgeVariant::Slate, "Previously qualified", &tooltip, found,)
            }
        }
    }

    fn render_match(
        &self,
        variant: BadgeVariant,
        text: &str,
        tooltip: &str,
        found: &QualificationMatch,
    ) -> String
    {
        Badge::new(variant, text,).tooltip(tooltip,).link(&found.url,).render(self.theme,)
    }

    /// Milestone progress cell; a single `None` placeholder when no
    /// milestone has issues.
    pub fn milestones_label(&self, slug: &RepositorySlug, progress: &[MilestoneProgress],) -> String
    {
        if progress.is_empty() {
            let href = self.links.milestones(slug,);
            return Badge::new(BadgeVariant::Slate, "None",).link(&href,).render(self.theme,);
        }

        progress
            .iter()
            .map(|milestone| {
                let href = milestone
                    .url
                    .clone()
                    .filter(|url| !url.is_empty(),)
                    .or_else(|| milestone.number.map(|number| self.links.milestone(slug, number,),),)
                    .unwrap_or_else(|| self.links.milestones(slug,),);
                Badge::new(BadgeVariant::Sky, &milestone.title,)
                    .progress(milestone.percent(),)
                    .tooltip(&milestone.tooltip(),)
                    .link(&href,)
                    .render(self.theme,)
            },)
            .collect::<Vec<_,>>()
            .join(" ",)
    }

    /// Branch divergence cell.
    pub fn branch_label(&self, slug: &RepositorySlug, comparison: Option<&BranchComparison,>,) -> String
    {
        let text = describe_divergence(comparison,);
        match comparison {
            None => Badge::new(BadgeVariant::Rose, &text,).render(self.theme,),
            Some(counts,) => {
                let variant = if counts.ahead_by == 0 && counts.behind_by == 0 {
                    BadgeVariant::Emerald
                } else {
                    BadgeVariant::Amber
                };
                let href = self.links.compare(slug, self.range,);
                let tooltip = format!("{} compared with {}", self.range.head, self.range.base);
                Badge::new(variant, &text,).tooltip(&tooltip,).link(&href,).render(self.theme,)
            }
        }
    }

    /// Year-to-date count cell, always linking to the releases listing.
    pub fn ytd_label(&self, slug: &RepositorySlug, count: usize, year: i32,) -> String
    {
        let href = self.links.releases(slug,);
        let text = count.to_string();
        let tooltip = format!("Releases published in {year}");
        Badge::new(BadgeVariant::Sky, &text,).tooltip(&tooltip,).link(&href,).render(self.theme,)
    }
}

/// Renders the table as a Markdown document with the [`COLUMNS`] header.
///
/// Pipe characters inside cells are escaped and line breaks are collapsed so
/// every row stays on one line.
pub fn render_markdown(table: &ReportTable,) -> String
{
    let mut output = String::with_capacity(256 + table.rows.len() * 512,);
    output.push_str(&format!("| {} |\n", COLUMNS.join(" | ")),);
    output.push_str(&format!("|{}\n", " --- |".repeat(COLUMNS.len(),)),);

    for row in &table.rows {
        let cells = [
            &row.repo_label,
            &row.latest_release_label,
            &row.milestones_label,
            &row.branch_status_label,
            &row.ytd_releases_label,
        ];
        let escaped: Vec<String,> = cells.iter().map(|cell| markdown_cell(cell,),).collect();
        output.push_str(&format!("| {} |\n", escaped.join(" | ")),);
    }

    output
}

fn markdown_cell(cell: &str,) -> String
{
    cell.replace('|', "\\|",).replace(['\r', '\n',], " ",)
}
