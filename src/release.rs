// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Release history analysis.
///
/// Derives the latest qualifying release and the year-to-date release count
/// from release lists in the order the API returned them (newest first).
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Release entry as returned by `GET /repos/{owner}/{repo}/releases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Release
{
    /// Git tag the release points at.
    #[serde(rename = "tag_name")]
    pub tag:           String,
    /// ISO-8601 publication timestamp; drafts have none.
    #[serde(default)]
    pub published_at:  Option<String,>,
    /// Whether the release is an unpublished draft.
    #[serde(default, rename = "draft")]
    pub is_draft:      bool,
    /// Whether the release is flagged as a prerelease.
    #[serde(default, rename = "prerelease")]
    pub is_prerelease: bool,
    /// Browser URL of the release page.
    #[serde(default, rename = "html_url")]
    pub url:           Option<String,>,
}

impl Release
{
    /// Returns `true` for published, non-prerelease entries.
    pub fn is_qualifying(&self,) -> bool
    {
        !self.is_draft && !self.is_prerelease
    }

    /// Returns the first ten characters of the publication timestamp, which is
    /// the `YYYY-MM-DD` part of an ISO-8601 value.
    pub fn date_label(&self,) -> Option<&str,>
    {
        let published = self.published_at.as_deref()?.trim();
        if published.is_empty() {
            return None;
        }
        Some(published.get(..10,).unwrap_or(published,),)
    }
}

/// Returns the first published, non-prerelease entry in iteration order.
///
/// The input is assumed to be newest first; no re-sorting is performed.
///
/// # Examples
///
/// ```
/// use statboard::{Release, latest_qualifying_release};
///
/// let releases = vec![
///     Release {
///         tag:           "v2.0.0-rc.1".to_owned(),
///         published_at:  None,
///         is_draft:      false,
///         is_prerelease: true,
///         url:           None,
///     },
///     Release {
///         tag:           "v1.9.0".to_owned(),
///         published_at:  Some("2025-01-02T00:00:00Z".to_owned(),),
///         is_draft:      false,
///         is_prerelease: false,
///         url:           None,
///     },
/// ];
/// let latest = latest_qualifying_release(&releases,).map(|release| release.tag.as_str(),);
/// assert_eq!(latest, Some("v1.9.0"));
/// ```
pub fn latest_qualifying_release<'a, I,>(releases: I,) -> Option<&'a Release,>
where
    I: IntoIterator<Item = &'a Release,>,
{
    releases.into_iter().find(|release| release.is_qualifying(),)
}

/// Counts qualifying releases published during `year`.
///
/// Entries without a parsable publication timestamp are skipped.
pub fn count_year_to_date_releases(releases: &[Release], year: i32,) -> usize
{
    releases
        .iter()
        .filter(|release| release.is_qualifying(),)
        .filter_map(|release| parse_release_date(release.published_at.as_deref(),),)
        .filter(|date| date.year() == year,)
        .count()
}

/// Parses an ISO-8601 UTC timestamp such as `2026-03-15T10:00:00Z` into its
/// calendar date.
///
/// Returns `None` for absent, blank or malformed input.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use statboard::parse_release_date;
///
/// assert_eq!(
///     parse_release_date(Some("2026-03-15T10:00:00Z")),
///     NaiveDate::from_ymd_opt(2026, 3, 15)
/// );
/// assert_eq!(parse_release_date(Some("")), None);
/// assert_eq!(parse_release_date(None), None);
/// ```
pub fn parse_release_date(value: Option<&str,>,) -> Option<NaiveDate,>
{
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(trimmed,)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc,).date_naive(),)
}
