// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Qualification registry matching.
///
/// A release tag matches a registry version either verbatim or with its
/// leading `v` removed, so `v1.2.0` matches both `v1.2.0` and `1.2.0`.
///
/// Exact lookups take the first matching row in registry order. Prior
/// lookups take the most recently dated row among the other versions of the
/// same repository; when no row carries a parsable date the first row in
/// registry order wins.
use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    registry::{QualificationEntry, QualificationRegistry},
    release::parse_release_date,
};

/// Qualification data resolved from a registry row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct QualificationMatch
{
    /// Link to the qualification record (or the release page as fallback).
    pub url:     String,
    /// Qualification date (or release date as fallback).
    pub date:    Option<String,>,
    /// Registry version of the matched row.
    pub version: Option<String,>,
}

/// Outcome of matching a release against the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Qualification
{
    /// The current release itself is qualified.
    Exact(QualificationMatch,),
    /// Only another version of the repository is qualified.
    Prior(QualificationMatch,),
}

/// Matches the current release first exactly, then against other versions.
pub fn resolve_qualification(
    owner: &str,
    repo: &str,
    tag: &str,
    registry: &QualificationRegistry,
) -> Option<Qualification,>
{
    if let Some(found,) = lookup_exact(owner, repo, tag, registry,) {
        return Some(Qualification::Exact(found,),);
    }
    lookup_prior(owner, repo, tag, registry,).map(Qualification::Prior,)
}

/// Finds the registry row qualifying exactly this release.
///
/// Returns `None` when no row matches or the first matching row has neither a
/// qualification URL nor a release URL.
///
/// # Examples
///
/// ```
/// use statboard::{QualificationEntry, QualificationRegistry, lookup_exact};
///
/// let registry = QualificationRegistry::new(vec![QualificationEntry {
///     org:                "org".to_owned(),
///     repo:               "repo".to_owned(),
///     version:            "1.0.0".to_owned(),
///     release_url:        None,
///     release_date:       None,
///     qualification_url:  Some("https://q.example/1".to_owned(),),
///     qualification_date: Some("2025-02-01".to_owned(),),
/// }],);
///
/// let found = lookup_exact("org", "repo", "v1.0.0", &registry,).expect("match",);
/// assert_eq!(found.url, "https://q.example/1");
/// assert!(lookup_exact("org", "repo", "v1.1.0", &registry,).is_none());
/// ```
pub fn lookup_exact(
    owner: &str,
    repo: &str,
    tag: &str,
    registry: &QualificationRegistry,
) -> Option<QualificationMatch,>
{
    let candidates = VersionCandidates::new(tag,);
    registry
        .entries()
        .iter()
        .find(|entry| belongs_to(entry, owner, repo,) && candidates.contains(&entry.version,),)
        .and_then(to_match,)
}

/// Finds the most recently qualified other version of the repository.
///
/// Rows are dated by their qualification date, falling back to the release
/// date. Undated rows lose against dated ones; if none is dated, the first
/// candidate row in registry order is selected.
pub fn lookup_prior(
    owner: &str,
    repo: &str,
    tag: &str,
    registry: &QualificationRegistry,
) -> Option<QualificationMatch,>
{
    let candidates = VersionCandidates::new(tag,);
    let mut selected: Option<(&QualificationEntry, Option<NaiveDate,>,),> = None;

    for entry in registry.entries() {
        if !belongs_to(entry, owner, repo,) || candidates.contains(&entry.version,) {
            continue;
        }

        let dated = entry_date(entry,);
        selected = match selected {
            None => Some((entry, dated,),),
            Some((_, None,),) if dated.is_some() => Some((entry, dated,),),
            Some((_, Some(best,),),) if dated.is_some_and(|date| date > best,) => {
                Some((entry, dated,),)
            }
            keep => keep,
        };
    }

    selected.and_then(|(entry, _,)| to_match(entry,),)
}

/// Parses registry dates written as `YYYY-MM-DD` or full RFC 3339 timestamps.
pub fn parse_registry_date(value: Option<&str,>,) -> Option<NaiveDate,>
{
    let trimmed = value?.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d",)
        .ok()
        .or_else(|| parse_release_date(Some(trimmed,),),)
}

struct VersionCandidates<'tag,>
{
    tag:      &'tag str,
    stripped: Option<&'tag str,>,
}

impl<'tag,> VersionCandidates<'tag,>
{
    fn new(tag: &'tag str,) -> Self
    {
        Self {
            tag, stripped: tag.strip_prefix('v',),
        }
    }

    fn contains(&self, version: &str,) -> bool
    {
        version == self.tag || self.stripped.is_some_and(|stripped| version == stripped,)
    }
}

fn belongs_to(entry: &QualificationEntry, owner: &str, repo: &str,) -> bool
{
    entry.org == owner && entry.repo == repo
}

fn entry_date(entry: &QualificationEntry,) -> Option<NaiveDate,>
{
    parse_registry_date(entry.qualification_date.as_deref(),)
        .or_else(|| parse_registry_date(entry.release_date.as_deref(),),)
}

fn to_match(entry: &QualificationEntry,) -> Option<QualificationMatch,>
{
    let url = entry.qualification_url.as_ref().or(entry.release_url.as_ref(),)?.clone();
    let date = entry.qualification_date.clone().or_else(|| entry.release_date.clone(),);

    Some(QualificationMatch {
        url,
        date,
        version: Some(entry.version.clone(),).filter(|version| !version.is_empty(),),
    },)
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn entry(
        version: &str,
        qualification_url: Option<&str,>,
        qualification_date: Option<&str,>,
        release_date: Option<&str,>,
    ) -> QualificationEntry
    {
        QualificationEntry {
            org:                "org".to_owned(),
            repo:               "repo".to_owned(),
            version:            version.to_owned(),
            release_url:        None,
            release_date:       release_date.map(str::to_owned,),
            qualification_url:  qualification_url.map(str::to_owned,),
            qualification_date: qualification_date.map(str::to_owned,),
        }
    }

    fn registry(entries: Vec<QualificationEntry,>,) -> QualificationRegistry
    {
        QualificationRegistry::new(entries,)
    }

    #[test]
    fn exact_match_on_verbatim_tag()
    {
        let table = registry(vec![entry("v1.0.0", Some("https://q/1",), Some("2025-01-01",), None,)],);
        let resolved = resolve_qualification("org", "repo", "v1.0.0", &table,);
        match resolved {
            Some(Qualification::Exact(found,),) => {
                assert_eq!(found.url, "https://q/1");
                assert_eq!(found.date.as_deref(), Some("2025-01-01"));
                assert_eq!(found.version.as_deref(), Some("v1.0.0"));
            }
            other => panic!("expected exact match, got {other:?}"),
        }
    }

    #[test]
    fn newer_tag_falls_back_to_prior_version()
    {
        let table = registry(vec![entry("v1.0.0", Some("https://q/1",), Some("2025-01-01",), None,)],);
        match resolve_qualification("org", "repo", "v1.1.0", &table,) {
            Some(Qualification::Prior(found,),) => {
                assert_eq!(found.version.as_deref(), Some("v1.0.0"));
            }
            other => panic!("expected prior match, got {other:?}"),
        }
    }

    #[test]
    fn exact_match_strips_leading_v()
    {
        let table = registry(vec![entry("2.0.0", Some("https://q/2",), None, None,)],);
        assert!(lookup_exact("org", "repo", "v2.0.0", &table,).is_some());
        assert!(lookup_exact("org", "repo", "2.0.0", &table,).is_some());
    }

    #[test]
    fn exact_match_ignores_other_repositories()
    {
        let mut other = entry("v1.0.0", Some("https://q/1",), None, None,);
        other.repo = "elsewhere".to_owned();
        let table = registry(vec![other],);
        assert!(lookup_exact("org", "repo", "v1.0.0", &table,).is_none());
        assert!(lookup_prior("org", "repo", "v1.0.0", &table,).is_none());
    }

    #[test]
    fn exact_match_takes_first_row_and_requires_url()
    {
        let table = registry(vec![
            entry("v1.0.0", None, Some("2025-01-01",), None,),
            entry("1.0.0", Some("https://q/later",), Some("2025-02-01",), None,),
        ],);
        assert!(lookup_exact("org", "repo", "v1.0.0", &table,).is_none());
    }

    #[test]
    fn exact_match_falls_back_to_release_url()
    {
        let mut row = entry("v1.0.0", None, None, Some("2024-12-24",),);
        row.release_url = Some("https://github.com/org/repo/releases/tag/v1.0.0".to_owned(),);
        let found = lookup_exact("org", "repo", "v1.0.0", &registry(vec![row],),).expect("match",);
        assert_eq!(found.url, "https://github.com/org/repo/releases/tag/v1.0.0");
        assert_eq!(found.date.as_deref(), Some("2024-12-24"));
    }

    #[test]
    fn prior_selects_most_recent_dated_row()
    {
        let table = registry(vec![
            entry("v0.8.0", Some("https://q/8",), Some("2024-03-01",), None,),
            entry("v0.9.0", Some("https://q/9",), None, Some("2024-09-01",),),
            entry("v0.7.0", Some("https://q/7",), Some("garbage",), None,),
        ],);
        let found = lookup_prior("org", "repo", "v1.0.0", &table,).expect("prior match",);
        assert_eq!(found.version.as_deref(), Some("v0.9.0"));
    }

    #[test]
    fn prior_prefers_dated_rows_over_undated_ones()
    {
        let table = registry(vec![
            entry("v0.1.0", Some("https://q/1",), None, None,),
            entry("v0.2.0", Some("https://q/2",), Some("2023-05-05",), None,),
        ],);
        let found = lookup_prior("org", "repo", "v1.0.0", &table,).expect("prior match",);
        assert_eq!(found.version.as_deref(), Some("v0.2.0"));
    }

    #[test]
    fn prior_uses_first_row_when_no_date_parses()
    {
        let table = registry(vec![
            entry("v0.5.0", Some("https://q/5",), Some("soon",), None,),
            entry("v0.6.0", Some("https://q/6",), None, None,),
        ],);
        let found = lookup_prior("org", "repo", "v1.0.0", &table,).expect("prior match",);
        assert_eq!(found.version.as_deref(), Some("v0.5.0"));
    }

    #[test]
    fn prior_excludes_current_version_candidates()
    {
        let table = registry(vec![entry("1.0.0", Some("https://q/1",), Some("2025-01-01",), None,)],);
        assert!(lookup_prior("org", "repo", "v1.0.0", &table,).is_none());
    }

    #[test]
    fn prior_keeps_first_row_on_equal_dates()
    {
        let table = registry(vec![
            entry("v0.3.0", Some("https://q/3",), Some("2024-01-01",), None,),
            entry("v0.4.0", Some("https://q/4",), Some("2024-01-01T12:00:00Z",), None,),
        ],);
        let found = lookup_prior("org", "repo", "v1.0.0", &table,).expect("prior match",);
        assert_eq!(found.version.as_deref(), Some("v0.3.0"));
    }

    #[test]
    fn registry_dates_accept_plain_and_timestamp_forms()
    {
        assert_eq!(parse_registry_date(Some("2025-02-03",),), NaiveDate::from_ymd_opt(2025, 2, 3,));
        assert_eq!(
            parse_registry_date(Some("2025-02-03T08:00:00Z",),),
            NaiveDate::from_ymd_opt(2025, 2, 3,)
        );
        assert_eq!(parse_registry_date(Some("03/02/2025",),), None);
        assert_eq!(parse_registry_date(None,), None);
    }
}
