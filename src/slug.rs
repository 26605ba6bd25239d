// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Validation of `owner/repo` repository identifiers.
//!
//! A slug is accepted when it contains exactly one `/` separating two
//! non-empty segments. Validation is all-or-nothing: a single malformed entry
//! rejects the whole list before any remote call is issued.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::Error;

static SLUG_PATTERN: LazyLock<Regex,> =
    LazyLock::new(|| Regex::new(r"^[^/]+/[^/]+$",).expect("valid slug pattern",),);

/// Repository identifier split into owner and repository name.
#[derive(Debug, Clone, PartialEq, Eq, Hash,)]
pub struct RepositorySlug
{
    owner: String,
    name:  String,
}

impl RepositorySlug
{
    /// Account or organization that owns the repository.
    pub fn owner(&self,) -> &str
    {
        &self.owner
    }

    /// Repository name without the owner prefix.
    pub fn name(&self,) -> &str
    {
        &self.name
    }
}

impl FromStr for RepositorySlug
{
    type Err = Error;

    /// Parses a single `owner/repo` identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use statboard::RepositorySlug;
    ///
    /// let slug: RepositorySlug = "octocat/hello-world".parse()?;
    /// assert_eq!(slug.owner(), "octocat");
    /// assert_eq!(slug.name(), "hello-world");
    /// # Ok::<(), statboard::Error>(())
    /// ```
    fn from_str(value: &str,) -> Result<Self, Self::Err,>
    {
        if value.is_empty() {
            return Err(Error::validation("repository identifiers cannot be empty strings",),);
        }

        if !SLUG_PATTERN.is_match(value,) {
            return Err(Error::validation(format!(
                "repository identifier '{value}' must have the form owner/repo"
            ),),);
        }

        let (owner, name,) = value
            .split_once('/',)
            .ok_or_else(|| Error::validation(format!("repository identifier '{value}' has no owner"),),)?;

        Ok(Self {
            owner: owner.to_owned(), name: name.to_owned(),
        },)
    }
}

impl fmt::Display for RepositorySlug
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl Serialize for RepositorySlug
{
    fn serialize<S,>(&self, serializer: S,) -> Result<S::Ok, S::Error,>
    where
        S: Serializer,
    {
        serializer.collect_str(self,)
    }
}

/// Validates an ordered list of repository identifiers.
///
/// The returned slugs preserve input order one-to-one and render back to the
/// exact input strings.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the list is empty, an entry is empty, or
/// an entry does not consist of exactly two non-empty `/`-separated segments.
///
/// # Examples
///
/// ```
/// use statboard::validate_slugs;
///
/// let slugs = validate_slugs(&["octocat/hello", "rust-lang/rust",],)?;
/// assert_eq!(slugs[1].to_string(), "rust-lang/rust");
/// assert!(validate_slugs(&["a/b/c",]).is_err());
/// # Ok::<(), statboard::Error>(())
/// ```
pub fn validate_slugs<S,>(entries: &[S],) -> Result<Vec<RepositorySlug,>, Error,>
where
    S: AsRef<str,>,
{
    if entries.is_empty() {
        return Err(Error::validation("repository list must contain at least one entry",),);
    }

    entries.iter().map(|entry| entry.as_ref().parse(),).collect()
}

/// Validates repository identifiers supplied as an untyped JSON document.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the value is not an array of strings or
/// when [`validate_slugs`] rejects its contents.
pub fn validate_slug_values(value: &Value,) -> Result<Vec<RepositorySlug,>, Error,>
{
    let items = value
        .as_array()
        .ok_or_else(|| Error::validation("repositories must be a JSON array of strings",),)?;

    let mut entries = Vec::with_capacity(items.len(),);
    for item in items {
        let entry = item.as_str().ok_or_else(|| {
            Error::validation(format!("repository entries must be strings, found {item}"),)
        },)?;
        entries.push(entry,);
    }

    validate_slugs(&entries,)
}

/// Parses and validates a JSON array of repository identifiers.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the input is not valid JSON or fails
/// [`validate_slug_values`].
pub fn parse_slug_list(raw: &str,) -> Result<Vec<RepositorySlug,>, Error,>
{
    let value: Value = serde_json::from_str(raw.trim(),)
        .map_err(|error| Error::validation(format!("invalid repositories JSON: {error}"),),)?;
    validate_slug_values(&value,)
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;
    use serde_json::json;

    use super::{RepositorySlug, parse_slug_list, validate_slug_values, validate_slugs};
    use crate::Error;

    proptest! {
        #[test]
        fn well_formed_slugs_round_trip(owner in "[A-Za-z0-9_.-]{1,16}", name in "[A-Za-z0-9_.-]{1,16}") {
            let input = format!("{owner}/{name}");
            let slugs = validate_slugs(&[input.as_str()]).expect("slug should validate");
            prop_assert_eq!(slugs.len(), 1);
            prop_assert_eq!(slugs[0].to_string(), input);
            prop_assert_eq!(slugs[0].owner(), owner.as_str());
            prop_assert_eq!(slugs[0].name(), name.as_str());
        }

        #[test]
        fn extra_separators_are_rejected(a in "[a-z]{1,6}", b in "[a-z]{1,6}", c in "[a-z]{1,6}") {
            let input = format!("{a}/{b}/{c}");
            prop_assert!(validate_slugs(&[input.as_str()]).is_err());
        }

        #[test]
        fn output_preserves_input_order(names in proptest::collection::vec("[a-z]{1,8}", 1..12)) {
            let inputs: Vec<String> = names.iter().map(|name| format!("org/{name}")).collect();
            let slugs = validate_slugs(&inputs).expect("valid list");
            let rendered: Vec<String> = slugs.iter().map(ToString::to_string).collect();
            prop_assert_eq!(rendered, inputs);
        }
    }

    #[test]
    fn rejects_empty_list()
    {
        let empty: [&str; 0] = [];
        match validate_slugs(&empty,) {
            Err(Error::Validation {
                message,
            },) => assert_eq!(message, "repository list must contain at least one entry"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_entry()
    {
        match validate_slugs(&["octocat/hello", "",],) {
            Err(Error::Validation {
                message,
            },) => assert_eq!(message, "repository identifiers cannot be empty strings"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_segments()
    {
        for input in ["octocat", "/hello", "octocat/", "/",] {
            assert!(input.parse::<RepositorySlug>().is_err(), "{input} should be rejected");
        }
    }

    #[test]
    fn rejects_non_array_json()
    {
        let error = validate_slug_values(&json!({"repo": "octocat/hello"}),).unwrap_err();
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn rejects_non_string_entries()
    {
        let error = validate_slug_values(&json!(["octocat/hello", 42]),).unwrap_err();
        match error {
            Error::Validation {
                message,
            } => assert!(message.contains("must be strings")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn parse_slug_list_reports_invalid_json()
    {
        match parse_slug_list("not-json",) {
            Err(Error::Validation {
                message,
            },) => assert!(message.starts_with("invalid repositories JSON:")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn parse_slug_list_accepts_padded_input()
    {
        let slugs = parse_slug_list("  [\"a/b\", \"c/d\"]  ",).expect("valid list",);
        assert_eq!(slugs.len(), 2);
        assert_eq!(slugs[0].owner(), "a");
        assert_eq!(slugs[1].name(), "d");
    }

    #[test]
    fn serializes_as_plain_string()
    {
        let slug: RepositorySlug = "octocat/hello".parse().expect("valid slug",);
        let json = serde_json::to_string(&slug,).expect("serialization failed",);
        assert_eq!(json, "\"octocat/hello\"");
    }
}
