// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Branch divergence descriptions.
use serde::{Deserialize, Serialize};

use crate::milestone::deserialize_count;

/// Ahead/behind counts returned by `GET /repos/{owner}/{repo}/compare/{base}...{head}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,)]
pub struct BranchComparison
{
    /// Commits on the head branch missing from the base branch.
    #[serde(default, deserialize_with = "deserialize_count")]
    pub ahead_by:  u64,
    /// Commits on the base branch missing from the head branch.
    #[serde(default, deserialize_with = "deserialize_count")]
    pub behind_by: u64,
}

/// Placeholder shown when the comparison could not be fetched.
pub const UNAVAILABLE: &str = "Unavailable";
/// Text shown when both branches point at the same history.
pub const IN_SYNC: &str = "In sync";

/// Describes how far the head branch has diverged from the base branch.
///
/// # Examples
///
/// ```
/// use statboard::{BranchComparison, describe_divergence};
///
/// let diverged = BranchComparison {
///     ahead_by: 2, behind_by: 1,
/// };
/// assert_eq!(describe_divergence(Some(&diverged,),), "+2, -1");
/// assert_eq!(describe_divergence(None,), "Unavailable");
/// ```
pub fn describe_divergence(comparison: Option<&BranchComparison,>,) -> String
{
    let Some(comparison,) = comparison else {
        return UNAVAILABLE.to_owned();
    };

    match (comparison.ahead_by, comparison.behind_by,) {
        (0, 0,) => IN_SYNC.to_owned(),
        (ahead, 0,) => format!("+{ahead}"),
        (0, behind,) => format!("-{behind}"),
        (ahead, behind,) => format!("+{ahead}, -{behind}"),
    }
}
