// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Open milestone summaries.
///
/// Converts milestone payloads into progress indicators. Issue counts coming
/// from the API are sanitized: anything missing, negative, non-finite or of
/// the wrong JSON type counts as zero.
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Milestone entry as returned by `GET /repos/{owner}/{repo}/milestones`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Milestone
{
    /// Milestone title shown in labels.
    #[serde(default)]
    pub title:        String,
    /// Number of open issues attached to the milestone.
    #[serde(default, rename = "open_issues", deserialize_with = "deserialize_count")]
    pub open_count:   u64,
    /// Number of closed issues attached to the milestone.
    #[serde(default, rename = "closed_issues", deserialize_with = "deserialize_count")]
    pub closed_count: u64,
    /// Browser URL of the milestone page.
    #[serde(default, rename = "html_url")]
    pub url:          Option<String,>,
    /// Repository-local milestone number.
    #[serde(default)]
    pub number:       Option<u64,>,
}

/// Progress of a milestone with at least one attached issue.
#[derive(Debug, Clone, PartialEq,)]
pub struct MilestoneProgress
{
    /// Milestone title.
    pub title:  String,
    /// Open issue count.
    pub open:   u64,
    /// Total issue count, always greater than zero.
    pub total:  u64,
    /// Share of closed issues in `0.0..=1.0`.
    pub filled: f64,
    /// Browser URL of the milestone page when known.
    pub url:    Option<String,>,
    /// Milestone number when known.
    pub number: Option<u64,>,
}

impl MilestoneProgress
{
    /// Tooltip describing the remaining work, e.g. `Beta: 3 open of 5`.
    pub fn tooltip(&self,) -> String
    {
        format!("{}: {} open of {}", self.title, self.open, self.total)
    }

    /// Fill percentage rounded to the nearest integer.
    pub fn percent(&self,) -> u8
    {
        (self.filled * 100.0).round().clamp(0.0, 100.0,) as u8
    }
}

/// Builds progress indicators for milestones that have issues attached.
///
/// Milestones whose open and closed counts are both zero are skipped, so the
/// result may be empty even for a non-empty input.
pub fn summarize_milestones(milestones: &[Milestone],) -> Vec<MilestoneProgress,>
{
    let mut progress = Vec::with_capacity(milestones.len(),);
    for milestone in milestones {
        let total = milestone.open_count.saturating_add(milestone.closed_count,);
        if total == 0 {
            continue;
        }

        progress.push(MilestoneProgress {
            title:  milestone.title.clone(),
            open:   milestone.open_count,
            total,
            filled: milestone.closed_count as f64 / total as f64,
            url:    milestone.url.clone(),
            number: milestone.number,
        },);
    }
    progress
}

/// Coerces a loosely typed JSON count into a non-negative integer.
///
/// Numbers and numeric strings are truncated toward zero; negative,
/// non-finite and non-numeric values become `0`.
pub(crate) fn sanitize_count(value: &Value,) -> u64
{
    let numeric = match value {
        Value::Number(number,) => number.as_f64(),
        Value::String(text,) => text.trim().parse::<f64,>().ok(),
        _ => None,
    };

    match numeric {
        Some(count,) if count.is_finite() && count >= 0.0 => count.trunc() as u64,
        _ => 0,
    }
}

pub(crate) fn deserialize_count<'de, D,>(deserializer: D,) -> Result<u64, D::Error,>
where
    D: Deserializer<'de,>,
{
    let value = Value::deserialize(deserializer,)?;
    Ok(sanitize_count(&value,),)
}
