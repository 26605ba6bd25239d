// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Qualification registry loading.
///
/// The registry is a CSV table with the columns `org`, `repo`, `version`,
/// `release.url`, `release.date`, `qualification.url` and
/// `qualification.date`. A table missing any of them is rejected as a whole.
use std::{fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use crate::error::{self, Error};

/// Column names every registry must provide, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "org",
    "repo",
    "version",
    "release.url",
    "release.date",
    "qualification.url",
    "qualification.date",
];

/// One row of the qualification registry.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct QualificationEntry
{
    /// Repository owner.
    pub org:                String,
    /// Repository name.
    pub repo:               String,
    /// Qualified version, usually the release tag with or without a `v`.
    pub version:            String,
    /// Release page of the qualified version.
    pub release_url:        Option<String,>,
    /// Release date of the qualified version.
    pub release_date:       Option<String,>,
    /// Qualification record URL.
    pub qualification_url:  Option<String,>,
    /// Date the qualification was granted.
    pub qualification_date: Option<String,>,
}

/// Ordered, read-only snapshot of the qualification registry.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct QualificationRegistry
{
    entries: Vec<QualificationEntry,>,
}

impl QualificationRegistry
{
    /// Wraps already parsed entries, preserving their order.
    pub fn new(entries: Vec<QualificationEntry,>,) -> Self
    {
        Self {
            entries,
        }
    }

    /// Registry rows in file order.
    pub fn entries(&self,) -> &[QualificationEntry]
    {
        &self.entries
    }

    /// Returns `true` when the registry has no rows.
    pub fn is_empty(&self,) -> bool
    {
        self.entries.is_empty()
    }

    /// Reads a registry from CSV data.
    ///
    /// Header names are trimmed before matching. Returns `Ok(None)` when any
    /// required column is missing; the registry is then treated as absent.
    /// Cells that are empty after trimming are stored as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Registry`] when the CSV data is structurally invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use statboard::QualificationRegistry;
    ///
    /// let csv = "org,repo,version,release.url,release.date,qualification.url,qualification.date\n\
    ///            octo,hello,v1.0.0,,2025-01-01,https://q.example/1,2025-02-01\n";
    /// let registry = QualificationRegistry::from_reader(csv.as_bytes(),)?.expect("complete header",);
    /// assert_eq!(registry.entries().len(), 1);
    /// assert_eq!(registry.entries()[0].release_url, None);
    /// # Ok::<(), statboard::Error>(())
    /// ```
    pub fn from_reader<R,>(reader: R,) -> Result<Option<Self,>, Error,>
    where
        R: Read,
    {
        let mut csv_reader =
            ReaderBuilder::new().trim(Trim::All,).flexible(true,).from_reader(reader,);

        let headers = csv_reader.headers()?.clone();
        let Some(columns,) = ColumnIndex::resolve(&headers,) else {
            return Ok(None,);
        };

        let mut entries = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            entries.push(columns.entry(&record,),);
        }

        debug!("Loaded {} qualification registry rows", entries.len());
        Ok(Some(Self::new(entries,),),)
    }
}

/// Loads the qualification registry from a CSV file.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be opened and
/// [`Error::Registry`] for malformed CSV. A file with missing columns yields
/// `Ok(None)`.
pub fn load_registry(path: &Path,) -> Result<Option<QualificationRegistry,>, Error,>
{
    let file = File::open(path,).map_err(|source| error::io_error(path, source,),)?;
    let registry = QualificationRegistry::from_reader(file,)?;
    if registry.is_none() {
        warn!("Ignoring qualification registry at {}", path.display());
    }
    Ok(registry,)
}

struct ColumnIndex
{
    positions: [usize; 7],
}

impl ColumnIndex
{
    fn resolve(headers: &StringRecord,) -> Option<Self,>
    {
        let mut positions = [0usize; 7];
        let mut missing = Vec::new();

        for (slot, column,) in REQUIRED_COLUMNS.iter().enumerate() {
            match headers.iter().position(|header| header == *column,) {
                Some(position,) => positions[slot] = position,
                None => missing.push(*column,),
            }
        }

        if !missing.is_empty() {
            warn!(
                "Qualification registry is missing required columns [{}]; continuing without qualification data",
                missing.join(", ")
            );
            return None;
        }

        Some(Self {
            positions,
        },)
    }

    fn entry(&self, record: &StringRecord,) -> QualificationEntry
    {
        let cell = |slot: usize| {
            record
                .get(self.positions[slot],)
                .map(str::trim,)
                .filter(|value| !value.is_empty(),)
                .map(str::to_owned,)
        };

        QualificationEntry {
            org:                cell(0,).unwrap_or_default(),
            repo:               cell(1,).unwrap_or_default(),
            version:            cell(2,).unwrap_or_default(),
            release_url:        cell(3,),
            release_date:       cell(4,),
            qualification_url:  cell(5,),
            qualification_date: cell(6,),
        }
    }
}
