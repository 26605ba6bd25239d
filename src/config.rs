//! Run configuration loaded from YAML documents.
//!
//! The document lists the repositories to report on together with optional
//! overrides for the compared branches, request deadline, concurrency and
//! link base. Every value has a default so an empty document is valid; the
//! repository list itself is validated later, once CLI overrides are applied.

use std::{fs, path::{Path, PathBuf}, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    aggregate::{AggregateOptions, DEFAULT_MAX_CONCURRENCY, DEFAULT_TIMEOUT},
    error::{self, Error},
    fetch::CompareRange,
    report::{DEFAULT_WEB_BASE, RepositoryLinks},
};

const DEFAULT_BASE_BRANCH: &str = "main";
const DEFAULT_HEAD_BRANCH: &str = "dev";

/// Root configuration document.
///
/// # Examples
///
/// ```
/// use statboard::parse_config;
///
/// let yaml = r#"
/// repositories:
///   - octocat/hello-world
/// head_branch: develop
/// "#;
/// let config = parse_config(yaml,)?;
/// assert_eq!(config.repositories, vec!["octocat/hello-world".to_owned()]);
/// assert_eq!(config.base_branch, "main");
/// assert_eq!(config.head_branch, "develop");
/// # Ok::<(), statboard::Error>(())
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
#[serde(deny_unknown_fields)]
pub struct RunConfig
{
    /// Repositories in `owner/repo` form, in output order.
    #[serde(default, alias = "repos")]
    pub repositories: Vec<String,>,

    /// Branch the head branch is compared against.
    #[serde(default = "default_base_branch", alias = "base")]
    pub base_branch: String,

    /// Branch whose divergence is reported.
    #[serde(default = "default_head_branch", alias = "head")]
    pub head_branch: String,

    /// Deadline for a single remote call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of repositories fetched at the same time.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Optional path to the qualification registry CSV.
    #[serde(default)]
    pub registry: Option<PathBuf,>,

    /// Optional API base for GitHub Enterprise installations.
    #[serde(default)]
    pub api_base: Option<String,>,

    /// Base URL used for rendered links.
    #[serde(default = "default_web_base")]
    pub web_base: String,
}

impl Default for RunConfig
{
    fn default() -> Self
    {
        Self {
            repositories:    Vec::new(),
            base_branch:     default_base_branch(),
            head_branch:     default_head_branch(),
            timeout_secs:    default_timeout_secs(),
            max_concurrency: default_max_concurrency(),
            registry:        None,
            api_base:        None,
            web_base:        default_web_base(),
        }
    }
}

impl RunConfig
{
    /// Checks invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for blank or whitespace-containing branch
    /// names, a zero timeout or concurrency, or a blank web base.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        validate_branch("base_branch", &self.base_branch,)?;
        validate_branch("head_branch", &self.head_branch,)?;

        if self.timeout_secs == 0 {
            return Err(Error::validation("timeout_secs must be greater than zero",),);
        }

        if self.max_concurrency == 0 {
            return Err(Error::validation("max_concurrency must be greater than zero",),);
        }

        if self.web_base.trim().is_empty() {
            return Err(Error::validation("web_base cannot be empty",),);
        }

        Ok((),)
    }

    /// Converts the configuration into aggregation options.
    pub fn aggregate_options(&self,) -> AggregateOptions
    {
        AggregateOptions {
            timeout: Duration::from_secs(self.timeout_secs,),
            max_concurrency: self.max_concurrency,
            compare: CompareRange {
                base: self.base_branch.clone(), head: self.head_branch.clone(),
            },
            links: RepositoryLinks::new(&self.web_base,),
            ..AggregateOptions::default()
        }
    }
}

/// Loads and validates a configuration file.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read, [`Error::Parse`] for
/// malformed YAML and [`Error::Validation`] for invalid values.
pub fn load_config(path: &Path,) -> Result<RunConfig, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_config(&contents,)
}

/// Parses and validates a configuration document.
///
/// An empty document yields [`RunConfig::default`].
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed YAML and [`Error::Validation`] for
/// invalid values.
pub fn parse_config(contents: &str,) -> Result<RunConfig, Error,>
{
    let config = if contents.trim().is_empty() {
        RunConfig::default()
    } else {
        serde_yaml::from_str::<RunConfig,>(contents,)?
    };
    config.validate()?;
    Ok(config,)
}

fn validate_branch(field: &str, value: &str,) -> Result<(), Error,>
{
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty"),),);
    }

    if value.contains(char::is_whitespace,) {
        return Err(Error::validation(format!("{field} cannot contain whitespace"),),);
    }

    Ok((),)
}

fn default_base_branch() -> String
{
    DEFAULT_BASE_BRANCH.to_owned()
}

fn default_head_branch() -> String
{
    DEFAULT_HEAD_BRANCH.to_owned()
}

fn default_timeout_secs() -> u64
{
    DEFAULT_TIMEOUT.as_secs()
}

fn default_max_concurrency() -> usize
{
    DEFAULT_MAX_CONCURRENCY
}

fn default_web_base() -> String
{
    DEFAULT_WEB_BASE.to_owned()
}
