#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the status board crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Only conditions that must stop a run are represented here. Missing
//! resources and permission-denied responses never become an [`Error`]; the
//! fetch layer turns them into absent values instead.

use std::path::{Path, PathBuf};

/// Unified error type returned by the aggregation pipeline and CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors raised while reading configuration or registry files
    /// or writing the report.
    #[error("failed to access {path:?}: {source}")]
    Io {
        /// Location of the file or stream involved.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Returned when repository identifiers or configuration values violate
    /// invariants. Raised before any remote call is issued.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Wraps serialization errors when writing the report table.
    #[error("failed to serialize report: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    },
    /// Wraps structural CSV errors raised while reading the qualification
    /// registry.
    #[error("failed to read qualification registry: {source}")]
    Registry {
        /// Underlying CSV error.
        source: csv::Error
    },
    /// Hard failure talking to the remote API (network, 5xx, malformed
    /// payload). Aborts the whole run.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    },
    /// A remote call did not complete within the configured deadline.
    #[error("request {endpoint} for {repository} timed out after {seconds}s")]
    Timeout {
        /// Repository slug the request was issued for.
        repository: String,
        /// Endpoint kind that timed out.
        endpoint:   String,
        /// Deadline that elapsed, in seconds.
        seconds:    u64
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a service error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the service error.
    pub fn service<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Service {
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

impl From<csv::Error> for Error {
    fn from(source: csv::Error) -> Self {
        Self::Registry {
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn validation_constructor_populates_message() {
        let error = Error::validation("something went wrong");
        match error {
            Error::Validation {
                ref message
            } => {
                assert_eq!(message, "something went wrong");
            }
            other => panic!("expected validation error, got {other:?}")
        }
    }

    #[test]
    fn to_display_string_matches_display() {
        let error = Error::service("upstream returned 502");
        assert_eq!(error.to_string(), error.to_display_string());
        assert_eq!(error.to_string(), "service error: upstream returned 502");
    }

    #[test]
    fn io_error_helper_wraps_path_and_source() {
        let path = std::path::Path::new("/tmp/statboard.yaml");
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = super::io_error(path, io_error);

        match error {
            Error::Io {
                path: ref stored_path,
                ref source
            } => {
                assert_eq!(stored_path, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected io error, got {other:?}")
        }
    }

    #[test]
    fn serde_yaml_conversion_maps_to_parse_variant() {
        let error = serde_yaml::from_str::<usize>("not-a-number").unwrap_err();
        let mapped: Error = error.into();
        assert!(matches!(mapped, Error::Parse { .. }));
    }

    #[test]
    fn serde_json_conversion_maps_to_serialize_variant() {
        let invalid = serde_json::from_str::<serde_json::Value>("not-json").unwrap_err();
        let mapped: Error = invalid.into();
        assert!(matches!(mapped, Error::Serialize { .. }));
    }

    #[test]
    fn timeout_message_names_repository_and_endpoint() {
        let error = Error::Timeout {
            repository: "octocat/hello".to_owned(),
            endpoint:   "latest release".to_owned(),
            seconds:    5
        };
        assert_eq!(
            error.to_string(),
            "request latest release for octocat/hello timed out after 5s"
        );
    }
}
