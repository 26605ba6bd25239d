// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Remote data source abstraction.
///
/// [`StatusSource`] is the single seam between the pipeline and the hosting
/// API. [`GitHubSource`] implements it with `octocrab`; tests substitute an
/// in-memory implementation.
use std::{fmt, future::Future};

use octocrab::{Octocrab, service::middleware::retry::RetryConfig};
use serde_json::Value;
use tracing::debug;

use crate::error::Error;

/// Relative API route plus query parameters.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ApiRequest
{
    /// Route relative to the API base, e.g. `/repos/o/r/releases`.
    pub route: String,
    /// Query parameters in insertion order.
    pub query: Vec<(&'static str, String,),>,
}

impl ApiRequest
{
    /// Creates a request without query parameters.
    pub fn new<R,>(route: R,) -> Self
    where
        R: Into<String,>,
    {
        Self {
            route: route.into(), query: Vec::new(),
        }
    }

    /// Appends a query parameter.
    pub fn with_query<V,>(mut self, key: &'static str, value: V,) -> Self
    where
        V: ToString,
    {
        self.query.push((key, value.to_string(),),);
        self
    }
}

impl fmt::Display for ApiRequest
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "GET {}", self.route)?;
        for (index, (key, value,),) in self.query.iter().enumerate() {
            let separator = if index == 0 { '?' } else { '&' };
            write!(f, "{separator}{key}={value}")?;
        }
        Ok((),)
    }
}

/// Failure reported by a [`StatusSource`].
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct SourceFailure
{
    /// HTTP status code when the server answered.
    pub status:  Option<u16,>,
    /// Description of the failure.
    pub message: String,
}

impl SourceFailure
{
    /// Failure carrying an HTTP status code.
    pub fn http<M,>(status: u16, message: M,) -> Self
    where
        M: Into<String,>,
    {
        Self {
            status: Some(status,), message: message.into(),
        }
    }

    /// Failure without a response, e.g. a connection error.
    pub fn transport<M,>(message: M,) -> Self
    where
        M: Into<String,>,
    {
        Self {
            status: None, message: message.into(),
        }
    }
}

impl fmt::Display for SourceFailure
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        match self.status {
            Some(status,) => write!(f, "HTTP {status}: {}", self.message),
            None => f.write_str(&self.message,),
        }
    }
}

/// Issues read-only requests against the hosting API.
pub trait StatusSource: Send + Sync
{
    /// Performs one GET request and returns the decoded JSON body.
    fn get(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<Value, SourceFailure,>,> + Send;
}

/// [`StatusSource`] backed by the GitHub REST API.
#[derive(Debug, Clone,)]
pub struct GitHubSource
{
    client: Octocrab,
}

impl GitHubSource
{
    /// Builds a client, authenticated when `token` is a non-blank string and
    /// anonymous otherwise. `api_base` overrides the default API endpoint for
    /// GitHub Enterprise installations.
    ///
    /// Every request is sent exactly once; octocrab's built-in retries are
    /// disabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an unparsable `api_base` and
    /// [`Error::Service`] when the HTTP client cannot be constructed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use statboard::GitHubSource;
    ///
    /// # fn example() -> Result<(), statboard::Error> {
    /// let token = std::env::var("GITHUB_TOKEN",).ok();
    /// let source = GitHubSource::new(token.as_deref(), None,)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(token: Option<&str,>, api_base: Option<&str,>,) -> Result<Self, Error,>
    {
        let mut builder = Octocrab::builder().add_retry_config(RetryConfig::None,);

        match token.map(str::trim,).filter(|value| !value.is_empty(),) {
            Some(token,) => {
                debug!("Using authenticated GitHub access");
                builder = builder.personal_token(token.to_owned(),);
            }
            None => debug!("No GitHub token supplied; using anonymous access"),
        }

        if let Some(base,) = api_base {
            builder = builder
                .base_uri(base,)
                .map_err(|e| Error::validation(format!("invalid API base '{base}': {e}"),),)?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::service(format!("failed to initialize GitHub client: {e}"),),)?;

        Ok(Self {
            client,
        },)
    }
}

impl StatusSource for GitHubSource
{
    fn get(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<Value, SourceFailure,>,> + Send
    {
        async move {
            let response: Result<Value, octocrab::Error,> = if request.query.is_empty() {
                self.client.get(&request.route, None::<&(),>,).await
            } else {
                self.client.get(&request.route, Some(&request.query,),).await
            };

            response.map_err(failure_from_octocrab,)
        }
    }
}

fn failure_from_octocrab(error: octocrab::Error,) -> SourceFailure
{
    match &error {
        octocrab::Error::GitHub {
            source, ..
        } => SourceFailure::http(source.status_code.as_u16(), source.message.clone(),),
        _ => SourceFailure::transport(error.to_string(),),
    }
}
