// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Uniform failure policy for remote calls.
///
/// Every request goes through [`guarded`], which bounds it with a deadline and
/// classifies the outcome once:
///
/// * `404` - the resource is absent; the field degrades silently.
/// * `403` - permission denied; the field degrades and a warning names the
///   repository.
/// * anything else - a hard failure that aborts the run.
use std::{fmt, future::Future, time::Duration};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::{
    error::Error,
    slug::RepositorySlug,
    source::{ApiRequest, SourceFailure, StatusSource},
};

/// Page size requested for list endpoints.
pub const PAGE_SIZE: u32 = 100;

/// The four per-repository requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash,)]
pub enum FetchKind
{
    /// `GET /repos/{owner}/{repo}/releases/latest`
    LatestRelease,
    /// `GET /repos/{owner}/{repo}/releases`
    ReleaseHistory,
    /// `GET /repos/{owner}/{repo}/milestones?state=open`
    OpenMilestones,
    /// `GET /repos/{owner}/{repo}/compare/{base}...{head}`
    BranchComparison,
}

impl FetchKind
{
    /// Builds the API request for `slug`.
    pub fn request(self, slug: &RepositorySlug, range: &CompareRange,) -> ApiRequest
    {
        let owner = slug.owner();
        let repo = slug.name();
        match self {
            Self::LatestRelease => ApiRequest::new(format!("/repos/{owner}/{repo}/releases/latest"),),
            Self::ReleaseHistory => ApiRequest::new(format!("/repos/{owner}/{repo}/releases"),)
                .with_query("per_page", PAGE_SIZE,),
            Self::OpenMilestones => ApiRequest::new(format!("/repos/{owner}/{repo}/milestones"),)
                .with_query("state", "open",)
                .with_query("per_page", PAGE_SIZE,),
            Self::BranchComparison => ApiRequest::new(format!(
                "/repos/{owner}/{repo}/compare/{}...{}",
                range.base, range.head
            ),),
        }
    }
}

impl fmt::Display for FetchKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.write_str(match self {
            Self::LatestRelease => "latest release",
            Self::ReleaseHistory => "release history",
            Self::OpenMilestones => "open milestones",
            Self::BranchComparison => "branch comparison",
        },)
    }
}

/// Base and head branches compared for each repository.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct CompareRange
{
    /// Branch the head is compared against.
    pub base: String,
    /// Branch whose divergence is reported.
    pub head: String,
}

impl Default for CompareRange
{
    fn default() -> Self
    {
        Self {
            base: "main".to_owned(), head: "dev".to_owned(),
        }
    }
}

/// How a failed call is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum FailureClass
{
    /// The resource does not exist.
    Absent,
    /// The credential lacks access to the resource.
    PermissionDenied,
    /// Anything else; aborts the run.
    Fatal,
}

/// Maps a source failure onto the policy.
pub fn classify(failure: &SourceFailure,) -> FailureClass
{
    match failure.status {
        Some(404,) => FailureClass::Absent,
        Some(403,) => FailureClass::PermissionDenied,
        _ => FailureClass::Fatal,
    }
}

/// Runs one remote call under the failure policy.
///
/// Returns `Ok(Some(value))` on success and `Ok(None)` for absent or
/// forbidden resources.
///
/// # Errors
///
/// Returns [`Error::Timeout`] when `deadline` elapses and [`Error::Service`]
/// for every other failure.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use statboard::{FetchKind, RepositorySlug, SourceFailure, guarded};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), statboard::Error> {
/// let slug: RepositorySlug = "octocat/private".parse()?;
/// let outcome = guarded(&slug, FetchKind::LatestRelease, Duration::from_secs(5,), || async {
///     Err(SourceFailure::http(404, "Not Found",),)
/// },)
/// .await?;
/// assert!(outcome.is_none());
/// # Ok(())
/// # }
/// ```
pub async fn guarded<F, Fut,>(
    slug: &RepositorySlug,
    kind: FetchKind,
    deadline: Duration,
    call: F,
) -> Result<Option<Value,>, Error,>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value, SourceFailure,>,>,
{
    let outcome = timeout(deadline, call(),).await.map_err(|_| Error::Timeout {
        repository: slug.to_string(),
        endpoint:   kind.to_string(),
        seconds:    deadline.as_secs(),
    },)?;

    let failure = match outcome {
        Ok(value,) => return Ok(Some(value,),),
        Err(failure,) => failure,
    };

    match classify(&failure,) {
        FailureClass::Absent => {
            debug!("No {} found for {}", kind, slug);
            Ok(None,)
        }
        FailureClass::PermissionDenied => {
            warn!(
                "Access to {} of {} was denied ({}); the row will be incomplete. \
                 Use a token with broader repository scope to include it",
                kind, slug, failure
            );
            Ok(None,)
        }
        FailureClass::Fatal => {
            Err(Error::service(format!("{kind} request for {slug} failed: {failure}"),),)
        }
    }
}

/// Fetches and decodes one resource through [`guarded`].
///
/// # Errors
///
/// Propagates hard failures from [`guarded`] and returns [`Error::Service`]
/// when the payload does not decode into `T`.
pub async fn fetch<S, T,>(
    source: &S,
    slug: &RepositorySlug,
    kind: FetchKind,
    range: &CompareRange,
    deadline: Duration,
) -> Result<Option<T,>, Error,>
where
    S: StatusSource,
    T: DeserializeOwned,
{
    let request = kind.request(slug, range,);
    debug!("{} for {}", request, slug);

    let Some(value,) = guarded(slug, kind, deadline, || source.get(&request,),).await? else {
        return Ok(None,);
    };

    serde_json::from_value(value,)
        .map(Some,)
        .map_err(|e| Error::service(format!("malformed {kind} payload for {slug}: {e}"),),)
}

#[cfg(test)]
mod tests
{
    use std::{
        collections::HashMap,
        io,
        sync::{Arc, Mutex},
    };

    use serde_json::json;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;
    use crate::{branch::BranchComparison, release::Release};

    #[derive(Default,)]
    struct ScriptedSource
    {
        responses: HashMap<String, Result<Value, SourceFailure,>,>,
        calls:     Arc<Mutex<Vec<String,>,>,>,
    }

    impl StatusSource for ScriptedSource
    {
        fn get(
            &self,
            request: &ApiRequest,
        ) -> impl Future<Output = Result<Value, SourceFailure,>,> + Send
        {
            self.calls.lock().unwrap().push(request.route.clone(),);
            let response = self
                .responses
                .get(&request.route,)
                .cloned()
                .unwrap_or_else(|| Err(SourceFailure::http(404, "Not Found",),),);
            async move { response }
        }
    }

    /// Log sink shared between the subscriber and the assertions.
    #[derive(Clone, Default,)]
    struct CapturedLogs(Arc<Mutex<Vec<u8,>,>,>,);

    impl CapturedLogs
    {
        fn contents(&self,) -> String
        {
            String::from_utf8_lossy(&self.0.lock().unwrap(),).into_owned()
        }
    }

    impl io::Write for CapturedLogs
    {
        fn write(&mut self, buf: &[u8],) -> io::Result<usize,>
        {
            self.0.lock().unwrap().extend_from_slice(buf,);
            Ok(buf.len(),)
        }

        fn flush(&mut self,) -> io::Result<(),>
        {
            Ok((),)
        }
    }

    impl<'a,> MakeWriter<'a,> for CapturedLogs
    {
        type Writer = Self;

        fn make_writer(&'a self,) -> Self::Writer
        {
            self.clone()
        }
    }

    fn slug() -> RepositorySlug
    {
        "octo/widget".parse().expect("valid slug",)
    }

    #[test]
    fn requests_match_api_routes()
    {
        let range = CompareRange::default();
        let slug = slug();
        assert_eq!(
            FetchKind::LatestRelease.request(&slug, &range,).route,
            "/repos/octo/widget/releases/latest"
        );
        assert_eq!(
            FetchKind::OpenMilestones.request(&slug, &range,).to_string(),
            "GET /repos/octo/widget/milestones?state=open&per_page=100"
        );
        assert_eq!(
            FetchKind::BranchComparison.request(&slug, &range,).route,
            "/repos/octo/widget/compare/main...dev"
        );
        assert_eq!(
            FetchKind::ReleaseHistory.request(&slug, &range,).to_string(),
            "GET /repos/octo/widget/releases?per_page=100"
        );
    }

    #[test]
    fn classification_distinguishes_status_codes()
    {
        assert_eq!(classify(&SourceFailure::http(404, "",),), FailureClass::Absent);
        assert_eq!(classify(&SourceFailure::http(403, "",),), FailureClass::PermissionDenied);
        assert_eq!(classify(&SourceFailure::http(500, "",),), FailureClass::Fatal);
        assert_eq!(classify(&SourceFailure::http(401, "",),), FailureClass::Fatal);
        assert_eq!(classify(&SourceFailure::transport("dns",),), FailureClass::Fatal);
    }

    #[tokio::test]
    async fn not_found_degrades_to_absent()
    {
        let source = ScriptedSource::default();
        let outcome: Option<Release,> = fetch(
            &source,
            &slug(),
            FetchKind::LatestRelease,
            &CompareRange::default(),
            Duration::from_secs(1,),
        )
        .await
        .expect("404 is not an error",);
        assert!(outcome.is_none());
        assert_eq!(source.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn forbidden_degrades_to_absent()
    {
        let mut source = ScriptedSource::default();
        source.responses.insert(
            "/repos/octo/widget/compare/main...dev".to_owned(),
            Err(SourceFailure::http(403, "Resource not accessible by integration",),),
        );
        let outcome: Option<BranchComparison,> = fetch(
            &source,
            &slug(),
            FetchKind::BranchComparison,
            &CompareRange::default(),
            Duration::from_secs(1,),
        )
        .await
        .expect("403 is not an error",);
        assert!(outcome.is_none());
    }

    #[test]
    fn forbidden_warning_names_repository()
    {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt().with_writer(logs.clone(),).with_ansi(false,).finish();

        let outcome = tracing::subscriber::with_default(subscriber, || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("runtime",);
            runtime.block_on(guarded(
                &slug(),
                FetchKind::OpenMilestones,
                Duration::from_secs(1,),
                || async { Err(SourceFailure::http(403, "Forbidden",),) },
            ),)
        },)
        .expect("403 is not an error",);

        assert!(outcome.is_none());
        let output = logs.contents();
        assert!(output.contains("WARN"), "missing warning in {output:?}");
        assert!(output.contains("octo/widget"));
        assert!(output.contains("open milestones"));
        assert!(output.contains("broader repository scope"));
    }

    #[test]
    fn not_found_does_not_warn()
    {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt().with_writer(logs.clone(),).with_ansi(false,).finish();

        let outcome = tracing::subscriber::with_default(subscriber, || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("runtime",);
            runtime.block_on(guarded(
                &slug(),
                FetchKind::LatestRelease,
                Duration::from_secs(1,),
                || async { Err(SourceFailure::http(404, "Not Found",),) },
            ),)
        },)
        .expect("404 is not an error",);

        assert!(outcome.is_none());
        assert!(!logs.contents().contains("WARN"));
    }

    #[tokio::test]
    async fn server_errors_are_fatal()
    {
        let mut source = ScriptedSource::default();
        source.responses.insert(
            "/repos/octo/widget/releases".to_owned(),
            Err(SourceFailure::http(502, "Bad Gateway",),),
        );
        let error = fetch::<_, Vec<Release,>,>(
            &source,
            &slug(),
            FetchKind::ReleaseHistory,
            &CompareRange::default(),
            Duration::from_secs(1,),
        )
        .await
        .expect_err("5xx must abort",);

        match error {
            Error::Service {
                message,
            } => {
                assert!(message.contains("release history"));
                assert!(message.contains("octo/widget"));
                assert!(message.contains("502"));
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_payload_is_fatal()
    {
        let mut source = ScriptedSource::default();
        source
            .responses
            .insert("/repos/octo/widget/releases/latest".to_owned(), Ok(json!({"name": "no tag"}),),);
        let error = fetch::<_, Release,>(
            &source,
            &slug(),
            FetchKind::LatestRelease,
            &CompareRange::default(),
            Duration::from_secs(1,),
        )
        .await
        .expect_err("missing tag must abort",);
        assert!(matches!(error, Error::Service { .. }));
    }

    #[tokio::test]
    async fn successful_payload_is_decoded()
    {
        let mut source = ScriptedSource::default();
        source.responses.insert(
            "/repos/octo/widget/compare/main...dev".to_owned(),
            Ok(json!({"ahead_by": 2, "behind_by": 1}),),
        );
        let outcome: Option<BranchComparison,> = fetch(
            &source,
            &slug(),
            FetchKind::BranchComparison,
            &CompareRange::default(),
            Duration::from_secs(1,),
        )
        .await
        .expect("decoded",);
        assert_eq!(
            outcome,
            Some(BranchComparison {
                ahead_by: 2, behind_by: 1,
            },)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_calls_time_out()
    {
        let error = guarded(&slug(), FetchKind::OpenMilestones, Duration::from_secs(2,), || async {
            tokio::time::sleep(Duration::from_secs(60,),).await;
            Ok(json!([]),)
        },)
        .await
        .expect_err("deadline must elapse",);

        match error {
            Error::Timeout {
                endpoint,
                seconds,
                ..
            } => {
                assert_eq!(endpoint, "open milestones");
                assert_eq!(seconds, 2);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
