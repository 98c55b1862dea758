use std::time::Duration;

use chrono::{DateTime, Utc};
use mrpulse_core::{Commit, CommitDetail, FileDiff, GitLabSettings, MergeRequest, MrPulseError};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::gateway::RepositoryGateway;

const PAGE_SIZE: &str = "100";
const MAX_ERROR_BODY: usize = 200;

/// GitLab REST v4 client scoped to a single project.
///
/// Sends the configured token as a `PRIVATE-TOKEN` header on every call and
/// retries transport failures, `429` and `5xx` responses up to
/// `max_retries` times.
///
/// # Examples
///
/// ```
/// use mrpulse_core::GitLabConfig;
/// use mrpulse_gitlab::client::GitLabClient;
///
/// let settings = GitLabConfig {
///     project_id: Some("group/project".into()),
///     token: Some("glpat-xxxx".into()),
///     ..GitLabConfig::default()
/// }
/// .settings()
/// .unwrap();
/// let client = GitLabClient::new(&settings).unwrap();
/// assert_eq!(
///     client.project_url().as_str(),
///     "https://gitlab.com/api/v4/projects/group%2Fproject"
/// );
/// ```
pub struct GitLabClient {
    http: reqwest::Client,
    project_url: Url,
    token: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl GitLabClient {
    /// Create a client from validated settings.
    ///
    /// # Errors
    ///
    /// Returns [`MrPulseError::Config`] if the base URL cannot be parsed, or
    /// [`MrPulseError::Api`] if the HTTP client cannot be built.
    pub fn new(settings: &GitLabSettings) -> Result<Self, MrPulseError> {
        let mut project_url = Url::parse(&settings.base_url).map_err(|e| {
            MrPulseError::Config(format!("invalid GitLab URL '{}': {e}", settings.base_url))
        })?;
        project_url
            .path_segments_mut()
            .map_err(|()| {
                MrPulseError::Config(format!(
                    "GitLab URL '{}' cannot be used as a base",
                    settings.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["api", "v4", "projects", settings.project_id.as_str()]);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent("mrpulse")
            .build()
            .map_err(|e| MrPulseError::Api(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            project_url,
            token: settings.token.clone(),
            max_retries: settings.max_retries,
            retry_delay: Duration::from_millis(500),
        })
    }

    /// Override the base delay between retries (multiplied by the attempt number).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// The project's API root, e.g. `https://gitlab.com/api/v4/projects/42`.
    pub fn project_url(&self) -> &Url {
        &self.project_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.project_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, MrPulseError> {
        let mut attempt = 0u32;
        loop {
            debug!(%method, url = %url, attempt, "GitLab request");

            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .header("PRIVATE-TOKEN", &self.token);
            if let Some(json) = body {
                request = request.json(json);
            }

            let retryable = match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    if !is_transient(status) || attempt >= self.max_retries {
                        let body = response.text().await.unwrap_or_default();
                        return Err(MrPulseError::Api(format!(
                            "{method} {} returned {status}: {}",
                            url.path(),
                            truncate(body.trim(), MAX_ERROR_BODY)
                        )));
                    }
                    format!("status {status}")
                }
                Err(e) => {
                    if !(e.is_timeout() || e.is_connect()) || attempt >= self.max_retries {
                        return Err(MrPulseError::Api(format!(
                            "{method} {} failed: {e}",
                            url.path()
                        )));
                    }
                    e.to_string()
                }
            };

            attempt += 1;
            warn!(url = %url.path(), attempt, reason = %retryable, "retrying GitLab request");
            tokio::time::sleep(self.retry_delay * attempt).await;
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, MrPulseError> {
        let response = self.send(Method::GET, url, None).await?;
        decode(response, url).await
    }

    async fn get_paginated<T: DeserializeOwned>(&self, url: &Url) -> Result<Vec<T>, MrPulseError> {
        let mut items = Vec::new();
        let mut page = 1u32;
        loop {
            let mut page_url = url.clone();
            page_url
                .query_pairs_mut()
                .append_pair("per_page", PAGE_SIZE)
                .append_pair("page", &page.to_string());

            let response = self.send(Method::GET, &page_url, None).await?;
            let next_page = response
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u32>().ok());
            let batch: Vec<T> = decode(response, &page_url).await?;
            items.extend(batch);

            match next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }
        Ok(items)
    }
}

impl RepositoryGateway for GitLabClient {
    async fn find_open_merge_request(
        &self,
        source_branch: &str,
        target_branch: &str,
    ) -> Result<Option<MergeRequest>, MrPulseError> {
        let mut url = self.endpoint(&["merge_requests"]);
        url.query_pairs_mut()
            .append_pair("source_branch", source_branch)
            .append_pair("target_branch", target_branch)
            .append_pair("state", "opened");

        let found: Vec<MergeRequestResponse> = self.get_json(&url).await?;
        Ok(found.into_iter().next().map(MergeRequest::from))
    }

    async fn create_merge_request(
        &self,
        source_branch: &str,
        target_branch: &str,
        title: &str,
    ) -> Result<MergeRequest, MrPulseError> {
        let url = self.endpoint(&["merge_requests"]);
        let body = serde_json::json!({
            "source_branch": source_branch,
            "target_branch": target_branch,
            "title": title,
        });
        let response = self.send(Method::POST, &url, Some(&body)).await?;
        let created: MergeRequestResponse = decode(response, &url).await?;
        Ok(created.into())
    }

    async fn list_merge_request_commits(&self, iid: u64) -> Result<Vec<Commit>, MrPulseError> {
        let url = self.endpoint(&["merge_requests", &iid.to_string(), "commits"]);
        let commits: Vec<CommitResponse> = self.get_paginated(&url).await?;
        Ok(commits
            .into_iter()
            .enumerate()
            .map(|(position, c)| Commit {
                id: c.id,
                short_id: c.short_id,
                title: c.title,
                author_name: c.author_name,
                created_at: c.created_at,
                position,
            })
            .collect())
    }

    async fn get_commit(&self, sha: &str) -> Result<CommitDetail, MrPulseError> {
        let url = self.endpoint(&["repository", "commits", sha]);
        let detail: CommitDetailResponse = self.get_json(&url).await?;
        Ok(CommitDetail {
            id: detail.id,
            author_name: detail.author_name,
            author_email: detail.author_email,
        })
    }

    async fn get_commit_diff(&self, sha: &str) -> Result<Vec<FileDiff>, MrPulseError> {
        let url = self.endpoint(&["repository", "commits", sha, "diff"]);
        let diffs: Vec<DiffResponse> = self.get_paginated(&url).await?;
        Ok(diffs
            .into_iter()
            .map(|d| FileDiff {
                old_path: d.old_path,
                new_path: d.new_path,
                diff: d.diff,
                new_file: d.new_file,
                renamed_file: d.renamed_file,
                deleted_file: d.deleted_file,
            })
            .collect())
    }
}

async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    url: &Url,
) -> Result<T, MrPulseError> {
    response.json::<T>().await.map_err(|e| {
        MrPulseError::Api(format!("failed to decode response from {}: {e}", url.path()))
    })
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct MergeRequestResponse {
    iid: u64,
    #[serde(default)]
    title: String,
    source_branch: String,
    target_branch: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    web_url: Option<String>,
}

impl From<MergeRequestResponse> for MergeRequest {
    fn from(mr: MergeRequestResponse) -> Self {
        Self {
            iid: mr.iid,
            title: mr.title,
            source_branch: mr.source_branch,
            target_branch: mr.target_branch,
            state: mr.state,
            web_url: mr.web_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    id: String,
    #[serde(default)]
    short_id: String,
    #[serde(default)]
    title: String,
    author_name: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CommitDetailResponse {
    id: String,
    author_name: String,
    #[serde(default)]
    author_email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiffResponse {
    old_path: String,
    new_path: String,
    #[serde(default)]
    diff: String,
    #[serde(default)]
    new_file: bool,
    #[serde(default)]
    renamed_file: bool,
    #[serde(default)]
    deleted_file: bool,
}
