//! GitHub REST implementation of [`IssueTracker`].

use crate::error::{IdgError, Result};
use crate::tracker::{Issue, IssueTracker, Milestone, RepoFile, RepoId, StateFilter};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const PER_PAGE: usize = 100;

#[derive(Deserialize)]
struct RawIssue {
    #[serde(flatten)]
    issue: Issue,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
    #[serde(default)]
    encoding: String,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

pub struct GitHubClient {
    http: Client,
    base_url: String,
    repo: RepoId,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(repo: RepoId, token: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("idg/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_API_URL.to_string(),
            repo,
            token,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    fn url(&self, path: &str) -> String {
        format!("{}/repos/{}{}", self.base_url, self.repo, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!(%method, %url, "github request");
        let req = self
            .http
            .request(method, url)
            .header("accept", "application/vnd.github+json")
            .header("x-github-api-version", API_VERSION);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn check(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().unwrap_or_default();
        let message = serde_json::from_str::<ApiMessage>(&text)
            .map(|m| m.message)
            .unwrap_or(text);
        warn!(status = status.as_u16(), %message, "github request failed");
        Err(IdgError::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let resp = Self::check(req.send()?)?;
        Ok(resp.json()?)
    }

    fn send_empty(&self, req: RequestBuilder) -> Result<()> {
        Self::check(req.send()?)?;
        Ok(())
    }

    /// GET every page of a listing endpoint.
    fn get_paged<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<T>> {
        let per_page = PER_PAGE.to_string();
        let mut items = Vec::new();
        for page in 1u32.. {
            let page = page.to_string();
            let req = self
                .request(Method::GET, path)
                .query(query)
                .query(&[("per_page", per_page.as_str()), ("page", page.as_str())]);
            let batch: Vec<T> = self.send(req)?;
            let len = batch.len();
            items.extend(batch);
            if len < PER_PAGE {
                break;
            }
        }
        Ok(items)
    }
}

impl IssueTracker for GitHubClient {
    fn list_issues(&self, filter: StateFilter) -> Result<Vec<Issue>> {
        let raw: Vec<RawIssue> = self.get_paged("/issues", &[("state", filter.as_str())])?;
        Ok(raw
            .into_iter()
            .filter(|r| r.pull_request.is_none())
            .map(|r| r.issue)
            .collect())
    }

    fn create_issue(&self, title: &str) -> Result<Issue> {
        let req = self
            .request(Method::POST, "/issues")
            .json(&serde_json::json!({ "title": title }));
        self.send(req)
    }

    fn update_issue_body(&self, number: u64, body: &str) -> Result<()> {
        let req = self
            .request(Method::PATCH, &format!("/issues/{number}"))
            .json(&serde_json::json!({ "body": body }));
        self.send_empty(req)
    }

    fn set_issue_milestone(&self, number: u64, milestone: u64) -> Result<()> {
        let req = self
            .request(Method::PATCH, &format!("/issues/{number}"))
            .json(&serde_json::json!({ "milestone": milestone }));
        self.send_empty(req)
    }

    fn list_milestones(&self) -> Result<Vec<Milestone>> {
        self.get_paged("/milestones", &[("state", "open")])
    }

    fn get_file(&self, path: &str) -> Result<RepoFile> {
        let req = self.request(Method::GET, &format!("/contents/{path}"));
        let contents: ContentsResponse = self.send(req)?;
        if !contents.encoding.is_empty() && contents.encoding != "base64" {
            return Err(IdgError::UnsupportedEncoding {
                path: path.to_string(),
                encoding: contents.encoding,
            });
        }
        let packed: String = contents
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = STANDARD.decode(packed)?;
        Ok(RepoFile {
            path: path.to_string(),
            content: String::from_utf8(bytes)?,
            sha: contents.sha,
        })
    }

    fn put_file(&self, path: &str, content: &str, sha: &str, message: &str) -> Result<()> {
        let req = self
            .request(Method::PUT, &format!("/contents/{path}"))
            .json(&serde_json::json!({
                "message": message,
                "content": STANDARD.encode(content),
                "sha": sha,
            }));
        self.send_empty(req)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
