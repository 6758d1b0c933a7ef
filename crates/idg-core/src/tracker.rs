use crate::error::{IdgError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// RepoId
// ---------------------------------------------------------------------------

static REPO_RE: OnceLock<Regex> = OnceLock::new();

fn repo_re() -> &'static Regex {
    REPO_RE.get_or_init(|| Regex::new(r"^([A-Za-z0-9_.\-]+)/([A-Za-z0-9_.\-]+)$").unwrap())
}

/// A hosted repository, written `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoId {
    type Err = IdgError;
    fn from_str(s: &str) -> Result<Self> {
        let caps = repo_re()
            .captures(s.trim())
            .ok_or_else(|| IdgError::InvalidRepo(s.to_string()))?;
        Ok(Self {
            owner: caps[1].to_string(),
            name: caps[2].to_string(),
        })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// ---------------------------------------------------------------------------
// Issues and milestones
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

/// Which issues a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
    Open,
    Closed,
    All,
}

impl StateFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            StateFilter::Open => "open",
            StateFilter::Closed => "closed",
            StateFilter::All => "all",
        }
    }

    pub fn matches(self, state: IssueState) -> bool {
        match self {
            StateFilter::Open => state == IssueState::Open,
            StateFilter::Closed => state == IssueState::Closed,
            StateFilter::All => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub milestone: Option<Milestone>,
}

impl Issue {
    pub fn is_closed(&self) -> bool {
        self.state == IssueState::Closed
    }
}

/// A file read through the repository contents API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFile {
    pub path: String,
    pub content: String,
    /// Blob sha, required to write the file back.
    pub sha: String,
}

// ---------------------------------------------------------------------------
// IssueTracker
// ---------------------------------------------------------------------------

/// Remote operations the sync needs from an issue tracker.
pub trait IssueTracker {
    /// All issues in `filter`, pull requests excluded.
    fn list_issues(&self, filter: StateFilter) -> Result<Vec<Issue>>;

    fn create_issue(&self, title: &str) -> Result<Issue>;

    fn update_issue_body(&self, number: u64, body: &str) -> Result<()>;

    fn set_issue_milestone(&self, number: u64, milestone: u64) -> Result<()>;

    /// Open milestones, in the tracker's order.
    fn list_milestones(&self) -> Result<Vec<Milestone>>;

    fn get_file(&self, path: &str) -> Result<RepoFile>;

    fn put_file(&self, path: &str, content: &str, sha: &str, message: &str) -> Result<()>;
}
