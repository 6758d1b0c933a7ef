use anyhow::{bail, Context};
use idg_core::config::Config;
use idg_core::credentials::load_token;
use idg_core::github::{GitHubClient, DEFAULT_API_URL};
use idg_core::sync::{DiagramSource, Syncer};
use idg_core::tracker::RepoId;
use std::path::{Path, PathBuf};

const MISSING_REPO: &str = "
===================================================
|           Repository name is not set            |
===================================================

Use --repo <owner/name> to specify the repository
";

/// Remote-related flags as given on the command line.
pub struct RemoteArgs {
    pub repo: Option<String>,
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub file: Option<String>,
    pub dry_run: bool,
}

/// Command line flags merged over `.idg.yaml`.
pub struct Settings {
    pub root: PathBuf,
    pub repo: Option<String>,
    pub token: Option<String>,
    pub api_url: String,
    pub source: DiagramSource,
    pub dry_run: bool,
}

impl Settings {
    pub fn resolve(root: &Path, args: RemoteArgs) -> anyhow::Result<Self> {
        let config = Config::load(root)
            .with_context(|| format!("failed to load {}", Config::path(root).display()))?;

        let token = args
            .token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| load_token(root, &config));
        if token.is_none() {
            tracing::debug!("no access token found, requests are unauthenticated");
        }
        let source = match args.file {
            Some(path) => DiagramSource::File(path),
            None => config.source(),
        };

        Ok(Self {
            root: root.to_path_buf(),
            repo: args.repo.or(config.repo),
            token,
            api_url: args
                .api_url
                .or(config.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            source,
            dry_run: args.dry_run,
        })
    }

    pub fn repo(&self) -> anyhow::Result<RepoId> {
        let Some(repo) = self.repo.as_deref() else {
            bail!(MISSING_REPO);
        };
        Ok(repo.parse()?)
    }

    pub fn syncer(&self) -> anyhow::Result<Syncer<GitHubClient>> {
        let repo = self.repo()?;
        let client = GitHubClient::new(repo, self.token.clone())
            .context("failed to build HTTP client")?
            .with_base_url(&self.api_url);
        Ok(Syncer::new(client, self.source.clone()).dry_run(self.dry_run))
    }
}
