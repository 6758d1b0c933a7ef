use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdgError {
    #[error("invalid repository '{0}': expected <owner>/<name>")]
    InvalidRepo(String),

    #[error("could not find a mermaid graph in open issues")]
    NoDiagram,

    #[error("no mermaid graph in repository file: {0}")]
    NoDiagramInFile(String),

    #[error("milestone not found: {0}")]
    MilestoneNotFound(String),

    #[error("repository has no open milestones")]
    NoMilestones,

    #[error("unsupported content encoding for {path}: {encoding}")]
    UnsupportedEncoding { path: String, encoding: String },

    #[error("GitHub API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    #[error("repository file is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IdgError>;
