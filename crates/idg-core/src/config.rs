use crate::error::Result;
use crate::sync::DiagramSource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".idg.yaml";
pub const DEFAULT_TOKEN_FILE: &str = "token";

/// Project settings read from `.idg.yaml`. Every field is optional; command
/// line flags take precedence over whatever is set here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default repository, `owner/name`.
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    /// Repository file holding the diagram. When unset the diagram is read
    /// from the open issue that carries a mermaid block.
    #[serde(default)]
    pub diagram_file: Option<String>,
    #[serde(default = "default_token_file")]
    pub token_file: String,
}

fn default_token_file() -> String {
    DEFAULT_TOKEN_FILE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo: None,
            api_url: None,
            diagram_file: None,
            token_file: default_token_file(),
        }
    }
}

impl Config {
    pub fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Load `.idg.yaml` from `root`, or defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn source(&self) -> DiagramSource {
        match &self.diagram_file {
            Some(path) => DiagramSource::File(path.clone()),
            None => DiagramSource::Issue,
        }
    }

    /// Token file location, resolved against `root` when relative.
    pub fn token_path(&self, root: &Path) -> PathBuf {
        root.join(&self.token_file)
    }
}
