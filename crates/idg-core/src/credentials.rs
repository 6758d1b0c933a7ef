//! Access token lookup. A missing token is not an error: requests then go
//! out unauthenticated and the tracker decides what to reject.

use crate::config::Config;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Per-user fallback, relative to the home directory.
pub const USER_TOKEN_FILE: &str = ".config/idg/token";

/// Read a token file. Unreadable, missing, and blank files all yield `None`.
pub fn read_token_file(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(data) => {
            let token = data.trim();
            if token.is_empty() {
                debug!(path = %path.display(), "token file is empty");
                None
            } else {
                Some(token.to_string())
            }
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no token file");
            None
        }
    }
}

pub fn user_token_path() -> Option<PathBuf> {
    home::home_dir().map(|h| h.join(USER_TOKEN_FILE))
}

/// Resolve the token: the project token file first, then the per-user one.
pub fn load_token(root: &Path, config: &Config) -> Option<String> {
    read_token_file(&config.token_path(root))
        .or_else(|| user_token_path().and_then(|p| read_token_file(&p)))
}
