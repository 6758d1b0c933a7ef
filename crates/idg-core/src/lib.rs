pub mod config;
pub mod credentials;
pub mod diagram;
pub mod error;
pub mod github;
pub mod graph;
pub mod reconcile;
pub mod sync;
pub mod tracker;

pub use error::{IdgError, Result};
