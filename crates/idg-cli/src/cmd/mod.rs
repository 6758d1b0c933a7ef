pub mod milestone;
pub mod show;
pub mod sync;
