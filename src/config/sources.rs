//! Configuration sources, applied in override order by the loader.

pub mod env;
pub mod global_file;
pub mod workspace_file;
