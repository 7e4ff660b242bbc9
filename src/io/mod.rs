//! File import and export.

/// Load profile CSV reading and writing.
pub mod load_csv;

pub use load_csv::{ProfileError, export_profile, read_profile, read_profile_path, write_profile};
