//! Layout catalog and compatibility filtering.

/// The twelve predefined system topologies.
pub mod catalog;
/// Compatibility filter and carousel selection.
pub mod filter;

pub use catalog::{CATALOG, Layout};
pub use filter::{Compatibility, LayoutCarousel, compatible_layouts, is_compatible};
