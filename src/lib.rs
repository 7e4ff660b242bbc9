//! Input-collection wizard for off-grid and hybrid energy system design.

#[cfg(feature = "api")]
pub mod api;
pub mod backend;
pub mod components;
pub mod config;
pub mod endpoints;
pub mod io;
/// Layout catalog and compatibility filter.
pub mod layouts;
pub mod stores;
pub mod telemetry;
#[cfg(feature = "tui")]
pub mod tui;
pub mod wizard;
