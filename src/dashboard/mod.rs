//! Dashboard engine
//!
//! Holds a snapshot of the read collection fetched from a [`RecordSource`],
//! the active year/type filters, and derives the working set and its
//! statistics on demand.

pub mod client;
pub mod controller;
pub mod filter;
pub mod selection;
pub mod source;
pub mod stats;

#[cfg(test)]
mod testing;

pub use client::HttpRecordSource;
pub use controller::{Dashboard, DashboardView, RefreshOutcome};
pub use filter::{ContentType, FilterAction, FilterState};
pub use selection::{reads_table, select};
pub use source::RecordSource;
pub use stats::{aggregate, ReadingStats};
