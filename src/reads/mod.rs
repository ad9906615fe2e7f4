//! Reads module: the record store and its HTTP API
//!
//! Read-records are persisted as one JSON file each under
//! `~/.readlog/reads/` and served over REST for the dashboard.

pub mod handler;
pub mod lenient;
pub mod store;
pub mod types;

pub use handler::{reads_router, ReadsState};
pub use lenient::parse_date;
pub use store::ReadStore;
pub use types::*;
