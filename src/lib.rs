//! readlog - Personal reading log with filtered statistics
//!
//! Keeps a collection of read-records (books, novellas, manga, ...) and
//! derives statistics over the reads finished in the selected years and
//! content types.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐        ┌────────────────────────────────┐
//! │  readlog serve           │  HTTP  │  Dashboard                     │
//! │  ┌────────────────────┐  │◄──────►│  ┌──────────┐  ┌────────────┐  │
//! │  │ reads::handler     │  │        │  │ snapshot │  │ FilterState│  │
//! │  └─────────┬──────────┘  │        │  └────┬─────┘  └─────┬──────┘  │
//! │  ┌─────────▼──────────┐  │        │       └──────┬───────┘         │
//! │  │ ReadStore (JSON)   │◄─┼────────┤        select → aggregate      │
//! │  └────────────────────┘  │ local  │                                │
//! └──────────────────────────┘        └────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`reads`]: Record types, lenient field decoding, the file-backed store
//!   and its HTTP handlers
//! - [`dashboard`]: Filter state, working-set selection, statistics and the
//!   refreshing controller
//! - [`api`]: Combined HTTP application
//! - [`config`]: Configuration management

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod reads;

pub use config::ReadlogConfig;
pub use error::{Error, Result};
