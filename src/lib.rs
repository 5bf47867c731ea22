//! # SQL Index Manager options
//!
//! Self-validating configuration for a SQL Server index maintenance tool.
//!
//! This crate provides:
//! - **Options**: Timeouts, fragmentation thresholds, index size bands,
//!   rebuild options and schema/object filters that are always legal
//! - **Loading**: JSON documents and `IDXMGR_*` environment overrides
//! - **Sharing**: A lock-guarded handle for multi-threaded hosts
//!
//! ## Setter contract
//!
//! Setters never return errors. An illegal candidate leaves the previous
//! value in place, and the coupled groups (reorganize/rebuild thresholds,
//! min/pre-describe/max sizes) are reconciled whenever one member changes.
//! A setter guarantees the stored value is legal, not that it equals the
//! input.

pub mod config;
pub mod constants;
pub mod error;
pub mod options;
pub mod security;
pub mod state;

pub use config::OptionsDocument;
pub use error::OptionsError;
pub use options::Options;
