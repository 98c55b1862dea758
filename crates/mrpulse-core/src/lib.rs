//! Core types, configuration, and error handling for mrpulse.
//!
//! This crate provides the shared foundation used by all other mrpulse crates:
//! - [`MrPulseError`] — unified error type using `thiserror`
//! - [`MrPulseConfig`] — configuration loaded from `.mrpulse.toml`
//! - Shared types: [`MergeRequest`], [`Commit`], [`FileDiff`],
//!   [`LineAttribution`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{BranchConfig, GitLabConfig, GitLabSettings, MergeRequestConfig, MrPulseConfig};
pub use error::MrPulseError;
pub use types::{Commit, CommitDetail, FileDiff, LineAttribution, MergeRequest, OutputFormat};

/// A convenience `Result` type for mrpulse operations.
pub type Result<T> = std::result::Result<T, MrPulseError>;
