//! GitLab integration and merge request analysis.
//!
//! Provides the [`gateway::RepositoryGateway`] abstraction over the remote
//! service, a GitLab REST v4 implementation, the sequential analysis
//! pipeline, and the resulting contribution report.

pub mod client;
pub mod gateway;
pub mod pipeline;
pub mod report;
