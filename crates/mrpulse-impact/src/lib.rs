//! Contributor attribution and impact ranking.
//!
//! Attributes added lines to the authors of the commits that introduced them,
//! counts commits per author, and ranks contributors by a weighted impact
//! score combining both.

pub mod attribution;
pub mod commits;
pub mod ranking;
