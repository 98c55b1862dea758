//! Unified-diff line classification.
//!
//! Classifies the lines of a single file's diff text into added, removed,
//! context, hunk-header and noise lines. Diffs are trusted text produced by
//! the remote service; nothing is computed locally.

pub mod classify;
