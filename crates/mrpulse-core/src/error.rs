use std::path::PathBuf;

/// Errors that can occur across the mrpulse workspace.
///
/// Library crates return this type directly; the binary renders it through
/// `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use mrpulse_core::MrPulseError;
///
/// let err = MrPulseError::Config("missing GitLab token".into());
/// assert!(err.to_string().contains("missing GitLab token"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum MrPulseError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A remote API call failed: transport error, non-success status, or an
    /// undecodable response body.
    #[error("GitLab API error: {0}")]
    Api(String),

    /// No open merge request exists between the two branches.
    #[error("no open merge request from '{source_branch}' into '{target_branch}'")]
    #[diagnostic(help(
        "open a merge request first, or rerun with --create-if-missing to let mrpulse create one"
    ))]
    NoMergeRequest {
        /// Branch the merge request would merge from.
        source_branch: String,
        /// Branch the merge request would merge into.
        target_branch: String,
    },

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MrPulseError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = MrPulseError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn no_merge_request_names_both_branches() {
        let err = MrPulseError::NoMergeRequest {
            source_branch: "feature/login".into(),
            target_branch: "main".into(),
        };
        assert_eq!(
            err.to_string(),
            "no open merge request from 'feature/login' into 'main'"
        );
    }

    #[test]
    fn no_merge_request_carries_help() {
        use miette::Diagnostic;

        let err = MrPulseError::NoMergeRequest {
            source_branch: "dev".into(),
            target_branch: "main".into(),
        };
        let help = err.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("--create-if-missing"));
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = MrPulseError::FileNotFound(PathBuf::from("/tmp/.mrpulse.toml"));
        assert!(err.to_string().contains("/tmp/.mrpulse.toml"));
    }
}
