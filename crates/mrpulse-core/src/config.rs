use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MrPulseError;

/// Top-level configuration loaded from `.mrpulse.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
///
/// # Examples
///
/// ```
/// use mrpulse_core::MrPulseConfig;
///
/// let config = MrPulseConfig::default();
/// assert_eq!(config.branches.source, "develop");
/// assert_eq!(config.branches.target, "main");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MrPulseConfig {
    /// GitLab connection settings.
    #[serde(default)]
    pub gitlab: GitLabConfig,
    /// Branches whose merge request is analyzed.
    #[serde(default)]
    pub branches: BranchConfig,
    /// Merge request lookup behavior.
    #[serde(default)]
    pub merge_request: MergeRequestConfig,
}

impl MrPulseConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MrPulseError::FileNotFound`] if the file does not exist,
    /// [`MrPulseError::Io`] if it cannot be read, or [`MrPulseError::Toml`]
    /// if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mrpulse_core::MrPulseConfig;
    /// use std::path::Path;
    ///
    /// let config = MrPulseConfig::from_file(Path::new(".mrpulse.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, MrPulseError> {
        if !path.exists() {
            return Err(MrPulseError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`MrPulseError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use mrpulse_core::MrPulseConfig;
    ///
    /// let toml = r#"
    /// [branches]
    /// source = "feature/login"
    /// "#;
    /// let config = MrPulseConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.branches.source, "feature/login");
    /// assert_eq!(config.branches.target, "main");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, MrPulseError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Overlay values from the process environment.
    ///
    /// Reads `GITLAB_URL`, `GITLAB_PROJECT_ID`, `GITLAB_TOKEN`,
    /// `SOURCE_BRANCH` and `TARGET_BRANCH`. Empty values are ignored.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary environment lookup.
    ///
    /// # Examples
    ///
    /// ```
    /// use mrpulse_core::MrPulseConfig;
    ///
    /// let mut config = MrPulseConfig::default();
    /// config.apply_env_with(|key| match key {
    ///     "SOURCE_BRANCH" => Some("release".into()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.branches.source, "release");
    /// ```
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("GITLAB_URL") {
            self.gitlab.base_url = url;
        }
        if let Some(project) = get("GITLAB_PROJECT_ID") {
            self.gitlab.project_id = Some(project);
        }
        if let Some(token) = get("GITLAB_TOKEN") {
            self.gitlab.token = Some(token);
        }
        if let Some(source) = get("SOURCE_BRANCH") {
            self.branches.source = source;
        }
        if let Some(target) = get("TARGET_BRANCH") {
            self.branches.target = target;
        }
    }
}

/// GitLab connection configuration.
///
/// `project_id` and `token` are optional here so a config file can omit
/// them; [`GitLabConfig::settings`] enforces their presence at run time.
///
/// # Examples
///
/// ```
/// use mrpulse_core::GitLabConfig;
///
/// let config = GitLabConfig::default();
/// assert_eq!(config.base_url, "https://gitlab.com");
/// assert_eq!(config.timeout_secs, 30);
/// assert_eq!(config.max_retries, 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitLabConfig {
    /// Instance root URL (default: `https://gitlab.com`).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Numeric project id or `group/project` path.
    pub project_id: Option<String>,
    /// Private token sent as the `PRIVATE-TOKEN` header.
    pub token: Option<String>,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries for transient failures (default: 2).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "https://gitlab.com".into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            project_id: None,
            token: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl GitLabConfig {
    /// Validate the configuration into the settings a gateway client needs.
    ///
    /// # Errors
    ///
    /// Returns [`MrPulseError::Config`] if the project id or token is missing,
    /// or the base URL is not an `http(s)` URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use mrpulse_core::GitLabConfig;
    ///
    /// let config = GitLabConfig {
    ///     project_id: Some("42".into()),
    ///     token: Some("glpat-xxxx".into()),
    ///     ..GitLabConfig::default()
    /// };
    /// let settings = config.settings().unwrap();
    /// assert_eq!(settings.project_id, "42");
    ///
    /// assert!(GitLabConfig::default().settings().is_err());
    /// ```
    pub fn settings(&self) -> Result<GitLabSettings, MrPulseError> {
        let project_id = self
            .project_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                MrPulseError::Config(
                    "GitLab project id not set. Pass --project, set GITLAB_PROJECT_ID, or set project_id in .mrpulse.toml".into(),
                )
            })?;
        let token = self
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                MrPulseError::Config(
                    "GitLab token not set. Set GITLAB_TOKEN or token in .mrpulse.toml [gitlab]"
                        .into(),
                )
            })?;

        let base_url = self.base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(MrPulseError::Config(format!(
                "invalid GitLab URL '{}', expected http:// or https://",
                self.base_url
            )));
        }

        Ok(GitLabSettings {
            base_url: base_url.to_string(),
            project_id: project_id.to_string(),
            token: token.to_string(),
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
        })
    }
}

/// Validated connection settings passed to the gateway constructor.
#[derive(Clone)]
pub struct GitLabSettings {
    /// Instance root URL without a trailing slash.
    pub base_url: String,
    /// Numeric project id or `group/project` path.
    pub project_id: String,
    /// Private token.
    pub token: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries for transient failures.
    pub max_retries: u32,
}

impl std::fmt::Debug for GitLabSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabSettings")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Source and target branches of the analyzed merge request.
///
/// # Examples
///
/// ```
/// use mrpulse_core::BranchConfig;
///
/// let config = BranchConfig::default();
/// assert_eq!(config.source, "develop");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchConfig {
    /// Branch being merged (default: `develop`).
    #[serde(default = "default_source_branch")]
    pub source: String,
    /// Branch merged into (default: `main`).
    #[serde(default = "default_target_branch")]
    pub target: String,
}

fn default_source_branch() -> String {
    "develop".into()
}

fn default_target_branch() -> String {
    "main".into()
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            source: default_source_branch(),
            target: default_target_branch(),
        }
    }
}

/// What to do when no open merge request exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeRequestConfig {
    /// Create the merge request instead of failing (default: false).
    #[serde(default)]
    pub create_if_missing: bool,
    /// Title for a created merge request.
    pub title: Option<String>,
}
