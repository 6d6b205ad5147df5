use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Runtime settings for a migration run.
///
/// Values are layered (lowest first): serde defaults, an optional settings
/// file, `GL2AZDO_*` environment variables, explicit command line flags.
#[derive(Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_gitlab_url")]
    pub gitlab_url: String,
    pub gitlab_token: String,
    pub azdo_org: String,
    pub azdo_token: String,
    /// Service endpoint used by import requests to read private GitLab repositories.
    #[serde(default, deserialize_with = "deserialize_endpoint")]
    pub azdo_endpoint: Option<Uuid>,
    #[serde(default = "default_projects_file")]
    pub projects_file: PathBuf,
    #[serde(default)]
    pub recreate_repo: bool,
    #[serde(default = "default_archive_projects")]
    pub archive_projects: bool,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Zero disables the ceiling.
    #[serde(default = "default_import_timeout_secs")]
    pub import_timeout_secs: u64,
}

// Manual Debug impl to avoid leaking the API tokens
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("gitlab_url", &self.gitlab_url)
            .field("gitlab_token", &"[REDACTED]")
            .field("azdo_org", &self.azdo_org)
            .field("azdo_token", &"[REDACTED]")
            .field("azdo_endpoint", &self.azdo_endpoint)
            .field("projects_file", &self.projects_file)
            .field("recreate_repo", &self.recreate_repo)
            .field("archive_projects", &self.archive_projects)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("import_timeout_secs", &self.import_timeout_secs)
            .finish()
    }
}

/// Values given explicitly on the command line. `None` leaves lower layers untouched.
#[derive(Debug, Default, Clone)]
pub struct SettingsOverrides {
    pub gitlab_url: Option<String>,
    pub gitlab_token: Option<String>,
    pub azdo_org: Option<String>,
    pub azdo_token: Option<String>,
    pub azdo_endpoint: Option<String>,
    pub projects_file: Option<String>,
    pub recreate_repo: Option<bool>,
    pub archive_projects: Option<bool>,
    pub poll_interval_secs: Option<u64>,
    pub import_timeout_secs: Option<u64>,
}

fn default_gitlab_url() -> String {
    "https://gitlab.com".to_string()
}

fn default_projects_file() -> PathBuf {
    PathBuf::from("projects.json")
}

fn default_archive_projects() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    3
}

fn default_import_timeout_secs() -> u64 {
    60 * 60
}

fn deserialize_endpoint<'de, D>(deserializer: D) -> std::result::Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(id) => Uuid::parse_str(id)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid azdo_endpoint {id}: {e}"))),
    }
}

impl Settings {
    pub fn load(settings_path: Option<&str>, overrides: &SettingsOverrides) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = settings_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("gitlab-to-azdo").required(false));
        }

        // Environment variable overrides with GL2AZDO_ prefix
        builder = builder.add_source(config::Environment::with_prefix("GL2AZDO").try_parsing(true));

        builder = builder
            .set_override_option("gitlab_url", overrides.gitlab_url.clone())?
            .set_override_option("gitlab_token", overrides.gitlab_token.clone())?
            .set_override_option("azdo_org", overrides.azdo_org.clone())?
            .set_override_option("azdo_token", overrides.azdo_token.clone())?
            .set_override_option("azdo_endpoint", overrides.azdo_endpoint.clone())?
            .set_override_option("projects_file", overrides.projects_file.clone())?
            .set_override_option("recreate_repo", overrides.recreate_repo)?
            .set_override_option("archive_projects", overrides.archive_projects)?
            .set_override_option("poll_interval_secs", overrides.poll_interval_secs)?
            .set_override_option("import_timeout_secs", overrides.import_timeout_secs)?;

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()
    }

    fn validate(mut self) -> Result<Self> {
        self.gitlab_url = normalize_url("gitlab_url", &self.gitlab_url)?;
        self.azdo_org = normalize_url("azdo_org", &self.azdo_org)?;

        if self.gitlab_token.trim().is_empty() {
            return Err(AppError::Config("gitlab_token must not be empty".to_string()));
        }
        if self.azdo_token.trim().is_empty() {
            return Err(AppError::Config("azdo_token must not be empty".to_string()));
        }
        if self.poll_interval_secs == 0 {
            return Err(AppError::Config(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn import_timeout(&self) -> Option<Duration> {
        (self.import_timeout_secs > 0).then(|| Duration::from_secs(self.import_timeout_secs))
    }
}

fn normalize_url(key: &str, raw: &str) -> Result<String> {
    let parsed = Url::parse(raw.trim())
        .map_err(|e| AppError::Config(format!("{key} is not a valid URL ({raw}): {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::Config(format!(
            "{key} must be an http(s) URL, got {raw}"
        )));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Project list file: `{"projects": [{"gitlabID": 1, "azdoProject": "x", "migrateMRs": true}]}`.
#[derive(Debug, Deserialize, Clone)]
pub struct ProjectsFile {
    pub projects: Vec<ProjectSpec>,
}

/// One GitLab project to migrate and the Azure DevOps project receiving it.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    #[serde(rename = "gitlabID")]
    pub gitlab_id: u64,
    #[serde(rename = "azdoProject")]
    pub azdo_project: String,
    #[serde(rename = "migrateMRs", default)]
    pub migrate_mrs: bool,
}

impl ProjectsFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "Failed to read project list at {}: {e}",
                path.display()
            ))
        })?;
        Self::parse(&raw).map_err(|e| {
            AppError::Config(format!("Invalid project list {}: {e}", path.display()))
        })
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
