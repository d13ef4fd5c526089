//! Configuration management for fleet
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (FLEET_*)
//! 3. Config file (~/.config/fleet/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::roster::MemberId;
use crate::{Error, Result};

/// Default remote URL template
pub const DEFAULT_URL_TEMPLATE: &str = "{user}@{host}:{id}/{project}";

/// Remote location settings used to build per-member clone URLs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// User name substituted for `{user}`
    pub user: String,

    /// Host substituted for `{host}`
    pub host: String,

    /// URL template with `{user}`, `{host}`, `{id}` and `{project}` placeholders
    pub url_template: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            user: "git".to_string(),
            host: "localhost".to_string(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }
}

impl RemoteConfig {
    /// Render the clone URL for one member of a project
    pub fn url_for(&self, id: &MemberId, project: &str) -> String {
        self.url_template
            .replace("{user}", &self.user)
            .replace("{host}", &self.host)
            .replace("{id}", id.as_str())
            .replace("{project}", project)
    }
}

/// Where one project's working copies live: `<clone_dir>/<project>/<id>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    project: String,
    repo_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(clone_dir: impl AsRef<Path>, project: impl Into<String>) -> Self {
        let project = project.into();
        let repo_dir = clone_dir.as_ref().join(&project);
        Self { project, repo_dir }
    }

    /// Project name
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Directory holding every member's working copy
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Working copy location for one member
    pub fn member_path(&self, id: &MemberId) -> PathBuf {
        self.repo_dir.join(id.as_str())
    }
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Remote settings
    pub remote: RemoteConfig,

    /// Directory holding one subdirectory per project
    pub clone_dir: PathBuf,

    /// File the members switched by `switch` are exported to
    pub switch_export: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            clone_dir: PathBuf::from("repos"),
            switch_export: PathBuf::from("switched_repos.csv"),
        }
    }
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config {}: {}", path.display(), e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/fleet/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fleet").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - FLEET_USER: remote user
    /// - FLEET_HOST: remote host
    /// - FLEET_URL_TEMPLATE: remote URL template
    /// - FLEET_CLONE_DIR: base clone directory
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(user) = lookup("FLEET_USER") {
            self.remote.user = user;
        }

        if let Some(host) = lookup("FLEET_HOST") {
            self.remote.host = host;
        }

        if let Some(template) = lookup("FLEET_URL_TEMPLATE") {
            self.remote.url_template = template;
        }

        if let Some(dir) = lookup("FLEET_CLONE_DIR") {
            self.clone_dir = PathBuf::from(dir);
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        user: Option<String>,
        host: Option<String>,
        clone_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(user) = user {
            self.remote.user = user;
        }

        if let Some(host) = host {
            self.remote.host = host;
        }

        if let Some(dir) = clone_dir {
            self.clone_dir = dir;
        }

        self
    }

    /// Layout of `project` under the configured clone directory
    pub fn layout(&self, project: &str) -> ProjectLayout {
        ProjectLayout::new(&self.clone_dir, project)
    }

    /// Check settings that would make every member operation fail
    pub fn validate(&self) -> Result<()> {
        if !self.remote.url_template.contains("{id}") {
            return Err(Error::Config(format!(
                "URL template '{}' has no {{id}} placeholder; every member would share one remote",
                self.remote.url_template
            )));
        }

        Ok(())
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        config_path: Option<&Path>,
        user: Option<String>,
        host: Option<String>,
        clone_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let base = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        let config = base
            .with_env_overrides()
            .with_cli_overrides(user, host, clone_dir);
        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.remote.url_template, DEFAULT_URL_TEMPLATE);
        assert_eq!(config.clone_dir, PathBuf::from("repos"));
        assert_eq!(config.switch_export, PathBuf::from("switched_repos.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_url_for() {
        let remote = RemoteConfig {
            user: "cs-2025".to_string(),
            host: "git.example.edu".to_string(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
        };

        let url = remote.url_for(&MemberId::from("24681012"), "project1");
        assert_eq!(url, "cs-2025@git.example.edu:24681012/project1");
    }

    #[test]
    fn test_layout_paths() {
        let mut config = Config::default();
        config.clone_dir = PathBuf::from("/srv/repos");

        let layout = config.layout("project2");
        assert_eq!(layout.repo_dir(), Path::new("/srv/repos/project2"));
        assert_eq!(
            layout.member_path(&MemberId::from("001")),
            PathBuf::from("/srv/repos/project2/001")
        );
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(
            Some("alice".to_string()),
            None,
            Some(PathBuf::from("/srv/repos")),
        );

        assert_eq!(config.remote.user, "alice");
        assert_eq!(config.remote.host, "localhost");
        assert_eq!(config.clone_dir, PathBuf::from("/srv/repos"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("FLEET_HOST", "gitolite.example.org"),
            ("FLEET_URL_TEMPLATE", "ssh://{user}@{host}/{project}/{id}"),
        ]
        .into_iter()
        .collect();

        let config = Config::default()
            .with_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.remote.host, "gitolite.example.org");
        assert_eq!(config.remote.url_template, "ssh://{user}@{host}/{project}/{id}");
        assert_eq!(config.remote.user, "git");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
clone_dir = "/tmp/course"

[remote]
user = "rw-2025"
host = "gitolite.example.org"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.clone_dir, PathBuf::from("/tmp/course"));
        assert_eq!(config.remote.user, "rw-2025");
        // url_template should use default
        assert_eq!(config.remote.url_template, DEFAULT_URL_TEMPLATE);
    }

    #[test]
    fn test_validate_rejects_template_without_id() {
        let mut config = Config::default();
        config.remote.url_template = "{user}@{host}:{project}".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
