use std::{fs::File, io::BufReader, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub db: DbConfig,
    pub github: GitHubConfig,
    pub analysis: AnalysisConfig,
    pub templates: TemplatesConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self { Self { port: 3000 } }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DbConfig {
    pub url: String,
}

impl Default for DbConfig {
    fn default() -> Self { Self { url: "sqlite::memory:".to_string() } }
}

impl DbConfig {
    pub fn in_memory() -> Self { Self::default() }

    pub fn is_in_memory(&self) -> bool { self.url.contains(":memory:") }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub token: Option<String>,
    /// Override for GitHub Enterprise or a local test server
    pub base_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Re-analysis inside this window replays the stored snapshot
    pub freshness_secs: u64,
    pub closed_issue_window_days: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self { Self { freshness_secs: 60 * 60, closed_issue_window_days: 30 } }
}

impl AnalysisConfig {
    pub fn freshness_window(&self) -> Duration { Duration::from_secs(self.freshness_secs) }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplatesConfig {
    pub path: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self { Self { path: "templates".to_string() } }
}

const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GITHUB_API_KEY"];

impl Config {
    /// Load the config file if present, falling back to defaults, then apply
    /// token overrides from the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config: Config = if path.exists() {
            let file = BufReader::new(
                File::open(path)
                    .with_context(|| format!("Failed to open config file {}", path.display()))?,
            );
            serde_yaml::from_reader(file)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            tracing::info!("No config file at {}, using defaults", path.display());
            Config::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(token) =
            TOKEN_ENV_VARS.iter().find_map(|key| var(key).filter(|v| !v.is_empty()))
        {
            self.github.token = Some(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("config.yml")).unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.db.is_in_memory());
        assert_eq!(config.analysis.freshness_window(), Duration::from_secs(3600));
        assert_eq!(config.analysis.closed_issue_window_days, 30);
        assert_eq!(config.templates.path, "templates");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 8080\nanalysis:\n  freshness_secs: 10").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.analysis.freshness_secs, 10);
        assert_eq!(config.analysis.closed_issue_window_days, 30);
        assert_eq!(config.db.url, "sqlite::memory:");
    }

    #[test]
    fn env_token_overrides_file() {
        let mut config = Config::default();
        config.github.token = Some("from-file".to_string());
        config.apply_env(|key| (key == "GITHUB_API_KEY").then(|| "from-env".to_string()));
        assert_eq!(config.github.token.as_deref(), Some("from-env"));

        config.apply_env(|_| Some(String::new()));
        assert_eq!(config.github.token.as_deref(), Some("from-env"));
    }
}
