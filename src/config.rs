use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub navigation: NavigationConfig,
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GatewayConfig {
    pub worker_threads: usize,
    pub request_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            worker_threads: 2,
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NavigationConfig {
    /// Routes that always take a real document navigation. Matched as
    /// regular expressions against the un-normalized target path.
    pub excluded_routes: Vec<String>,
    /// Appended to fragment titles as `<title> | <suffix>`.
    pub title_suffix: String,
    pub history_capacity: usize,
    /// Scroll position past which the back-to-top control shows.
    pub scroll_back_threshold: u32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            excluded_routes: vec!["logout/?$".to_string()],
            title_suffix: "Molt".to_string(),
            history_capacity: 64,
            scroll_back_threshold: 400,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RefreshConfig {
    /// Interval between new-molt polls. Zero disables polling.
    pub poll_interval_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 30_000,
        }
    }
}

impl Config {
    pub fn load() -> AppResult<Self> {
        let Some(path) = default_config_path() else {
            return Ok(Self::default());
        };
        Self::load_from_path(path)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        if !path.is_file() {
            return Err(AppError::invalid_argument(format!(
                "config path is not a regular file: {}",
                path.display()
            )));
        }

        let raw = fs::read_to_string(path).map_err(|source| {
            AppError::io_with_context(source, format!("failed to read config: {}", path.display()))
        })?;
        let parsed = toml::from_str::<Self>(&raw).map_err(|source| {
            AppError::invalid_argument(format!(
                "failed to parse config {}: {source}",
                path.display()
            ))
        })?;
        parsed.sanitized()
    }

    fn sanitized(mut self) -> AppResult<Self> {
        self.gateway.worker_threads = self.gateway.worker_threads.max(1);
        self.gateway.request_timeout_ms = self.gateway.request_timeout_ms.max(1);
        self.navigation.history_capacity = self.navigation.history_capacity.max(1);
        if self.navigation.title_suffix.is_empty() {
            self.navigation.title_suffix = NavigationConfig::default().title_suffix;
        }
        for pattern in &self.navigation.excluded_routes {
            regex::Regex::new(pattern).map_err(|source| {
                AppError::invalid_argument(format!(
                    "invalid excluded route pattern {pattern:?}: {source}"
                ))
            })?;
        }
        Ok(self)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os("MOLT_CONFIG_PATH")
        && !explicit.is_empty()
    {
        return Some(PathBuf::from(explicit));
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Some(PathBuf::from(xdg).join("molt").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME")
        && !home.is_empty()
    {
        return Some(
            PathBuf::from(home)
                .join(".config")
                .join("molt")
                .join("config.toml"),
        );
    }
    None
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::Config;

    fn unique_temp_path(suffix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("molt_config_{suffix}_{}_{}", process::id(), nanos));
        path
    }

    #[test]
    fn load_from_path_returns_defaults_for_missing_file() {
        let missing = unique_temp_path("missing.toml");
        let config = Config::load_from_path(&missing).expect("missing config should fallback");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_from_path_applies_partial_overrides_and_sanitizes() {
        let path = unique_temp_path("custom.toml");
        fs::write(
            &path,
            r#"
            [gateway]
            worker_threads = 0
            request_timeout_ms = 0

            [navigation]
            title_suffix = ""
            history_capacity = 0
            "#,
        )
        .expect("config file should be written");

        let config = Config::load_from_path(&path).expect("config should parse");
        assert_eq!(config.gateway.worker_threads, 1);
        assert_eq!(config.gateway.request_timeout_ms, 1);
        assert_eq!(config.navigation.title_suffix, "Molt");
        assert_eq!(config.navigation.history_capacity, 1);
        assert_eq!(config.navigation.excluded_routes, vec!["logout/?$"]);
        assert_eq!(config.refresh.poll_interval_ms, 30_000);

        fs::remove_file(&path).expect("config file should be removed");
    }

    #[test]
    fn load_from_path_rejects_malformed_excluded_route() {
        let path = unique_temp_path("bad_route.toml");
        fs::write(
            &path,
            r#"
            [navigation]
            excluded_routes = ["logout(/?$"]
            "#,
        )
        .expect("config file should be written");

        assert!(Config::load_from_path(&path).is_err());
        fs::remove_file(&path).expect("config file should be removed");
    }
}
