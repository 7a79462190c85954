/// Admin dashboard configuration
///
/// Read from `FOLIO_*` environment variables, falling back to logged
/// defaults, or from a JSON file with the same keys in snake_case.

use crate::error::ConfigError;
use crate::view::DEFAULT_PAGE_SIZE;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_BASE_URL: &str = "FOLIO_BASE_URL";
pub const ENV_TOKEN: &str = "FOLIO_TOKEN";
pub const ENV_PAGE_SIZE: &str = "FOLIO_PAGE_SIZE";
pub const ENV_PAGE_WINDOW: &str = "FOLIO_PAGE_WINDOW";

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_PAGE_WINDOW: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Choices offered by the page-size selector
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<usize>,
    /// Numbered page buttons shown at once
    #[serde(default = "default_page_window")]
    pub page_window: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
fn default_page_size_options() -> Vec<usize> {
    vec![5, 10, 20, 50]
}
fn default_page_window() -> usize {
    DEFAULT_PAGE_WINDOW
}

impl Default for AdminConfig {
    fn default() -> Self {
        AdminConfig {
            base_url: default_base_url(),
            token: None,
            page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            page_window: default_page_window(),
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AdminConfig::default();

        match lookup(ENV_BASE_URL) {
            Some(url) => config.base_url = url,
            None => info!("{} not set, using {}", ENV_BASE_URL, config.base_url),
        }

        config.token = lookup(ENV_TOKEN).filter(|t| !t.is_empty());
        if config.token.is_none() {
            warn!("{} not set, project routes will be refused", ENV_TOKEN);
        }

        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            config.page_size = parse_usize(ENV_PAGE_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PAGE_WINDOW) {
            config.page_window = parse_usize(ENV_PAGE_WINDOW, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let config: AdminConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(invalid("base_url", "must not be empty"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(invalid("base_url", "must start with http:// or https://"));
        }
        if self.page_size == 0 {
            return Err(invalid("page_size", "must be at least 1"));
        }
        if self.page_size_options.contains(&0) {
            return Err(invalid("page_size_options", "sizes must be at least 1"));
        }
        if self.page_window == 0 {
            return Err(invalid("page_window", "must be at least 1"));
        }
        if !self.page_size_options.is_empty() && !self.page_size_options.contains(&self.page_size) {
            warn!(
                "page_size {} is not one of the selector options {:?}",
                self.page_size, self.page_size_options
            );
        }
        Ok(())
    }
}

fn parse_usize(key: &str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| invalid(key, &format!("expected a positive integer, got {:?}", raw)))
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AdminConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AdminConfig::default());
        assert_eq!(config.page_size_options, vec![5, 10, 20, 50]);
        assert_eq!(config.page_window, 5);
    }

    #[test]
    fn test_values_from_lookup() {
        let config = AdminConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://api.example.com"),
            (ENV_TOKEN, "secret"),
            (ENV_PAGE_SIZE, " 20 "),
            (ENV_PAGE_WINDOW, "7"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.page_size, 20);
        assert_eq!(config.page_window, 7);
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let err = AdminConfig::from_lookup(lookup(&[(ENV_PAGE_SIZE, "ten")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_PAGE_SIZE));

        assert!(AdminConfig::from_lookup(lookup(&[(ENV_PAGE_SIZE, "0")])).is_err());
        assert!(AdminConfig::from_lookup(lookup(&[(ENV_BASE_URL, "ftp://x")])).is_err());
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("folioview-config-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"base_url": "https://admin.example.com", "page_size": 8}}"#).unwrap();
        drop(file);

        let config = AdminConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.base_url, "https://admin.example.com");
        assert_eq!(config.page_size, 8);
        assert_eq!(config.page_window, DEFAULT_PAGE_WINDOW);
        assert_eq!(config.token, None);
    }

    #[test]
    fn test_from_json_file_rejects_unknown_keys() {
        let path = std::env::temp_dir().join(format!("folioview-config-bad-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"page_sise": 8}"#).unwrap();
        let result = AdminConfig::from_json_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }
}
