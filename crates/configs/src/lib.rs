use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the REST backend lives.
///
/// Tasks and items may be mounted under their own base URLs; when unset they
/// share `base_url`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub tasks_base_url: Option<String>,
    #[serde(default)]
    pub items_base_url: Option<String>,
    /// Per-request timeout in seconds; absent means requests may hang.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".into(),
            tasks_base_url: None,
            items_base_url: None,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { credentials_path: default_credentials_path() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

/// Bind address of the development backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8000 }
    }
}

fn default_credentials_path() -> PathBuf { PathBuf::from("data/credentials.json") }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when the
    /// file is missing, then apply environment overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.api.normalize_from_env();
        self.api.validate()?;
        if let Ok(path) = std::env::var("DASHBOARD_CREDENTIALS_PATH") {
            if !path.trim().is_empty() {
                self.storage.credentials_path = PathBuf::from(path);
            }
        }
        self.server.normalize()?;
        Ok(())
    }
}

impl ApiConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(url) = std::env::var("DASHBOARD_API_URL") {
            self.base_url = url;
        }
        if let Ok(url) = std::env::var("DASHBOARD_TASKS_API_URL") {
            self.tasks_base_url = Some(url);
        }
        if let Ok(url) = std::env::var("DASHBOARD_ITEMS_API_URL") {
            self.items_base_url = Some(url);
        }
        self.base_url = trim_base(&self.base_url);
        self.tasks_base_url = trim_optional(self.tasks_base_url.as_deref());
        self.items_base_url = trim_optional(self.items_base_url.as_deref());
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(anyhow!(
                "api.base_url is empty; set it in config.toml or DASHBOARD_API_URL"
            ));
        }
        let extra = [self.tasks_base_url.as_ref(), self.items_base_url.as_ref()];
        for url in std::iter::once(&self.base_url).chain(extra.into_iter().flatten()) {
            let lower = url.to_lowercase();
            if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                return Err(anyhow!("api url must start with http:// or https://: {url}"));
            }
        }
        if self.request_timeout_secs == Some(0) {
            return Err(anyhow!("api.request_timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }

    pub fn tasks_base(&self) -> &str {
        self.tasks_base_url.as_deref().unwrap_or(&self.base_url)
    }

    pub fn items_base(&self) -> &str {
        self.items_base_url.as_deref().unwrap_or(&self.base_url)
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            self.port = port
                .parse()
                .map_err(|_| anyhow!("SERVER_PORT is not a port number: {port}"))?;
        }
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        Ok(())
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn trim_optional(url: Option<&str>) -> Option<String> {
    url.map(trim_base).filter(|u| !u.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = load_from_str("").unwrap();
        assert_eq!(cfg.api.base_url, "http://127.0.0.1:8000/api");
        assert_eq!(cfg.api.tasks_base(), cfg.api.base_url);
        assert_eq!(cfg.storage.credentials_path, PathBuf::from("data/credentials.json"));
        assert!(!cfg.logging.json);
    }

    #[test]
    fn per_resource_bases_override_main_url() {
        let mut cfg = load_from_str(
            r#"
            [api]
            base_url = "http://localhost:9000/"
            items_base_url = "http://localhost:9001/api/items/"
            "#,
        )
        .unwrap();
        cfg.api.normalize_from_env();
        assert_eq!(cfg.api.tasks_base(), "http://localhost:9000");
        assert_eq!(cfg.api.items_base(), "http://localhost:9001/api/items");
    }

    #[test]
    fn rejects_non_http_urls_and_zero_timeout() {
        let api = ApiConfig { base_url: "ftp://x".into(), ..ApiConfig::default() };
        assert!(api.validate().is_err());

        let api = ApiConfig { request_timeout_secs: Some(0), ..ApiConfig::default() };
        assert!(api.validate().is_err());
    }
}
