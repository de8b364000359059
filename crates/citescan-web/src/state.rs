use std::net::SocketAddr;
use std::path::PathBuf;

use citescan_core::config_file::ServerConfig;
use citescan_parsing::ParsingConfig;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 50;

/// Process-wide server settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub bind: SocketAddr,
    /// Allowed CORS origins; `"*"` allows any origin.
    pub cors_origins: Vec<String>,
    /// Directory served for every path that is not an API route.
    pub static_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            cors_origins: vec!["*".to_string()],
            static_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB as usize * 1024 * 1024,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {source}")]
    Bind {
        value: String,
        source: std::net::AddrParseError,
    },
}

impl ServerSettings {
    /// Resolve settings: environment > config file `[server]` > defaults.
    ///
    /// Recognized variables: `CITESCAN_BIND`, `CITESCAN_CORS_ORIGINS`
    /// (comma-separated) and `CITESCAN_STATIC_DIR`.
    pub fn resolve(
        file: Option<&ServerConfig>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        let defaults = Self::default();

        let bind = match env("CITESCAN_BIND").or_else(|| file.and_then(|f| f.bind.clone())) {
            Some(value) => value
                .parse()
                .map_err(|source| SettingsError::Bind { value, source })?,
            None => defaults.bind,
        };

        let cors_origins = env("CITESCAN_CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .or_else(|| file.and_then(|f| f.cors_origins.clone()))
            .unwrap_or(defaults.cors_origins);

        let static_dir = env("CITESCAN_STATIC_DIR")
            .or_else(|| file.and_then(|f| f.static_dir.clone()))
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let max_upload_bytes = file
            .and_then(|f| f.max_upload_mb)
            .map_or(defaults.max_upload_bytes, |mb| {
                usize::try_from(mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
            });

        Ok(Self {
            bind,
            cors_origins,
            static_dir,
            max_upload_bytes,
        })
    }

    /// [`resolve`](Self::resolve) against the process environment.
    pub fn from_env(file: Option<&ServerConfig>) -> Result<Self, SettingsError> {
        Self::resolve(file, |key| std::env::var(key).ok())
    }
}

/// Shared application state accessible from all handlers.
#[derive(Debug)]
pub struct AppState {
    pub parsing: ParsingConfig,
    pub settings: ServerSettings,
}

impl AppState {
    pub fn new(parsing: ParsingConfig, settings: ServerSettings) -> Self {
        Self { parsing, settings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = ServerSettings::resolve(None, env_from(&[])).unwrap();
        assert_eq!(settings, ServerSettings::default());
        assert_eq!(settings.bind.port(), 8000);
    }

    #[test]
    fn test_file_values() {
        let file = ServerConfig {
            bind: Some("127.0.0.1:9000".into()),
            cors_origins: Some(vec!["https://example.org".into()]),
            static_dir: Some("frontend".into()),
            max_upload_mb: Some(2),
        };
        let settings = ServerSettings::resolve(Some(&file), env_from(&[])).unwrap();
        assert_eq!(settings.bind.to_string(), "127.0.0.1:9000");
        assert_eq!(settings.cors_origins, vec!["https://example.org"]);
        assert_eq!(settings.static_dir, Some(PathBuf::from("frontend")));
        assert_eq!(settings.max_upload_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = ServerConfig {
            bind: Some("127.0.0.1:9000".into()),
            cors_origins: Some(vec!["https://example.org".into()]),
            ..Default::default()
        };
        let env = env_from(&[
            ("CITESCAN_BIND", "0.0.0.0:7000"),
            ("CITESCAN_CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("CITESCAN_STATIC_DIR", "/srv/www"),
        ]);
        let settings = ServerSettings::resolve(Some(&file), env).unwrap();
        assert_eq!(settings.bind.port(), 7000);
        assert_eq!(settings.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(settings.static_dir, Some(PathBuf::from("/srv/www")));
    }

    #[test]
    fn test_invalid_bind() {
        let err = ServerSettings::resolve(None, env_from(&[("CITESCAN_BIND", "nowhere")]))
            .unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }
}
