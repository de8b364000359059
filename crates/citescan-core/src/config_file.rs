use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extraction: Option<ExtractionConfig>,
    pub server: Option<ServerConfig>,
}

/// Tunables for the extraction pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Sentences scanned on each side of a keyword sentence.
    pub window_radius: Option<usize>,
    /// Require the keyword to match on word boundaries.
    pub whole_word: Option<bool>,
    /// Drop short all-uppercase paragraphs (titles, running heads).
    pub skip_uppercase_headings: Option<bool>,
    /// Regex replacing the built-in references-section heading pattern.
    pub section_header_regex: Option<String>,
    /// Extra abbreviations whose trailing period never ends a sentence.
    pub abbreviations: Option<Vec<String>>,
    /// Extra capitalized words that are never treated as an author surname.
    pub non_author_words: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub cors_origins: Option<Vec<String>>,
    pub static_dir: Option<String>,
    pub max_upload_mb: Option<u64>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Platform config directory path: `<config_dir>/citescan/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("citescan").join("config.toml"))
}

/// Load config by cascading CWD `.citescan.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".citescan.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    if !path.exists() {
        return None;
    }
    match load_explicit(path) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable config file");
            None
        }
    }
}

/// Load a config the user asked for by name; unlike [`load_from_path`],
/// a missing or malformed file is an error.
pub fn load_explicit(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn pick<S, T: Clone>(
    overlay: Option<&S>,
    base: Option<&S>,
    field: impl Fn(&S) -> Option<T>,
) -> Option<T> {
    overlay.and_then(&field).or_else(|| base.and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (be, oe) = (base.extraction.as_ref(), overlay.extraction.as_ref());
    let (bs, os) = (base.server.as_ref(), overlay.server.as_ref());

    ConfigFile {
        extraction: Some(ExtractionConfig {
            window_radius: pick(oe, be, |e| e.window_radius),
            whole_word: pick(oe, be, |e| e.whole_word),
            skip_uppercase_headings: pick(oe, be, |e| e.skip_uppercase_headings),
            section_header_regex: pick(oe, be, |e| e.section_header_regex.clone()),
            abbreviations: pick(oe, be, |e| e.abbreviations.clone()),
            non_author_words: pick(oe, be, |e| e.non_author_words.clone()),
        }),
        server: Some(ServerConfig {
            bind: pick(os, bs, |s| s.bind.clone()),
            cors_origins: pick(os, bs, |s| s.cors_origins.clone()),
            static_dir: pick(os, bs, |s| s.static_dir.clone()),
            max_upload_mb: pick(os, bs, |s| s.max_upload_mb),
        }),
    }
}
