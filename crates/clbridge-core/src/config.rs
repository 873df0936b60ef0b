use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Top-level bridge configuration, loaded from clbridge.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Explicit path to the native CLBlast library (None = environment
    /// override, then platform default names)
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Initial log level: off, error, warn, info, debug, trace
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, BridgeError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Load configuration from file if it exists, otherwise return defaults.
    pub fn load_or_default(path: &str) -> Self {
        Self::load(path).unwrap_or_default()
    }
}

/// Returns the default config file path based on platform conventions.
/// Search order:
/// 1. System-wide config: `%PROGRAMDATA%\clbridge\clbridge.toml` (Windows)
///    or `/etc/clbridge/clbridge.toml` (Linux/macOS)
/// 2. Local fallback: `./clbridge.toml`
pub fn default_config_path() -> String {
    #[cfg(windows)]
    {
        let programdata =
            std::env::var("PROGRAMDATA").unwrap_or_else(|_| r"C:\ProgramData".to_string());
        let system_path = format!(r"{}\clbridge\clbridge.toml", programdata);
        if std::path::Path::new(&system_path).exists() {
            return system_path;
        }
    }
    #[cfg(not(windows))]
    {
        let system_path = "/etc/clbridge/clbridge.toml";
        if std::path::Path::new(system_path).exists() {
            return system_path.to_string();
        }
    }
    "clbridge.toml".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_the_search_order_alone() {
        let config = BridgeConfig::default();
        assert!(config.library.path.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parses_a_full_config() {
        let config: BridgeConfig = toml::from_str(
            r#"
            [library]
            path = "/opt/clblast/lib/libclblast.so"

            [logging]
            level = "debug"
            "#,
        )
        .expect("valid config");
        assert_eq!(
            config.library.path.as_deref(),
            Some("/opt/clblast/lib/libclblast.so")
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn partial_config_falls_back_per_section() {
        let config: BridgeConfig = toml::from_str("[logging]\nlevel = \"trace\"\n")
            .expect("valid config");
        assert!(config.library.path.is_none());
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn load_reports_a_missing_file() {
        let err = BridgeConfig::load("/nonexistent/clbridge.toml").unwrap_err();
        assert!(matches!(err, BridgeError::Io(_)));
        // load_or_default swallows it.
        let config = BridgeConfig::load_or_default("/nonexistent/clbridge.toml");
        assert!(config.library.path.is_none());
    }
}
