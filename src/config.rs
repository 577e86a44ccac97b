use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SymscopeError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Engine behavior (refresh debounce, etc.)
    pub engine: EngineConfig,

    /// Outline extraction settings
    pub outline: OutlineConfig,

    /// Presentation settings
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Quiet period before a triggered refresh actually runs, in milliseconds
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineConfig {
    /// Maximum file size to analyze (in bytes)
    pub max_file_size: usize,

    /// File extensions handled by the bundled outline provider
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Prefix symbol labels with priority/attribute glyphs
    pub show_glyphs: bool,

    /// Append child counts to group labels
    pub show_counts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig { debounce_ms: 250 },
            outline: OutlineConfig {
                max_file_size: 1024 * 1024, // 1MB
                extensions: vec![
                    "vue".to_string(),
                    "jsx".to_string(),
                    "tsx".to_string(),
                    "js".to_string(),
                    "ts".to_string(),
                ],
            },
            display: DisplayConfig {
                show_glyphs: true,
                show_counts: true,
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| SymscopeError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| SymscopeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                // Try common config file locations
                let candidates = ["Symscope.toml", "symscope.toml", ".symscope.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.engine.debounce_ms, 250);
        assert_eq!(parsed.outline.max_file_size, 1024 * 1024);
        assert!(parsed.outline.extensions.contains(&"vue".to_string()));
    }

    #[test]
    fn missing_config_file_falls_back_to_default() {
        let config = Config::load_or_default(Some("/nonexistent/symscope.toml")).unwrap();
        assert_eq!(config.engine.debounce_ms, 250);
    }
}
