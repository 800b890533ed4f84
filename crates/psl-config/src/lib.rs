use psl_parser::{GroupMarkers, ParseOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Group delimiters are matched against normalized lines, and must read as
/// comments to anything that doesn't know about groups.
const COMMENT_PREFIX: &str = "// ";
const SECTION_MARKER_PREFIX: &str = "// ===";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid group {name:?}: {reason}")]
    InvalidGroup { name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Named groups recognized inside sections.
    #[serde(default = "default_groups")]
    pub groups: Vec<GroupMarkers>,
}

fn default_groups() -> Vec<GroupMarkers> {
    ParseOptions::default().groups
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groups: default_groups(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/psl-parser");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Options for `psl_parser::parse_with_options`.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            groups: self.groups.clone(),
        }
    }

    /// Checks that every group can actually be recognized by the parser.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, group) in self.groups.iter().enumerate() {
            let invalid = |reason: &str| ConfigError::InvalidGroup {
                name: group.name.clone(),
                reason: reason.to_string(),
            };
            if group.name.is_empty() {
                return Err(invalid("name is empty"));
            }
            for (which, marker) in [("start", &group.start), ("end", &group.end)] {
                if !marker.starts_with(COMMENT_PREFIX) {
                    return Err(invalid(&format!(
                        "{which} marker {marker:?} is not a comment line"
                    )));
                }
                if marker.starts_with(SECTION_MARKER_PREFIX) {
                    return Err(invalid(&format!(
                        "{which} marker {marker:?} looks like a section marker"
                    )));
                }
                if marker.trim() != marker.as_str() {
                    return Err(invalid(&format!(
                        "{which} marker {marker:?} has surrounding whitespace"
                    )));
                }
            }
            if group.start == group.end {
                return Err(invalid("start and end markers are the same"));
            }
            let earlier = &self.groups[..i];
            if earlier.iter().any(|g| g.name == group.name) {
                return Err(invalid("name is used by more than one group"));
            }
            // The parser recognizes the first group whose marker matches.
            for (which, marker) in [("start", &group.start), ("end", &group.end)] {
                if let Some(other) = earlier
                    .iter()
                    .find(|g| g.start == *marker || g.end == *marker)
                {
                    return Err(invalid(&format!(
                        "{which} marker {marker:?} is already used by group {:?}",
                        other.name
                    )));
                }
            }
        }
        Ok(())
    }
}
