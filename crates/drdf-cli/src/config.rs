use std::path::Path;

use anyhow::Context;
use drdf_format::ReadConfig;
use serde::{Deserialize, Serialize};

/// Settings loaded from `--config`.
///
/// ```toml
/// [read]
/// duplicates = "reject"
/// max_file_size = 1073741824
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub read: ReadConfig,
}

impl CliConfig {
    /// Load from `path`, or defaults when no file was given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drdf_format::DuplicatePolicy;

    #[test]
    fn no_file_is_default() {
        assert_eq!(CliConfig::load(None).unwrap(), CliConfig::default());
    }

    #[test]
    fn parses_read_section() {
        let config = CliConfig::parse("[read]\nduplicates = \"reject\"\nmax_file_size = 1024\n").unwrap();
        assert_eq!(config.read.duplicates, DuplicatePolicy::Reject);
        assert_eq!(config.read.max_file_size, 1024);
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drdf.toml");
        std::fs::write(&path, "[read]\nmax_file_size = 64\n").unwrap();
        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.read.max_file_size, 64);
        assert_eq!(config.read.duplicates, DuplicatePolicy::Merge);
    }

    #[test]
    fn missing_file_names_path() {
        let err = CliConfig::load(Some(Path::new("/nonexistent/drdf.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/drdf.toml"));
    }

    #[test]
    fn bad_policy_rejected() {
        assert!(CliConfig::parse("[read]\nduplicates = \"maybe\"\n").is_err());
    }
}
