//! Inspection configuration types.

use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for building an archive tree.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct InspectConfig {
    /// Root of the extracted bundle.
    pub root: PathBuf,

    /// Break executables down into segments with the size tool.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub introspect_binaries: bool,

    /// Break asset catalogs down into renditions with the asset tool.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub introspect_assets: bool,

    /// Program reporting segment sizes of a binary.
    #[builder(default = "default_size_tool()")]
    #[serde(default = "default_size_tool")]
    pub size_tool: PathBuf,

    /// Program reporting rendition sizes of an asset catalog.
    #[builder(default = "default_asset_tool()")]
    #[serde(default = "default_asset_tool")]
    pub asset_tool: PathBuf,

    /// Seconds to wait for an external tool before giving up on it.
    #[builder(default = "30")]
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    /// Number of threads for building (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Include hidden files (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,
}

fn default_true() -> bool {
    true
}

fn default_size_tool() -> PathBuf {
    PathBuf::from("size")
}

fn default_asset_tool() -> PathBuf {
    PathBuf::from("xcrun")
}

fn default_tool_timeout_secs() -> u64 {
    30
}

impl InspectConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err("Root path cannot be empty".to_string());
            }
            None => return Err("Root path is required".to_string()),
            _ => {}
        }
        if self.tool_timeout_secs == Some(0) {
            return Err("Tool timeout must be at least one second".to_string());
        }
        Ok(())
    }
}

impl InspectConfig {
    /// Create a new inspect config builder.
    pub fn builder() -> InspectConfigBuilder {
        InspectConfigBuilder::default()
    }

    /// Create a simple config for inspecting a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            introspect_binaries: true,
            introspect_assets: true,
            size_tool: default_size_tool(),
            asset_tool: default_asset_tool(),
            tool_timeout_secs: default_tool_timeout_secs(),
            threads: 0,
            include_hidden: true,
        }
    }

    /// Bounded wait applied to each external tool invocation.
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs.max(1))
    }

    /// Check if hidden files should be skipped.
    pub fn should_skip_hidden(&self, name: &str) -> bool {
        !self.include_hidden && name.starts_with('.')
    }
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = InspectConfig::builder()
            .root("/tmp/Payload")
            .threads(4usize)
            .introspect_assets(false)
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/tmp/Payload"));
        assert_eq!(config.threads, 4);
        assert!(!config.introspect_assets);
        assert!(config.introspect_binaries);
        assert_eq!(config.size_tool, PathBuf::from("size"));
    }

    #[test]
    fn test_config_builder_requires_root() {
        assert!(InspectConfig::builder().build().is_err());
        assert!(InspectConfig::builder().root("").build().is_err());
    }

    #[test]
    fn test_config_builder_rejects_zero_timeout() {
        let result = InspectConfig::builder()
            .root("/tmp")
            .tool_timeout_secs(0u64)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_simple() {
        let config = InspectConfig::new("/tmp/Payload");
        assert_eq!(config.tool_timeout(), Duration::from_secs(30));
        assert_eq!(config.asset_tool, PathBuf::from("xcrun"));
    }

    #[test]
    fn test_should_skip_hidden() {
        let mut config = InspectConfig::new("/test");
        assert!(!config.should_skip_hidden(".DS_Store"));

        config.include_hidden = false;
        assert!(config.should_skip_hidden(".DS_Store"));
        assert!(!config.should_skip_hidden("Info.plist"));
    }
}
