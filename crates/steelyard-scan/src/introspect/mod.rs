//! Contracts for external size-reporting tools, and adapters for the real ones.
//!
//! The builder only relies on the two traits below. [`SizeTool`] and
//! [`AssetUtil`] implement them by running `size` and `xcrun assetutil`
//! through a shared [`ToolRunner`].

mod assetutil;
mod error;
mod runner;
mod size;

use std::path::Path;
use std::sync::Arc;

use compact_str::CompactString;
use steelyard_core::{ArchiveError, InspectConfig};

pub use assetutil::{AssetUtil, parse_assetutil_output};
pub use error::{IntrospectionError, ParseError};
pub use runner::ToolRunner;
pub use size::{SizeTool, parse_size_output};

/// Reports named segment sizes of an executable.
pub trait BinaryIntrospector: Send + Sync {
    /// Segment sizes of the binary at `path`.
    fn segments(&self, path: &Path) -> Result<SegmentReport, IntrospectionError>;
}

/// Reports the renditions stored in an asset catalog.
pub trait AssetIntrospector: Send + Sync {
    /// Renditions of the catalog at `path`. Records without name and size
    /// are already dropped.
    fn renditions(&self, path: &Path) -> Result<Vec<AssetRecord>, IntrospectionError>;
}

/// Raw segment values of a binary plus the total they add up to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentReport {
    segments: Vec<(CompactString, u64)>,
    total: u64,
}

impl SegmentReport {
    /// Create a report. A zero total cannot be used for proportions.
    pub fn new(segments: Vec<(CompactString, u64)>, total: u64) -> Result<Self, ParseError> {
        if total == 0 {
            return Err(ParseError::MissingTotal);
        }
        Ok(Self { segments, total })
    }

    /// Named segments in reported order.
    pub fn segments(&self) -> &[(CompactString, u64)] {
        &self.segments
    }

    /// Denominator of the proportional split.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Spread `disk_size` over the segments in proportion to their raw values.
    pub fn distribute(&self, disk_size: u64) -> Vec<(CompactString, u64)> {
        let total = self.total as f64;
        self.segments
            .iter()
            .map(|(name, value)| {
                let share = (*value as f64 / total * disk_size as f64).round();
                (name.clone(), share as u64)
            })
            .collect()
    }
}

/// One rendition reported by the asset tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    /// Rendition name, else asset name.
    pub name: Option<CompactString>,
    /// Size on disk in bytes.
    pub size: Option<u64>,
    /// Content digest reported by the tool.
    pub digest: Option<String>,
}

/// The introspectors a builder uses. A missing one disables that expansion.
#[derive(Default)]
pub struct Introspectors {
    pub binary: Option<Box<dyn BinaryIntrospector>>,
    pub assets: Option<Box<dyn AssetIntrospector>>,
}

impl Introspectors {
    /// No introspection at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Run the configured external tools.
    pub fn from_config(config: &InspectConfig) -> Result<Self, ArchiveError> {
        if !config.introspect_binaries && !config.introspect_assets {
            return Ok(Self::none());
        }

        let runner = Arc::new(
            ToolRunner::new(config.tool_timeout())
                .map_err(|source| ArchiveError::ToolRuntime { source })?,
        );

        let binary = config.introspect_binaries.then(|| {
            Box::new(SizeTool::new(Arc::clone(&runner), &config.size_tool))
                as Box<dyn BinaryIntrospector>
        });
        let assets = config.introspect_assets.then(|| {
            Box::new(AssetUtil::new(Arc::clone(&runner), &config.asset_tool))
                as Box<dyn AssetIntrospector>
        });

        Ok(Self { binary, assets })
    }

    /// Use only a binary introspector.
    pub fn with_binary(mut self, introspector: impl BinaryIntrospector + 'static) -> Self {
        self.binary = Some(Box::new(introspector));
        self
    }

    /// Use only an asset introspector.
    pub fn with_assets(mut self, introspector: impl AssetIntrospector + 'static) -> Self {
        self.assets = Some(Box::new(introspector));
        self
    }
}
