//! Archive tree container and statistics.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::config::InspectConfig;
use crate::error::InspectWarning;
use crate::node::{ArchiveNode, ResourceKind};

/// Summary statistics for a built tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeStats {
    /// Total size in bytes.
    pub total_size: u64,
    /// Total number of regular files.
    pub total_files: u64,
    /// Total number of directories.
    pub total_dirs: u64,
    /// Executables recognized by their magic number.
    pub binaries: u64,
    /// Asset catalog files.
    pub asset_catalogs: u64,
    /// Segment and rendition nodes synthesized by introspectors.
    pub synthetic_nodes: u64,
    /// Maximum depth reached.
    pub max_depth: u32,
    /// Largest file (path, size).
    pub largest_file: Option<(PathBuf, u64)>,
}

impl TreeStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect statistics from an aggregated tree.
    pub fn from_root(root: &ArchiveNode) -> Self {
        let mut stats = Self::new();
        stats.visit(root, 0);
        stats.total_size = root.bytes();
        stats
    }

    fn visit(&mut self, node: &ArchiveNode, depth: u32) {
        match node.resource {
            ResourceKind::Directory => self.record_dir(depth),
            ResourceKind::RegularFile => {
                self.record_file(node.path.clone(), node.bytes(), depth);
                match &node.content_type {
                    Some(content) if content.is_binary() => self.binaries += 1,
                    Some(content) if content.is_asset_catalog() => self.asset_catalogs += 1,
                    _ => {}
                }
            }
            ResourceKind::Synthetic => self.record_synthetic(depth),
            ResourceKind::Other => {}
        }

        for child in &node.children {
            self.visit(child, depth + 1);
        }
    }

    /// Update stats with a file entry.
    pub fn record_file(&mut self, path: PathBuf, size: u64, depth: u32) {
        self.total_files += 1;
        self.max_depth = self.max_depth.max(depth);

        if self.largest_file.as_ref().is_none_or(|(_, s)| size > *s) {
            self.largest_file = Some((path, size));
        }
    }

    /// Record a directory.
    pub fn record_dir(&mut self, depth: u32) {
        self.total_dirs += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    /// Record a synthetic node.
    pub fn record_synthetic(&mut self, depth: u32) {
        self.synthetic_nodes += 1;
        self.max_depth = self.max_depth.max(depth);
    }
}

/// Complete archive tree with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveTree {
    /// Root node of the tree.
    pub root: ArchiveNode,

    /// Directory the tree was built from.
    pub root_path: PathBuf,

    /// When this tree was built.
    pub inspected_at: SystemTime,

    /// Duration of the build.
    pub build_duration: Duration,

    /// Configuration used.
    pub config: InspectConfig,

    /// Summary statistics.
    pub stats: TreeStats,

    /// Warnings encountered during the build.
    pub warnings: Vec<InspectWarning>,
}

impl ArchiveTree {
    /// Create a new archive tree.
    pub fn new(
        root: ArchiveNode,
        root_path: PathBuf,
        config: InspectConfig,
        stats: TreeStats,
        build_duration: Duration,
        warnings: Vec<InspectWarning>,
    ) -> Self {
        Self {
            root,
            root_path,
            inspected_at: SystemTime::now(),
            build_duration,
            config,
            stats,
            warnings,
        }
    }

    /// Get the total size of the tree.
    pub fn total_size(&self) -> u64 {
        self.root.bytes()
    }

    /// Get the total number of files.
    pub fn total_files(&self) -> u64 {
        self.stats.total_files
    }

    /// Get the total number of directories.
    pub fn total_dirs(&self) -> u64 {
        self.stats.total_dirs
    }

    /// Check if there were any warnings during the build.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::Checksum;
    use crate::content::{BinaryFormat, ContentType};

    #[test]
    fn test_tree_stats_default() {
        let stats = TreeStats::default();
        assert_eq!(stats.total_size, 0);
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_dirs, 0);
    }

    #[test]
    fn test_tree_stats_record_file() {
        let mut stats = TreeStats::new();
        stats.record_file(PathBuf::from("/test/file.txt"), 1024, 2);
        stats.record_file(PathBuf::from("/test/small.txt"), 10, 1);

        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(
            stats.largest_file,
            Some((PathBuf::from("/test/file.txt"), 1024))
        );
    }

    #[test]
    fn test_tree_stats_from_root() {
        let mut binary = ArchiveNode::new_file(
            "/app/App",
            100,
            Some(ContentType::Binary(BinaryFormat::MachO)),
        );
        binary.children.push(ArchiveNode::new_synthetic(
            "/app/App/__TEXT",
            "__TEXT",
            ContentType::BinarySection,
            Some(100),
            Checksum::of_bytes("App/__TEXT"),
        ));
        let mut root = ArchiveNode::new_directory("/app", None);
        root.children.push(binary);
        root.children.push(ArchiveNode::new_directory("/app/empty", None));
        root.aggregate_sizes();

        let stats = TreeStats::from_root(&root);
        assert_eq!(stats.total_size, 100);
        assert_eq!(stats.total_files, 1);
        assert_eq!(stats.total_dirs, 2);
        assert_eq!(stats.binaries, 1);
        assert_eq!(stats.synthetic_nodes, 1);
        assert_eq!(stats.max_depth, 2);
    }
}
