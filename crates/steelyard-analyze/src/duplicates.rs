//! Duplicate content detection over checksummed archive trees.
//!
//! Works in three steps:
//! 1. Index every node by checksum
//! 2. Flag every member of a group with two or more nodes
//! 3. Collect groups, either all of them or only the shallowest ones
//!
//! Directories take part like files, so a duplicated subtree is reported as
//! one group instead of one group per file inside it.

use std::collections::HashSet;
use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use steelyard_core::{ArchiveNode, ArchiveTree, Checksum};

use crate::index::{ChecksumIndex, IndexedNode};

/// Configuration for duplicate reporting.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct DuplicateConfig {
    /// Skip groups whose members are smaller than this.
    #[builder(default = "0")]
    pub min_size: u64,

    /// Maximum number of groups to return (0 = unlimited).
    #[builder(default = "0")]
    pub max_groups: usize,

    /// Report only the shallowest duplicates, hiding nested ones.
    #[builder(default = "true")]
    pub top_level_only: bool,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            min_size: 0,
            max_groups: 0,
            top_level_only: true,
        }
    }
}

impl DuplicateConfig {
    /// Create a new config builder.
    pub fn builder() -> DuplicateConfigBuilder {
        DuplicateConfigBuilder::default()
    }
}

/// Nodes sharing one checksum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Duplicate {
    /// Checksum shared by all members.
    pub checksum: Checksum,

    /// Size of one member in bytes.
    pub size: u64,

    /// Every node carrying the checksum, in tree order.
    pub nodes: Vec<IndexedNode>,

    /// Wasted space: size * (count - 1).
    pub wasted_bytes: u64,
}

impl Duplicate {
    fn new(checksum: &Checksum, members: &[IndexedNode]) -> Self {
        let size = members.first().map(|m| m.size).unwrap_or(0);
        Self {
            checksum: checksum.clone(),
            size,
            nodes: members.to_vec(),
            wasted_bytes: size * (members.len() as u64).saturating_sub(1),
        }
    }

    /// Number of nodes in the group.
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    /// Paths of all members.
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.nodes.iter().map(|n| &n.path)
    }
}

/// Set `is_duplicate` on every node whose checksum is shared.
///
/// Nodes without a checksum, or with a unique one, are cleared. Returns the
/// number of nodes flagged.
pub fn mark_duplicates(root: &mut ArchiveNode, index: &ChecksumIndex) -> u64 {
    let duplicated = root
        .checksum
        .as_ref()
        .is_some_and(|checksum| index.is_duplicated(checksum));
    root.is_duplicate = duplicated;

    let mut marked = u64::from(duplicated);
    for child in &mut root.children {
        marked += mark_duplicates(child, index);
    }
    marked
}

/// Shallowest duplicate groups of the tree.
///
/// Walks top-down. A node whose checksum is shared yields its group, once per
/// checksum, and its children are not visited.
pub fn top_level_duplicates(root: &ArchiveNode, index: &ChecksumIndex) -> Vec<Duplicate> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    collect_top_level(root, index, &mut seen, &mut found);
    found
}

fn collect_top_level<'a>(
    node: &'a ArchiveNode,
    index: &ChecksumIndex,
    seen: &mut HashSet<&'a Checksum>,
    found: &mut Vec<Duplicate>,
) {
    if let Some(checksum) = &node.checksum {
        let members = index.get(checksum);
        if members.len() > 1 {
            if seen.insert(checksum) {
                found.push(Duplicate::new(checksum, members));
            }
            return;
        }
    }

    for child in &node.children {
        collect_top_level(child, index, seen, found);
    }
}

/// Every duplicate group, nested or not.
pub fn all_duplicates(index: &ChecksumIndex) -> Vec<Duplicate> {
    index
        .duplicated()
        .map(|(checksum, members)| Duplicate::new(checksum, members))
        .collect()
}

/// Results from duplicate analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Reported groups, sorted by wasted space descending.
    pub groups: Vec<Duplicate>,

    /// Total size of all members of the reported groups.
    pub total_duplicate_size: u64,

    /// Total wasted space of the reported groups.
    pub total_wasted_space: u64,

    /// Number of nodes with a checksum.
    pub nodes_indexed: u64,

    /// Number of nodes flagged as duplicates anywhere in the tree.
    pub nodes_with_duplicates: u64,

    /// Number of reported groups.
    pub group_count: usize,
}

impl DuplicateReport {
    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Get total number of member nodes across reported groups.
    pub fn total_duplicate_nodes(&self) -> usize {
        self.groups.iter().map(Duplicate::count).sum()
    }
}

/// Runs indexing, marking and reporting over a tree.
pub struct DuplicateAnalyzer {
    config: DuplicateConfig,
}

impl DuplicateAnalyzer {
    /// Create an analyzer with default config.
    pub fn new() -> Self {
        Self {
            config: DuplicateConfig::default(),
        }
    }

    /// Create an analyzer with custom config.
    pub fn with_config(config: DuplicateConfig) -> Self {
        Self { config }
    }

    /// Flag duplicates in `tree` and report them.
    pub fn analyze(&self, tree: &mut ArchiveTree) -> DuplicateReport {
        self.analyze_node(&mut tree.root)
    }

    /// Flag duplicates below `root` and report them.
    pub fn analyze_node(&self, root: &mut ArchiveNode) -> DuplicateReport {
        let index = ChecksumIndex::build(root);
        let nodes_with_duplicates = mark_duplicates(root, &index);

        let mut groups = if self.config.top_level_only {
            top_level_duplicates(root, &index)
        } else {
            all_duplicates(&index)
        };
        groups.retain(|g| g.size >= self.config.min_size);

        // Stable, so equal waste keeps tree order.
        groups.sort_by(|a, b| b.wasted_bytes.cmp(&a.wasted_bytes));

        if self.config.max_groups > 0 && groups.len() > self.config.max_groups {
            groups.truncate(self.config.max_groups);
        }

        let total_duplicate_size = groups.iter().map(|g| g.size * g.count() as u64).sum();
        let total_wasted_space = groups.iter().map(|g| g.wasted_bytes).sum();
        let group_count = groups.len();

        debug!(
            indexed = index.node_count(),
            flagged = nodes_with_duplicates,
            groups = group_count,
            "duplicate analysis finished"
        );

        DuplicateReport {
            groups,
            total_duplicate_size,
            total_wasted_space,
            nodes_indexed: index.node_count(),
            nodes_with_duplicates,
            group_count,
        }
    }
}

impl Default for DuplicateAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, content: &str) -> ArchiveNode {
        let mut node = ArchiveNode::new_file(path, content.len() as u64, None);
        node.checksum = Some(Checksum::of_bytes(content));
        node
    }

    fn dir(path: &str, children: Vec<ArchiveNode>) -> ArchiveNode {
        let mut node = ArchiveNode::new_directory(path, None);
        node.checksum = Checksum::combine(children.iter().filter_map(|c| c.checksum.as_ref()));
        node.children = children;
        node
    }

    /// Two identical framework directories plus one unique file.
    fn sample() -> ArchiveNode {
        let mut root = dir(
            "/r",
            vec![
                dir(
                    "/r/A.framework",
                    vec![file("/r/A.framework/bin", "code"), file("/r/A.framework/res", "data")],
                ),
                dir(
                    "/r/B.framework",
                    vec![file("/r/B.framework/bin", "code"), file("/r/B.framework/res", "data")],
                ),
                file("/r/unique", "unique!"),
            ],
        );
        root.aggregate_sizes();
        root
    }

    #[test]
    fn test_config_builder() {
        let config = DuplicateConfig::builder()
            .min_size(2048u64)
            .max_groups(5usize)
            .top_level_only(false)
            .build()
            .unwrap();

        assert_eq!(config.min_size, 2048);
        assert_eq!(config.max_groups, 5);
        assert!(!config.top_level_only);
        assert!(DuplicateConfig::default().top_level_only);
    }

    #[test]
    fn test_mark_flags_whole_subtrees() {
        let mut root = sample();
        let index = ChecksumIndex::build(&root);
        let marked = mark_duplicates(&mut root, &index);

        // Both directories and their four files.
        assert_eq!(marked, 6);
        assert!(!root.is_duplicate);
        assert!(root.children[0].is_duplicate);
        assert!(root.children[1].children[0].is_duplicate);
        assert!(!root.children[2].is_duplicate);
    }

    #[test]
    fn test_mark_is_idempotent() {
        let mut root = sample();
        let index = ChecksumIndex::build(&root);
        let first = mark_duplicates(&mut root, &index);
        let second = mark_duplicates(&mut root, &index);
        assert_eq!(first, second);
    }

    #[test]
    fn test_top_level_suppresses_nested() {
        let root = sample();
        let index = ChecksumIndex::build(&root);
        let groups = top_level_duplicates(&root, &index);

        assert_eq!(groups.len(), 1);
        let names: Vec<&str> = groups[0].nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["A.framework", "B.framework"]);
        assert_eq!(groups[0].size, 8);
        assert_eq!(groups[0].wasted_bytes, 8);
    }

    #[test]
    fn test_all_includes_nested() {
        let root = sample();
        let index = ChecksumIndex::build(&root);
        let groups = all_duplicates(&index);

        // The directories, "code" and "data".
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.count() == 2));
    }

    #[test]
    fn test_analyzer_report_sorted_and_limited() {
        let analyzer = DuplicateAnalyzer::with_config(
            DuplicateConfig::builder()
                .top_level_only(false)
                .max_groups(2usize)
                .build()
                .unwrap(),
        );
        let mut root = sample();
        let report = analyzer.analyze_node(&mut root);

        assert_eq!(report.group_count, 2);
        assert_eq!(report.groups[0].size, 8);
        assert!(report.groups[0].wasted_bytes >= report.groups[1].wasted_bytes);
        assert_eq!(report.nodes_with_duplicates, 6);
        assert_eq!(report.nodes_indexed, 8);
    }

    #[test]
    fn test_analyzer_min_size() {
        let analyzer = DuplicateAnalyzer::with_config(
            DuplicateConfig::builder()
                .top_level_only(false)
                .min_size(5u64)
                .build()
                .unwrap(),
        );
        let mut root = sample();
        let report = analyzer.analyze_node(&mut root);

        assert_eq!(report.group_count, 1);
        assert_eq!(report.total_wasted_space, 8);
        assert_eq!(report.total_duplicate_size, 16);
    }

    #[test]
    fn test_no_duplicates() {
        let mut root = dir("/r", vec![file("/r/a", "a"), file("/r/b", "b")]);
        let report = DuplicateAnalyzer::new().analyze_node(&mut root);

        assert!(!report.has_duplicates());
        assert_eq!(report.total_duplicate_nodes(), 0);
        assert!(root.iter().all(|n| !n.is_duplicate));
    }
}
