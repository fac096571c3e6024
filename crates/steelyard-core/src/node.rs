//! Archive node types.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;
use crate::content::ContentType;

/// Unique identifier for a node within a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Create a new NodeId from a u64.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Where a node comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Directory on disk.
    Directory,
    /// Regular file on disk.
    RegularFile,
    /// Sub-component synthesized from a file by an introspector.
    Synthetic,
    /// Symbolic links, sockets, devices and the like.
    Other,
}

/// A single element of the content tree.
///
/// Real filesystem entries and synthetic sub-components share this one type;
/// `resource` tells them apart. Each node owns its children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveNode {
    /// Unique identifier, assigned in pre-order once the tree is built.
    pub id: NodeId,

    /// Display name (file name, segment name or rendition name).
    pub name: CompactString,

    /// Identity path. Synthetic nodes live below the file they came from.
    pub path: PathBuf,

    /// Provenance of the node.
    pub resource: ResourceKind,

    /// Semantic classification, if recognized.
    pub content_type: Option<ContentType>,

    /// Size in bytes; `None` when unknown. Authoritative after aggregation.
    pub size: Option<u64>,

    /// Content checksum.
    pub checksum: Option<Checksum>,

    /// Set when another node shares this node's checksum.
    pub is_duplicate: bool,

    /// Children in insertion order.
    pub children: Vec<ArchiveNode>,
}

impl ArchiveNode {
    fn new(
        path: PathBuf,
        name: CompactString,
        resource: ResourceKind,
        content_type: Option<ContentType>,
        size: Option<u64>,
    ) -> Self {
        Self {
            id: NodeId::default(),
            name,
            path,
            resource,
            content_type,
            size,
            checksum: None,
            is_duplicate: false,
            children: Vec::new(),
        }
    }

    /// Create a directory node.
    pub fn new_directory(path: impl Into<PathBuf>, content_type: Option<ContentType>) -> Self {
        let path = path.into();
        let name = file_name(&path);
        Self::new(path, name, ResourceKind::Directory, content_type, Some(0))
    }

    /// Create a regular file node.
    pub fn new_file(
        path: impl Into<PathBuf>,
        size: u64,
        content_type: Option<ContentType>,
    ) -> Self {
        let path = path.into();
        let name = file_name(&path);
        Self::new(path, name, ResourceKind::RegularFile, content_type, Some(size))
    }

    /// Create a node for an entry that is neither file nor directory.
    pub fn new_other(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = file_name(&path);
        Self::new(path, name, ResourceKind::Other, None, None)
    }

    /// Create a synthetic leaf.
    pub fn new_synthetic(
        path: impl Into<PathBuf>,
        name: impl Into<CompactString>,
        content_type: ContentType,
        size: Option<u64>,
        checksum: Checksum,
    ) -> Self {
        let mut node = Self::new(
            path.into(),
            name.into(),
            ResourceKind::Synthetic,
            Some(content_type),
            size,
        );
        node.checksum = Some(checksum);
        node
    }

    /// Check if this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.resource == ResourceKind::Directory
    }

    /// Check if this node is a regular file.
    pub fn is_file(&self) -> bool {
        self.resource == ResourceKind::RegularFile
    }

    /// Check if this node was synthesized by an introspector.
    pub fn is_synthetic(&self) -> bool {
        self.resource == ResourceKind::Synthetic
    }

    /// Check if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Get the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Size in bytes, counting an unknown size as zero.
    pub fn bytes(&self) -> u64 {
        self.size.unwrap_or(0)
    }

    /// Recompute sizes bottom-up.
    ///
    /// A leaf keeps its own size. An internal node's size becomes the sum of
    /// its children's aggregated sizes; children of unknown size contribute
    /// nothing.
    pub fn aggregate_sizes(&mut self) -> Option<u64> {
        if self.children.is_empty() {
            return self.size;
        }

        let total = self
            .children
            .iter_mut()
            .filter_map(ArchiveNode::aggregate_sizes)
            .sum::<u64>();
        self.size = Some(total);
        self.size
    }

    /// Number the subtree in pre-order, starting at `next`.
    pub fn assign_ids(&mut self, next: &mut u64) {
        self.id = NodeId::new(*next);
        *next += 1;
        for child in &mut self.children {
            child.assign_ids(next);
        }
    }

    /// Iterate over this node and all its descendants in pre-order.
    pub fn iter(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Find the node at `path` within this subtree.
    pub fn find(&self, path: &Path) -> Option<&ArchiveNode> {
        self.iter().find(|node| node.path == path)
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a ArchiveNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a ArchiveNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

fn file_name(path: &Path) -> CompactString {
    path.file_name()
        .map(|n| CompactString::new(n.to_string_lossy()))
        .unwrap_or_else(|| CompactString::new(path.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, size: Option<u64>) -> ArchiveNode {
        let mut node = ArchiveNode::new_file(format!("/root/{name}"), 0, None);
        node.size = size;
        node
    }

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.0, 42);
    }

    #[test]
    fn test_file_node_creation() {
        let node = ArchiveNode::new_file("/root/Info.plist", 1024, None);
        assert!(node.is_file());
        assert!(!node.is_dir());
        assert_eq!(node.name, "Info.plist");
        assert_eq!(node.size, Some(1024));
        assert!(!node.is_duplicate);
    }

    #[test]
    fn test_directory_node_creation() {
        let node = ArchiveNode::new_directory("/root/Payload", None);
        assert!(node.is_dir());
        assert!(node.is_leaf());
        assert_eq!(node.size, Some(0));
    }

    #[test]
    fn test_aggregate_sums_children() {
        let mut root = ArchiveNode::new_directory("/root", None);
        let mut sub = ArchiveNode::new_directory("/root/sub", None);
        sub.children.push(leaf("a", Some(10)));
        sub.children.push(leaf("b", Some(5)));
        root.children.push(sub);
        root.children.push(leaf("c", Some(7)));

        assert_eq!(root.aggregate_sizes(), Some(22));
        assert_eq!(root.children[0].size, Some(15));
    }

    #[test]
    fn test_aggregate_skips_unknown_leaves() {
        let mut root = ArchiveNode::new_directory("/root", None);
        root.children.push(leaf("known", Some(3)));
        root.children.push(ArchiveNode::new_other("/root/link"));

        assert_eq!(root.aggregate_sizes(), Some(3));
        assert_eq!(root.children[1].size, None);
    }

    #[test]
    fn test_aggregate_overwrites_file_with_children() {
        let mut binary = ArchiveNode::new_file("/root/App", 2001, None);
        binary.children.push(leaf("__TEXT", Some(1400)));
        binary.children.push(leaf("__DATA", Some(600)));

        assert_eq!(binary.aggregate_sizes(), Some(2000));
    }

    #[test]
    fn test_assign_ids_pre_order() {
        let mut root = ArchiveNode::new_directory("/root", None);
        let mut sub = ArchiveNode::new_directory("/root/sub", None);
        sub.children.push(leaf("a", Some(1)));
        root.children.push(sub);
        root.children.push(leaf("b", Some(1)));

        let mut next = 0;
        root.assign_ids(&mut next);

        let ids: Vec<(String, u64)> = root.iter().map(|n| (n.name.to_string(), n.id.0)).collect();
        assert_eq!(
            ids,
            vec![
                ("root".to_string(), 0),
                ("sub".to_string(), 1),
                ("a".to_string(), 2),
                ("b".to_string(), 3),
            ]
        );
        assert_eq!(next, 4);
    }

    #[test]
    fn test_find() {
        let mut root = ArchiveNode::new_directory("/root", None);
        root.children.push(leaf("a", Some(1)));

        assert!(root.find(Path::new("/root/a")).is_some());
        assert!(root.find(Path::new("/root/missing")).is_none());
    }
}
