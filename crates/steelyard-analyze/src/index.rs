//! Checksum index over a finished archive tree.

use std::path::PathBuf;

use compact_str::CompactString;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use steelyard_core::{ArchiveNode, Checksum, NodeId};

/// Snapshot of a node stored in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedNode {
    pub id: NodeId,
    pub name: CompactString,
    pub path: PathBuf,
    /// Aggregated size; unknown counts as zero.
    pub size: u64,
    /// Distance from the indexed root.
    pub depth: u32,
}

impl IndexedNode {
    fn new(node: &ArchiveNode, depth: u32) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            path: node.path.clone(),
            size: node.bytes(),
            depth,
        }
    }
}

/// Mapping from checksum to every node carrying it.
///
/// A derived view: it holds copies, not references, so the tree can be
/// mutated once the index is built. Groups and their members are ordered as
/// a pre-order scan of the tree would meet them.
#[derive(Debug, Clone, Default)]
pub struct ChecksumIndex {
    groups: IndexMap<Checksum, Vec<IndexedNode>>,
    nodes: u64,
}

impl ChecksumIndex {
    /// Index every node of `root` that has a checksum.
    ///
    /// Each child subtree of the root is indexed as its own shard in
    /// parallel; shards are merged in child order.
    pub fn build(root: &ArchiveNode) -> Self {
        let mut index = Self::default();
        index.insert(root, 0);

        let shards: Vec<ChecksumIndex> = root
            .children
            .par_iter()
            .map(|child| {
                let mut shard = Self::default();
                shard.collect(child, 1);
                shard
            })
            .collect();

        for shard in shards {
            index.merge(shard);
        }
        index
    }

    fn collect(&mut self, node: &ArchiveNode, depth: u32) {
        self.insert(node, depth);
        for child in &node.children {
            self.collect(child, depth + 1);
        }
    }

    fn insert(&mut self, node: &ArchiveNode, depth: u32) {
        if let Some(checksum) = &node.checksum {
            self.groups
                .entry(checksum.clone())
                .or_default()
                .push(IndexedNode::new(node, depth));
            self.nodes += 1;
        }
    }

    fn merge(&mut self, other: ChecksumIndex) {
        for (checksum, members) in other.groups {
            self.groups.entry(checksum).or_default().extend(members);
        }
        self.nodes += other.nodes;
    }

    /// Nodes carrying `checksum`.
    pub fn get(&self, checksum: &Checksum) -> &[IndexedNode] {
        self.groups.get(checksum).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether at least two nodes carry `checksum`.
    pub fn is_duplicated(&self, checksum: &Checksum) -> bool {
        self.get(checksum).len() > 1
    }

    /// Groups with two or more members, in index order.
    pub fn duplicated(&self) -> impl Iterator<Item = (&Checksum, &[IndexedNode])> {
        self.groups
            .iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(checksum, members)| (checksum, members.as_slice()))
    }

    /// Number of distinct checksums.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if nothing was indexed.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of nodes indexed.
    pub fn node_count(&self) -> u64 {
        self.nodes
    }
}
