//! Indented text rendering of an archive tree.

use std::fmt;

use humansize::{BINARY, format_size};

use crate::node::{ArchiveNode, ResourceKind};

/// Displays a subtree, one `[Type] name (size)` line per node.
///
/// Children are indented two spaces below their parent. Nodes deeper than
/// `max_depth` are left out.
pub struct TreeDescription<'a> {
    root: &'a ArchiveNode,
    max_depth: Option<u32>,
}

impl<'a> TreeDescription<'a> {
    pub fn new(root: &'a ArchiveNode) -> Self {
        Self {
            root,
            max_depth: None,
        }
    }

    /// Stop below `depth`; the root is depth 0.
    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, node: &ArchiveNode, depth: u32) -> fmt::Result {
        let indent = "  ".repeat(depth as usize);
        write!(f, "{indent}[{}] {}", type_label(node), node.name)?;
        match node.size {
            Some(size) => write!(f, " ({})", format_size(size, BINARY))?,
            None => f.write_str(" (unknown size)")?,
        }
        if node.is_duplicate {
            f.write_str(" duplicate")?;
        }
        writeln!(f)?;

        if self.max_depth.is_some_and(|max| depth >= max) {
            return Ok(());
        }
        for child in &node.children {
            self.write_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeDescription<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, self.root, 0)
    }
}

fn type_label(node: &ArchiveNode) -> String {
    if let Some(content) = &node.content_type {
        return content.to_string();
    }
    match node.resource {
        ResourceKind::Directory => "Directory",
        ResourceKind::RegularFile => "File",
        ResourceKind::Synthetic => "Component",
        ResourceKind::Other => "Other",
    }
    .to_string()
}
