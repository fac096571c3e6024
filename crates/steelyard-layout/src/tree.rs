//! Recursive treemap layout of archive trees.

use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use steelyard_core::{ArchiveNode, NodeId};

use crate::geometry::Rect;
use crate::squarify::{Partitionable, SquarifyPartitioner};

impl Partitionable for ArchiveNode {
    fn size(&self) -> f64 {
        self.bytes() as f64
    }

    fn segments(&self) -> &[Self] {
        &self.children
    }
}

/// Limits for [`layout_tree`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Deepest level laid out; the root is level 0.
    pub max_depth: u32,

    /// Children of rectangles smaller than this are not laid out.
    pub min_area: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            max_depth: 3,
            min_area: 0.0,
        }
    }
}

/// One placed node of a treemap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRect {
    pub id: NodeId,
    pub name: CompactString,
    pub path: PathBuf,
    pub depth: u32,
    pub size: u64,
    pub rect: Rect,
    pub is_duplicate: bool,
}

impl LayoutRect {
    fn new(node: &ArchiveNode, depth: u32, rect: Rect) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            path: node.path.clone(),
            depth,
            size: node.bytes(),
            rect,
            is_duplicate: node.is_duplicate,
        }
    }
}

/// Lay `root` and its descendants out inside `frame`.
///
/// The root takes the whole frame. Each node's children are partitioned
/// inside its rectangle, down to `options.max_depth`. Output is in pre-order.
pub fn layout_tree(root: &ArchiveNode, frame: Rect, options: &LayoutOptions) -> Vec<LayoutRect> {
    let mut out = Vec::new();
    place(&SquarifyPartitioner::new(), root, frame, 0, options, &mut out);
    out
}

fn place(
    partitioner: &SquarifyPartitioner,
    node: &ArchiveNode,
    rect: Rect,
    depth: u32,
    options: &LayoutOptions,
    out: &mut Vec<LayoutRect>,
) {
    out.push(LayoutRect::new(node, depth, rect));

    if depth >= options.max_depth || rect.is_empty() || rect.area() < options.min_area {
        return;
    }
    for partition in partitioner.partition(node, rect) {
        place(partitioner, partition.item, partition.rect, depth + 1, options, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ArchiveNode {
        let mut app = ArchiveNode::new_directory("/r/App.app", None);
        app.children.push(ArchiveNode::new_file("/r/App.app/App", 60, None));
        app.children.push(ArchiveNode::new_file("/r/App.app/Info.plist", 20, None));

        let mut root = ArchiveNode::new_directory("/r", None);
        root.children.push(app);
        root.children.push(ArchiveNode::new_file("/r/empty", 0, None));
        root.children.push(ArchiveNode::new_file("/r/readme", 20, None));
        root.aggregate_sizes();
        root
    }

    #[test]
    fn test_root_fills_frame() {
        let frame = Rect::from_size(10.0, 10.0);
        let rects = layout_tree(&sample(), frame, &LayoutOptions::default());

        assert_eq!(rects[0].rect, frame);
        assert_eq!(rects[0].depth, 0);
        assert_eq!(rects[0].size, 100);
    }

    #[test]
    fn test_children_nested_inside_parents() {
        let frame = Rect::from_size(10.0, 10.0);
        let rects = layout_tree(&sample(), frame, &LayoutOptions::default());

        // Empty file gets no rectangle.
        assert_eq!(rects.len(), 5);
        assert!(rects.iter().all(|r| r.name != "empty"));

        let app = rects.iter().find(|r| r.name == "App.app").unwrap();
        assert!((app.rect.area() - 80.0).abs() < 1e-9);
        for child in rects.iter().filter(|r| r.depth == 2) {
            assert!(app.rect.contains_rect(&child.rect, 1e-9));
        }
    }

    #[test]
    fn test_max_depth() {
        let options = LayoutOptions {
            max_depth: 1,
            ..LayoutOptions::default()
        };
        let rects = layout_tree(&sample(), Rect::from_size(10.0, 10.0), &options);

        assert_eq!(rects.len(), 3);
        assert!(rects.iter().all(|r| r.depth <= 1));
    }

    #[test]
    fn test_min_area_stops_descent() {
        let options = LayoutOptions {
            min_area: 1000.0,
            ..LayoutOptions::default()
        };
        let rects = layout_tree(&sample(), Rect::from_size(10.0, 10.0), &options);
        assert_eq!(rects.len(), 1);
    }
}
