//! Squarified treemap layout for steelyard.
//!
//! [`SquarifyPartitioner`] splits a rectangle among the sized segments of any
//! [`Partitionable`] item, keeping each piece close to square.
//! [`layout_tree`] applies it recursively to an archive tree.
//!
//! ```rust
//! use steelyard_layout::{Rect, SquarifyPartitioner, Partitionable};
//!
//! struct Item(f64, Vec<Item>);
//!
//! impl Partitionable for Item {
//!     fn size(&self) -> f64 { self.0 }
//!     fn segments(&self) -> &[Self] { &self.1 }
//! }
//!
//! let item = Item(100.0, vec![Item(50.0, vec![]), Item(30.0, vec![]), Item(20.0, vec![])]);
//! let parts = SquarifyPartitioner::new().partition(&item, Rect::from_size(10.0, 10.0));
//! assert_eq!(parts.len(), 3);
//! ```

mod geometry;
mod squarify;
mod tree;

pub use geometry::Rect;
pub use squarify::{Partition, Partitionable, SquarifyPartitioner};
pub use tree::{LayoutOptions, LayoutRect, layout_tree};
