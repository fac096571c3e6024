//! Analysis algorithms for steelyard.
//!
//! This crate finds repeated content in built archive trees:
//!
//! - **Checksum index** - Group every node by content checksum
//! - **Duplicate marking** - Flag every node whose checksum is shared
//! - **Duplicate reports** - List groups, hiding those nested in a
//!   duplicated ancestor unless asked for all of them
//!
//! ```rust,ignore
//! use steelyard_analyze::{DuplicateAnalyzer, DuplicateConfig};
//! use steelyard_scan::{ArchiveBuilder, InspectConfig};
//!
//! let config = InspectConfig::new("/path/to/Payload");
//! let mut tree = ArchiveBuilder::from_config(&config)?.build(&config)?;
//!
//! let report = DuplicateAnalyzer::new().analyze(&mut tree);
//!
//! println!("Found {} duplicate groups", report.group_count);
//! println!("Wasted space: {} bytes", report.total_wasted_space);
//! ```

mod duplicates;
mod index;

pub use duplicates::{
    Duplicate, DuplicateAnalyzer, DuplicateConfig, DuplicateConfigBuilder, DuplicateReport,
    all_duplicates, mark_duplicates, top_level_duplicates,
};
pub use index::{ChecksumIndex, IndexedNode};

// Re-export core types
pub use steelyard_core::{ArchiveNode, ArchiveTree, Checksum};
