//! Archive tree construction for steelyard.
//!
//! This crate turns an extracted application bundle into a size-annotated
//! content tree.
//!
//! # Overview
//!
//! `steelyard-scan` walks the bundle and builds one node per filesystem
//! entry. Executables and asset catalogs are broken down further by external
//! tools:
//!
//! - **Binaries** are split into segments reported by `size`, with the file's
//!   on-disk size spread over them proportionally
//! - **Asset catalogs** are split into renditions reported by `assetutil`
//! - **Tool failures** degrade a single node to a plain leaf and are recorded
//!   as warnings on the finished tree
//!
//! # Example
//!
//! ```rust,no_run
//! use steelyard_scan::{ArchiveBuilder, InspectConfig, open_archive};
//!
//! let bundle = open_archive("Demo.ipa".as_ref()).unwrap();
//! let config = InspectConfig::new(bundle.root());
//! let tree = ArchiveBuilder::from_config(&config).unwrap().build(&config).unwrap();
//!
//! println!("Total size: {} bytes", tree.total_size());
//! println!("Total files: {}", tree.total_files());
//! ```

mod builder;
mod extract;
pub mod introspect;

pub use builder::ArchiveBuilder;
pub use extract::{ArchiveExtractor, ExtractedArchive, ZipExtractor, open_archive, open_with};
pub use introspect::{
    AssetIntrospector, AssetRecord, BinaryIntrospector, IntrospectionError, Introspectors,
    ParseError, SegmentReport,
};

// Re-export core types for convenience
pub use steelyard_core::{
    ArchiveError, ArchiveNode, ArchiveTree, InspectConfig, InspectWarning, NodeId, TreeStats,
    WarningKind,
};
