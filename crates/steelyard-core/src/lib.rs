//! Core types for steelyard.
//!
//! This crate provides the data model shared by the other steelyard crates:
//! archive nodes and trees, content classification, checksums, configuration
//! and errors.

mod checksum;
mod config;
mod content;
mod describe;
mod error;
mod node;
mod tree;

pub use checksum::Checksum;
pub use config::{InspectConfig, InspectConfigBuilder};
pub use content::{
    BinaryFormat, ContentSniff, ContentType, PackageKind, SNIFF_LEN, TypeFamily, UniformType,
    classify, classify_bytes,
};
pub use describe::TreeDescription;
pub use error::{ArchiveError, InspectWarning, WarningKind};
pub use node::{ArchiveNode, Descendants, NodeId, ResourceKind};
pub use tree::{ArchiveTree, TreeStats};
