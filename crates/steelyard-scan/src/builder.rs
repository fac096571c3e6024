//! Recursive archive tree construction.

use std::collections::HashSet;
use std::fs::Metadata;
use std::path::Path;
use std::time::Instant;

use compact_str::{CompactString, format_compact};
use rayon::prelude::*;
use tracing::{debug, trace};

use steelyard_core::{
    ArchiveError, ArchiveNode, ArchiveTree, Checksum, ContentType, InspectConfig, InspectWarning,
    TreeStats, WarningKind, classify,
};

use crate::introspect::{IntrospectionError, Introspectors};

/// Builds a size-annotated content tree from an extracted bundle.
///
/// Sibling subtrees are built in parallel; each call owns the subtree it
/// returns, so the tree is never shared while under construction.
pub struct ArchiveBuilder {
    introspectors: Introspectors,
}

impl ArchiveBuilder {
    /// A builder that never runs external tools.
    pub fn new() -> Self {
        Self::with_introspectors(Introspectors::none())
    }

    /// A builder using the given introspectors.
    pub fn with_introspectors(introspectors: Introspectors) -> Self {
        Self { introspectors }
    }

    /// A builder running the external tools named in `config`.
    pub fn from_config(config: &InspectConfig) -> Result<Self, ArchiveError> {
        Ok(Self::with_introspectors(Introspectors::from_config(config)?))
    }

    /// Build, aggregate and number the tree rooted at `config.root`.
    ///
    /// Only a missing root is fatal. Everything else degrades the affected
    /// node and is reported through the tree's warnings.
    pub fn build(&self, config: &InspectConfig) -> Result<ArchiveTree, ArchiveError> {
        let start = Instant::now();

        // A linked root is resolved first; links below it are never followed.
        let root_path = config
            .root
            .canonicalize()
            .map_err(|e| ArchiveError::io(&config.root, e))?;
        let root_meta =
            std::fs::symlink_metadata(&root_path).map_err(|e| ArchiveError::io(&root_path, e))?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
            .map_err(|e| ArchiveError::InvalidConfig {
                message: e.to_string(),
            })?;

        let context = BuildContext {
            config,
            root: &root_path,
            introspectors: &self.introspectors,
        };
        let Built {
            node: mut root,
            warnings,
        } = pool.install(|| context.build_entry(&root_path, &root_meta));

        root.aggregate_sizes();
        root.assign_ids(&mut 0);
        let stats = TreeStats::from_root(&root);

        debug!(
            root = %root_path.display(),
            size = stats.total_size,
            files = stats.total_files,
            warnings = warnings.len(),
            "archive tree built"
        );

        Ok(ArchiveTree::new(
            root,
            root_path,
            config.clone(),
            stats,
            start.elapsed(),
            warnings,
        ))
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A finished subtree and the problems met while building it.
struct Built {
    node: ArchiveNode,
    warnings: Vec<InspectWarning>,
}

impl Built {
    fn clean(node: ArchiveNode) -> Self {
        Self {
            node,
            warnings: Vec::new(),
        }
    }
}

struct BuildContext<'a> {
    config: &'a InspectConfig,
    root: &'a Path,
    introspectors: &'a Introspectors,
}

impl BuildContext<'_> {
    fn build_path(&self, path: &Path) -> Built {
        match std::fs::symlink_metadata(path) {
            Ok(meta) => self.build_entry(path, &meta),
            Err(err) => Built {
                node: ArchiveNode::new_other(path),
                warnings: vec![InspectWarning::new(
                    path,
                    err.to_string(),
                    WarningKind::MetadataError,
                )],
            },
        }
    }

    fn build_entry(&self, path: &Path, meta: &Metadata) -> Built {
        let file_type = meta.file_type();
        if file_type.is_dir() {
            self.build_directory(path)
        } else if file_type.is_file() {
            self.build_file(path, meta.len())
        } else {
            Built::clean(ArchiveNode::new_other(path))
        }
    }

    fn build_directory(&self, path: &Path) -> Built {
        let mut node = ArchiveNode::new_directory(path, classify(path));
        let mut warnings = Vec::new();

        let listing = match std::fs::read_dir(path) {
            Ok(listing) => listing,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "unreadable directory");
                warnings.push(InspectWarning::unreadable_directory(path, &err));
                return Built { node, warnings };
            }
        };

        let mut entries = Vec::new();
        for entry in listing {
            match entry {
                Ok(entry) => {
                    let name = entry.file_name();
                    if self.config.should_skip_hidden(&name.to_string_lossy()) {
                        continue;
                    }
                    entries.push(entry.path());
                }
                Err(err) => warnings.push(InspectWarning::read_error(path, &err)),
            }
        }
        trace!(path = %path.display(), entries = entries.len(), "listing directory");

        let built: Vec<Built> = entries.par_iter().map(|entry| self.build_path(entry)).collect();
        for child in built {
            warnings.extend(child.warnings);
            node.children.push(child.node);
        }

        node.checksum = Checksum::combine(node.children.iter().filter_map(|c| c.checksum.as_ref()));
        Built { node, warnings }
    }

    fn build_file(&self, path: &Path, size: u64) -> Built {
        let content_type = classify(path);
        let mut node = ArchiveNode::new_file(path, size, content_type.clone());
        let mut warnings = Vec::new();

        match Checksum::of_file(path) {
            Ok(checksum) => node.checksum = Some(checksum),
            Err(err) => warnings.push(InspectWarning::read_error(path, &err)),
        }

        let expanded = match &content_type {
            Some(content) if content.is_asset_catalog() => self.expand_asset_catalog(path),
            Some(content) if content.is_binary() => self.expand_binary(path, size),
            _ => Ok(Vec::new()),
        };

        match expanded {
            Ok(children) => node.children = children,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "introspection failed, keeping leaf");
                warnings.push(InspectWarning::introspection_failed(path, &err));
            }
        }

        Built { node, warnings }
    }

    fn expand_binary(
        &self,
        path: &Path,
        size: u64,
    ) -> Result<Vec<ArchiveNode>, IntrospectionError> {
        let Some(introspector) = &self.introspectors.binary else {
            return Ok(Vec::new());
        };

        let report = introspector.segments(path)?;
        let mut names = SyntheticNames::default();
        Ok(report
            .distribute(size)
            .into_iter()
            .map(|(name, share)| {
                let identity = path.join(names.claim(&name).as_str());
                let checksum = self.identity_checksum(&identity);
                ArchiveNode::new_synthetic(
                    identity,
                    name,
                    ContentType::BinarySection,
                    Some(share),
                    checksum,
                )
            })
            .collect())
    }

    fn expand_asset_catalog(
        &self,
        path: &Path,
    ) -> Result<Vec<ArchiveNode>, IntrospectionError> {
        let Some(introspector) = &self.introspectors.assets else {
            return Ok(Vec::new());
        };

        let records = introspector.renditions(path)?;
        let mut names = SyntheticNames::default();
        Ok(records
            .into_iter()
            .map(|record| {
                let name = record.name.unwrap_or_else(|| CompactString::new("asset"));
                let identity = path.join(names.claim(&name).as_str());
                let checksum = record
                    .digest
                    .as_deref()
                    .and_then(Checksum::from_digest)
                    .unwrap_or_else(|| self.identity_checksum(&identity));
                ArchiveNode::new_synthetic(identity, name, ContentType::Asset, record.size, checksum)
            })
            .collect())
    }

    /// Checksum of a synthetic node, stable across extraction directories.
    fn identity_checksum(&self, identity: &Path) -> Checksum {
        let relative = identity.strip_prefix(self.root).unwrap_or(identity);
        Checksum::of_bytes(relative.to_string_lossy().as_bytes())
    }
}

/// Hands out unique path components for the synthetic children of one file.
#[derive(Default)]
struct SyntheticNames {
    taken: HashSet<CompactString>,
}

impl SyntheticNames {
    fn claim(&mut self, name: &str) -> CompactString {
        let mut candidate = CompactString::new(name);
        let mut n = 2;
        while !self.taken.insert(candidate.clone()) {
            candidate = format_compact!("{name}#{n}");
            n += 1;
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_names_are_unique() {
        let mut names = SyntheticNames::default();
        assert_eq!(names.claim("icon"), "icon");
        assert_eq!(names.claim("icon"), "icon#2");
        assert_eq!(names.claim("icon"), "icon#3");
        assert_eq!(names.claim("other"), "other");
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let config = InspectConfig::new("/definitely/not/here/steelyard");
        let err = ArchiveBuilder::new().build(&config).unwrap_err();
        assert!(matches!(err, ArchiveError::PathNotFound { .. }));
    }
}
