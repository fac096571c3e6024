//! Content checksums used for identity and duplicate grouping.

use std::fmt;
use std::path::Path;

use compact_str::CompactString;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Lowercase hex digest of a node's content.
///
/// Files hash their raw bytes with BLAKE3. Directories hash the sorted
/// concatenation of their children's checksums, so two directories holding
/// the same content hash identically whatever order the filesystem lists them
/// in. Digests reported by external tools are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(CompactString);

impl Checksum {
    /// Hash a byte slice.
    pub fn of_bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self::from_hash(blake3::hash(bytes.as_ref()))
    }

    /// Hash a file's content (memory-mapped when large enough).
    pub fn of_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let mut hasher = blake3::Hasher::new();
        hasher.update_mmap(path)?;
        Ok(Self::from_hash(hasher.finalize()))
    }

    /// Combine child checksums into a directory checksum.
    ///
    /// Returns `None` when there is nothing to combine.
    pub fn combine<'a>(children: impl IntoIterator<Item = &'a Checksum>) -> Option<Self> {
        let joined: String = children.into_iter().map(Checksum::as_str).sorted().join("");
        if joined.is_empty() {
            None
        } else {
            Some(Self::of_bytes(joined))
        }
    }

    /// Accept a hex digest produced elsewhere.
    ///
    /// Returns `None` for empty or non-hex input.
    pub fn from_digest(digest: &str) -> Option<Self> {
        let digest = digest.trim();
        if digest.is_empty() || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(CompactString::new(digest.to_ascii_lowercase())))
    }

    /// The digest as a hex string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn from_hash(hash: blake3::Hash) -> Self {
        Self(CompactString::new(hash.to_hex().as_str()))
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
