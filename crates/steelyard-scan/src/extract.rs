//! Unpacking compressed bundles into a directory the builder can walk.

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use zip::ZipArchive;

use steelyard_core::ArchiveError;

/// Turns a compressed bundle into a plain directory tree.
pub trait ArchiveExtractor {
    /// Whether this extractor understands the file at `path`.
    fn accepts(&self, path: &Path) -> bool;

    /// Unpack `path` into a fresh temporary directory.
    fn extract(&self, path: &Path) -> Result<ExtractedArchive, ArchiveError>;
}

/// A directory ready for building.
///
/// When it came from extraction, the directory is removed on drop.
#[derive(Debug)]
pub struct ExtractedArchive {
    root: PathBuf,
    temp: Option<TempDir>,
}

impl ExtractedArchive {
    /// Use an existing directory as is.
    pub fn in_place(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            temp: None,
        }
    }

    fn temporary(temp: TempDir) -> Self {
        Self {
            root: temp.path().to_path_buf(),
            temp: Some(temp),
        }
    }

    /// Directory holding the bundle contents.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the directory is removed on drop.
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }
}

/// Extracts zip-based packages such as `.ipa` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn accepts(&self, path: &Path) -> bool {
        let mut magic = [0u8; 4];
        File::open(path)
            .and_then(|mut file| std::io::Read::read_exact(&mut file, &mut magic))
            .is_ok_and(|()| magic == *b"PK\x03\x04")
    }

    fn extract(&self, path: &Path) -> Result<ExtractedArchive, ArchiveError> {
        let file = File::open(path).map_err(|e| ArchiveError::io(path, e))?;
        let mut archive = ZipArchive::new(file).map_err(|e| ArchiveError::extraction(path, e))?;

        let temp = tempfile::Builder::new()
            .prefix("steelyard-")
            .tempdir()
            .map_err(|e| ArchiveError::io(std::env::temp_dir(), e))?;

        debug!(
            archive = %path.display(),
            entries = archive.len(),
            into = %temp.path().display(),
            "extracting archive"
        );
        archive
            .extract(temp.path())
            .map_err(|e| ArchiveError::extraction(path, e))?;

        Ok(ExtractedArchive::temporary(temp))
    }
}

/// Open a bundle with the default extractors.
///
/// Directories are used in place; anything else must be a zip package.
pub fn open_archive(path: &Path) -> Result<ExtractedArchive, ArchiveError> {
    open_with(path, &[&ZipExtractor])
}

/// Open a bundle, trying each extractor in turn.
pub fn open_with(
    path: &Path,
    extractors: &[&dyn ArchiveExtractor],
) -> Result<ExtractedArchive, ArchiveError> {
    let meta = std::fs::metadata(path).map_err(|e| ArchiveError::io(path, e))?;
    if meta.is_dir() {
        return Ok(ExtractedArchive::in_place(path));
    }

    extractors
        .iter()
        .find(|extractor| extractor.accepts(path))
        .ok_or_else(|| ArchiveError::extraction(path, "unsupported archive format"))?
        .extract(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    fn write_package(dir: &Path) -> PathBuf {
        let path = dir.join("Demo.ipa");
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();

        writer.add_directory("Payload/Demo.app/", options).unwrap();
        writer.start_file("Payload/Demo.app/Info.plist", options).unwrap();
        writer.write_all(b"<plist/>").unwrap();
        writer.finish().unwrap();
        path
    }

    #[test]
    fn test_extracts_zip_package() {
        let temp = TempDir::new().unwrap();
        let package = write_package(temp.path());

        let extracted = open_archive(&package).unwrap();
        assert!(extracted.is_temporary());
        let plist = extracted.root().join("Payload/Demo.app/Info.plist");
        assert_eq!(std::fs::read(plist).unwrap(), b"<plist/>");
    }

    #[test]
    fn test_extraction_is_removed_on_drop() {
        let temp = TempDir::new().unwrap();
        let package = write_package(temp.path());

        let extracted = open_archive(&package).unwrap();
        let root = extracted.root().to_path_buf();
        drop(extracted);
        assert!(!root.exists());
    }

    #[test]
    fn test_directory_used_in_place() {
        let temp = TempDir::new().unwrap();
        let opened = open_archive(temp.path()).unwrap();
        assert!(!opened.is_temporary());
        assert_eq!(opened.root(), temp.path());
    }

    #[test]
    fn test_rejects_unknown_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let err = open_archive(&path).unwrap_err();
        assert!(matches!(err, ArchiveError::Extraction { .. }));
    }

    #[test]
    fn test_missing_input() {
        let temp = TempDir::new().unwrap();
        let err = open_archive(&temp.path().join("gone.ipa")).unwrap_err();
        assert!(matches!(err, ArchiveError::PathNotFound { .. }));
    }
}
