//! Rendition sizes from `assetutil`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use compact_str::CompactString;
use serde::Deserialize;

use super::error::{IntrospectionError, ParseError};
use super::runner::ToolRunner;
use super::{AssetIntrospector, AssetRecord};

/// Asset introspector backed by `assetutil --info`.
///
/// When the configured program is `xcrun`, `assetutil` is passed as its
/// first argument.
pub struct AssetUtil {
    runner: Arc<ToolRunner>,
    program: PathBuf,
}

impl AssetUtil {
    pub fn new(runner: Arc<ToolRunner>, program: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    fn args(&self, path: &Path) -> Vec<OsString> {
        let mut args = Vec::with_capacity(3);
        if self.program.file_stem().is_some_and(|stem| stem == "xcrun") {
            args.push(OsString::from("assetutil"));
        }
        args.push(OsString::from("--info"));
        args.push(path.as_os_str().to_owned());
        args
    }
}

impl AssetIntrospector for AssetUtil {
    fn renditions(&self, path: &Path) -> Result<Vec<AssetRecord>, IntrospectionError> {
        let output = self.runner.run(&self.program, self.args(path))?;
        Ok(parse_assetutil_output(&output)?)
    }
}

#[derive(Debug, Deserialize)]
struct RawAsset {
    #[serde(rename = "AssetType")]
    asset_type: Option<String>,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "RenditionName")]
    rendition_name: Option<String>,
    #[serde(rename = "SizeOnDisk")]
    size_on_disk: Option<u64>,
    #[serde(rename = "SHA1Digest")]
    sha1_digest: Option<String>,
}

/// Parse the JSON array printed by `assetutil --info`.
///
/// Records carrying neither a name nor a size, such as the leading catalog
/// header, are dropped.
pub fn parse_assetutil_output(output: &[u8]) -> Result<Vec<AssetRecord>, ParseError> {
    let text = std::str::from_utf8(output).map_err(|_| ParseError::InvalidUtf8)?;
    let raw: Vec<RawAsset> = serde_json::from_str(text)?;

    Ok(raw
        .into_iter()
        .filter_map(|asset| {
            let name = asset
                .rendition_name
                .or(asset.name)
                .or(asset.asset_type)
                .map(CompactString::from);
            if name.is_none() && asset.size_on_disk.is_none() {
                return None;
            }
            Some(AssetRecord {
                name,
                size: asset.size_on_disk,
                digest: asset.sha1_digest,
            })
        })
        .collect())
}
