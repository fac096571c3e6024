//! Content classification of bundle entries.
//!
//! A regular file is first sniffed for executable magic numbers; only a
//! recognized executable format short-circuits. Everything else, including
//! bytes that merely look binary, is classified from its extension: first
//! against the package extensions, then against the uniform type table.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Number of leading bytes inspected for magic numbers.
pub const SNIFF_LEN: usize = 64;

/// Recognized executable image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum BinaryFormat {
    #[strum(to_string = "Mach-O")]
    MachO,
    #[strum(to_string = "ELF")]
    Elf,
    #[strum(to_string = "Windows PE")]
    WindowsPe,
}

const MACH_O_MAGICS: &[[u8; 4]] = &[
    [0xFE, 0xED, 0xFA, 0xCF],
    [0xCF, 0xFA, 0xED, 0xFE],
    [0xFE, 0xED, 0xFA, 0xCE],
    [0xCE, 0xFA, 0xED, 0xFE],
    // Universal (fat) images.
    [0xCA, 0xFE, 0xBA, 0xBE],
    [0xCA, 0xFE, 0xBA, 0xBF],
];

const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

const PE_MAGIC: [u8; 2] = [b'M', b'Z'];

impl BinaryFormat {
    /// Match leading bytes against known executable magic numbers.
    pub fn detect(head: &[u8]) -> Option<Self> {
        if MACH_O_MAGICS.iter().any(|magic| head.starts_with(magic)) {
            Some(Self::MachO)
        } else if head.starts_with(&ELF_MAGIC) {
            Some(Self::Elf)
        } else if head.starts_with(&PE_MAGIC) {
            Some(Self::WindowsPe)
        } else {
            None
        }
    }
}

/// Result of sniffing a file's leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSniff {
    /// A known executable format.
    Recognized(BinaryFormat),
    /// Bytes outside printable ASCII and whitespace, but no known magic.
    UnknownBinary,
    /// Printable ASCII and whitespace only (including empty input).
    Text,
}

impl ContentSniff {
    /// Sniff a prefix of a file's content.
    pub fn from_bytes(head: &[u8]) -> Self {
        if let Some(format) = BinaryFormat::detect(head) {
            return Self::Recognized(format);
        }
        let is_text = head.iter().all(|&b| matches!(b, 9..=13 | 32..=126));
        if is_text { Self::Text } else { Self::UnknownBinary }
    }
}

/// Directory-like bundle extensions with special meaning.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum PackageKind {
    #[strum(serialize = "appex", to_string = "App Extension")]
    AppExtension,
    #[strum(serialize = "bundle", to_string = "Bundle")]
    Bundle,
    #[strum(serialize = "car", to_string = "Asset Catalog")]
    AssetCatalog,
    #[strum(serialize = "framework", to_string = "Framework")]
    Framework,
    #[strum(serialize = "lproj", to_string = "Localization Files")]
    Localization,
    #[strum(serialize = "mlmodelc", to_string = "Core ML Model")]
    CompiledModel,
    #[strum(serialize = "momd", to_string = "Core Data Model")]
    DataModel,
}

impl PackageKind {
    /// The path extension identifying this package kind.
    pub fn extension(self) -> &'static str {
        match self {
            Self::AppExtension => "appex",
            Self::Bundle => "bundle",
            Self::AssetCatalog => "car",
            Self::Framework => "framework",
            Self::Localization => "lproj",
            Self::CompiledModel => "mlmodelc",
            Self::DataModel => "momd",
        }
    }

    /// Look up a package kind by path extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.to_ascii_lowercase();
        // Display names parse too; only accept real extensions.
        Self::from_str(&extension)
            .ok()
            .filter(|kind| kind.extension() == extension)
    }
}

/// Broad family a uniform type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum TypeFamily {
    Image,
    Audio,
    Video,
    Text,
    #[strum(to_string = "Source Code")]
    SourceCode,
    Document,
    Font,
    Archive,
    #[strum(to_string = "Property List")]
    PropertyList,
    Data,
}

/// A type recognized from a file extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniformType {
    /// Reverse-DNS type identifier, e.g. `public.png`.
    pub identifier: CompactString,
    /// Human-readable description.
    pub description: CompactString,
    /// Family the type belongs to.
    pub family: TypeFamily,
}

/// (extension, identifier, description, family)
const UNIFORM_TYPES: &[(&str, &str, &str, TypeFamily)] = &[
    ("png", "public.png", "PNG image", TypeFamily::Image),
    ("jpg", "public.jpeg", "JPEG image", TypeFamily::Image),
    ("jpeg", "public.jpeg", "JPEG image", TypeFamily::Image),
    ("gif", "com.compuserve.gif", "GIF image", TypeFamily::Image),
    ("heic", "public.heic", "HEIC image", TypeFamily::Image),
    ("webp", "org.webmproject.webp", "WebP image", TypeFamily::Image),
    ("tiff", "public.tiff", "TIFF image", TypeFamily::Image),
    ("svg", "public.svg-image", "SVG image", TypeFamily::Image),
    ("ico", "com.microsoft.ico", "Windows icon image", TypeFamily::Image),
    ("icns", "com.apple.icns", "Apple icon image", TypeFamily::Image),
    ("mp3", "public.mp3", "MP3 audio", TypeFamily::Audio),
    ("m4a", "com.apple.m4a-audio", "MPEG-4 audio", TypeFamily::Audio),
    ("wav", "com.microsoft.waveform-audio", "Waveform audio", TypeFamily::Audio),
    ("aiff", "public.aiff-audio", "AIFF audio", TypeFamily::Audio),
    ("caf", "com.apple.coreaudio-format", "Core Audio file", TypeFamily::Audio),
    ("mp4", "public.mpeg-4", "MPEG-4 movie", TypeFamily::Video),
    ("m4v", "com.apple.m4v-video", "MPEG-4 video", TypeFamily::Video),
    ("mov", "com.apple.quicktime-movie", "QuickTime movie", TypeFamily::Video),
    ("txt", "public.plain-text", "Plain text", TypeFamily::Text),
    ("md", "net.daringfireball.markdown", "Markdown text", TypeFamily::Text),
    ("strings", "com.apple.xcode.strings-text", "Strings file", TypeFamily::Text),
    ("json", "public.json", "JSON", TypeFamily::Text),
    ("xml", "public.xml", "XML", TypeFamily::Text),
    ("html", "public.html", "HTML", TypeFamily::Text),
    ("css", "public.css", "CSS", TypeFamily::Text),
    ("js", "com.netscape.javascript-source", "JavaScript", TypeFamily::SourceCode),
    ("swift", "public.swift-source", "Swift source", TypeFamily::SourceCode),
    ("h", "public.c-header", "C header", TypeFamily::SourceCode),
    ("c", "public.c-source", "C source", TypeFamily::SourceCode),
    ("m", "public.objective-c-source", "Objective-C source", TypeFamily::SourceCode),
    ("pdf", "com.adobe.pdf", "PDF document", TypeFamily::Document),
    ("rtf", "public.rtf", "Rich text document", TypeFamily::Document),
    ("ttf", "public.truetype-ttf-font", "TrueType font", TypeFamily::Font),
    ("otf", "public.opentype-font", "OpenType font", TypeFamily::Font),
    ("ttc", "public.truetype-collection-font", "TrueType collection", TypeFamily::Font),
    ("zip", "public.zip-archive", "ZIP archive", TypeFamily::Archive),
    ("gz", "org.gnu.gnu-zip-archive", "Gzip archive", TypeFamily::Archive),
    ("plist", "com.apple.property-list", "Property list", TypeFamily::PropertyList),
    ("stringsdict", "com.apple.xcode.strings-dictionary", "Strings dictionary", TypeFamily::PropertyList),
    ("nib", "com.apple.interfacebuilder.nib", "Interface Builder nib", TypeFamily::Data),
    ("mobileprovision", "com.apple.mobileprovision", "Provisioning profile", TypeFamily::Data),
    ("sqlite", "org.sqlite.sqlite3", "SQLite database", TypeFamily::Data),
    ("db", "public.database", "Database", TypeFamily::Data),
    ("bin", "public.data", "Binary data", TypeFamily::Data),
    ("dat", "public.data", "Binary data", TypeFamily::Data),
];

impl UniformType {
    /// Look up a uniform type by path extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.to_ascii_lowercase();
        UNIFORM_TYPES
            .iter()
            .find(|(ext, ..)| *ext == extension)
            .map(|(_, identifier, description, family)| Self {
                identifier: CompactString::new(identifier),
                description: CompactString::new(description),
                family: *family,
            })
    }
}

/// Semantic kind of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// A single rendition from an asset catalog.
    Asset,
    /// An executable image.
    Binary(BinaryFormat),
    /// A segment synthesized from an executable image.
    BinarySection,
    /// A directory-like bundle with a special extension.
    Package(PackageKind),
    /// Anything else recognized by extension.
    Universal(UniformType),
}

impl ContentType {
    /// Label worth showing next to a node name; synthetic kinds have none.
    pub fn display_name(&self) -> Option<String> {
        match self {
            Self::Asset | Self::BinarySection => None,
            other => Some(other.to_string()),
        }
    }

    /// Whether this is a recognized executable.
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// Whether this is an asset catalog file.
    pub fn is_asset_catalog(&self) -> bool {
        matches!(self, Self::Package(PackageKind::AssetCatalog))
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset => f.write_str("Asset"),
            Self::Binary(format) => write!(f, "{format}"),
            Self::BinarySection => f.write_str("Binary Section"),
            Self::Package(kind) => write!(f, "{kind}"),
            Self::Universal(uniform) => f.write_str(&uniform.description),
        }
    }
}

/// Classify leading bytes and an extension. Pure.
pub fn classify_bytes(head: &[u8], extension: Option<&str>) -> Option<ContentType> {
    if let ContentSniff::Recognized(format) = ContentSniff::from_bytes(head) {
        return Some(ContentType::Binary(format));
    }

    let extension = extension?;
    if let Some(kind) = PackageKind::from_extension(extension) {
        return Some(ContentType::Package(kind));
    }
    UniformType::from_extension(extension).map(ContentType::Universal)
}

/// Classify a filesystem entry.
///
/// Only regular files are sniffed; directories are classified by extension
/// alone. Unreadable files fall back to their extension.
pub fn classify(path: &Path) -> Option<ContentType> {
    let head = if path.is_file() {
        read_head(path).unwrap_or_default()
    } else {
        Vec::new()
    };
    let extension = path.extension().and_then(|e| e.to_str());
    classify_bytes(&head, extension)
}

fn read_head(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)?;
    Ok(head)
}
