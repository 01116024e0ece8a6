//! Archive formats understood by 7-Zip.
//!
//! Three views over the same family of formats:
//! - *extractable*: formats opened while flattening nested archives,
//! - *creatable*: formats that can be produced as a target,
//! - *archive extensions*: suffixes stripped when naming the output.

use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::{extension_of, normalize_token, UnsupportedFormat};

/// How a creatable format is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// Holds a directory tree directly (zip, 7z, tar).
    Container,
    /// Compresses exactly one stream; needs an intermediate tar (gz, bz2, xz).
    SingleStream,
}

/// 7-Zip type switch plus kind for a creatable format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDescriptor {
    /// Value passed as `-t<type>`, e.g. `-tzip`.
    pub type_flag: &'static str,
    pub kind: ArchiveKind,
}

/// Formats opened while flattening. 7-Zip detects the type itself on `x`.
static EXTRACTABLE: Lazy<BTreeSet<&'static str>> =
    Lazy::new(|| BTreeSet::from(["7z", "zip", "tar", "gz", "bz2", "xz", "rar"]));

static CREATABLE: Lazy<BTreeMap<&'static str, ArchiveDescriptor>> = Lazy::new(|| {
    let container = |type_flag| ArchiveDescriptor {
        type_flag,
        kind: ArchiveKind::Container,
    };
    let stream = |type_flag| ArchiveDescriptor {
        type_flag,
        kind: ArchiveKind::SingleStream,
    };

    BTreeMap::from([
        ("7z", container("-t7z")),
        ("zip", container("-tzip")),
        ("tar", container("-ttar")),
        ("gz", stream("-tgzip")),
        ("bz2", stream("-tbzip2")),
        ("xz", stream("-txz")),
    ])
});

static ARCHIVE_EXTENSIONS: Lazy<BTreeSet<&'static str>> = Lazy::new(|| {
    BTreeSet::from([
        "7z", "zip", "tar", "gz", "bz2", "xz", "wim", "cab", "arj", "chm", "cpio", "iso",
        "vhd", "vhdx", "swm", "z", "rar",
    ])
});

/// Whether `path` is an archive the flattener should open.
pub fn is_extractable(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| EXTRACTABLE.contains(ext.as_str()))
}

/// Whether `extension` (no dot, any case) is a known archive suffix.
pub fn is_archive_extension(extension: &str) -> bool {
    ARCHIVE_EXTENSIONS.contains(extension.to_ascii_lowercase().as_str())
}

/// Looks up how to create `target`.
pub fn creatable(target: &str) -> Result<&'static ArchiveDescriptor, UnsupportedFormat> {
    let token = normalize_token(target);
    if let Some(descriptor) = CREATABLE.get(token.as_str()) {
        return Ok(descriptor);
    }
    if EXTRACTABLE.contains(token.as_str()) {
        return Err(UnsupportedFormat::extract_only(token));
    }
    Err(UnsupportedFormat::unknown_target(
        super::Domain::Archive,
        token,
    ))
}

/// All creatable target tokens.
pub fn creatable_formats() -> Vec<&'static str> {
    CREATABLE.keys().copied().collect()
}

/// All extractable input tokens.
pub fn extractable_formats() -> Vec<&'static str> {
    EXTRACTABLE.iter().copied().collect()
}
