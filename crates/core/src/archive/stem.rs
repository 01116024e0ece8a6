//! Output name derivation.

use std::path::Path;

use crate::capabilities::archive::is_archive_extension;

/// Derives the base name used for staging and output files.
///
/// Trailing archive extensions are stripped repeatedly, so `report.tar.gz`
/// becomes `report` and `x.jpg.zip` becomes `x.jpg`. When the name carries no
/// archive extension, its single final extension is removed instead
/// (`photo.jpg` becomes `photo`). A name that would end up empty is returned
/// unchanged.
pub fn clean_stem(path: &Path) -> String {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => return path.to_string_lossy().to_string(),
    };

    let mut stem = name.as_str();
    let mut stripped = false;
    while let Some((rest, ext)) = split_extension(stem) {
        if !is_archive_extension(ext) {
            break;
        }
        stem = rest;
        stripped = true;
    }

    if !stripped {
        if let Some((rest, _)) = split_extension(stem) {
            stem = rest;
        }
    }

    stem.to_string()
}

/// Splits `name` at its last dot. Leading dots (hidden files) and empty
/// remainders do not count as an extension.
fn split_extension(name: &str) -> Option<(&str, &str)> {
    let (rest, ext) = name.rsplit_once('.')?;
    if rest.is_empty() || ext.is_empty() {
        return None;
    }
    Some((rest, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stem(name: &str) -> String {
        clean_stem(Path::new(name))
    }

    #[test]
    fn test_strips_compound_archive_extensions() {
        assert_eq!(stem("/data/video.tar.gz"), "video");
        assert_eq!(stem("report.TAR.BZ2"), "report");
        assert_eq!(stem("backup.7z"), "backup");
    }

    #[test]
    fn test_stops_at_first_non_archive_extension() {
        assert_eq!(stem("x.jpg.zip"), "x.jpg");
        assert_eq!(stem("release.v1.2.tar.xz"), "release.v1.2");
    }

    #[test]
    fn test_plain_file_loses_single_extension() {
        assert_eq!(stem("photo.jpg"), "photo");
        assert_eq!(stem("notes.final.docx"), "notes.final");
    }

    #[test]
    fn test_wider_archive_set() {
        assert_eq!(stem("disk.iso"), "disk");
        assert_eq!(stem("legacy.Z"), "legacy");
    }

    #[test]
    fn test_names_that_would_become_empty() {
        assert_eq!(stem(".tar"), ".tar");
        assert_eq!(stem("README"), "README");
        assert_eq!(stem("trailing."), "trailing.");
    }
}
