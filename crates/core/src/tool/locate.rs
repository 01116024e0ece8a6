//! Locating tool executables.

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::types::program_name;
use crate::config::ToolsConfig;

/// Whether a configured tool can be found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    /// Role of the tool: `ffmpeg`, `seven_zip` or `libreoffice`.
    pub tool: &'static str,
    /// File name of the configured program.
    pub program: String,
    pub available: bool,
}

/// Resolves `program` to an existing file.
///
/// Paths with a directory component are checked as given. Bare names are
/// looked up on `PATH`.
pub fn locate(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }

    which::which(program).ok()
}

/// Availability of every configured tool.
pub fn check_tools(tools: &ToolsConfig) -> Vec<ToolStatus> {
    [
        ("ffmpeg", &tools.ffmpeg_path),
        ("seven_zip", &tools.seven_zip_path),
        ("libreoffice", &tools.libreoffice_path),
    ]
    .into_iter()
    .map(|(tool, path)| ToolStatus {
        tool,
        program: program_name(path),
        available: locate(path).is_some(),
    })
    .collect()
}
