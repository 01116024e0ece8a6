//! Format capability tables.
//!
//! One read-only table per conversion domain, mapping a target-format token
//! to the recipe needed to drive the external tool for that domain. Tables
//! are built once on first use and shared by every batch.

pub mod archive;
pub mod document;
pub mod image;
pub mod media;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// A conversion domain. Each has its own table, output subdirectory and
/// status channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Media,
    Image,
    Archive,
    Document,
}

impl Domain {
    pub const ALL: [Domain; 4] = [Self::Media, Self::Image, Self::Archive, Self::Document];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Media => "media",
            Self::Image => "image",
            Self::Archive => "archive",
            Self::Document => "document",
        }
    }

    /// Name of the status channel for this domain, e.g. `archive:status`.
    pub fn status_channel(&self) -> String {
        format!("{}:status", self.as_str())
    }

    /// Subdirectory of the configured output folder.
    pub fn output_subdir(&self) -> &'static str {
        match self {
            Self::Media => "media",
            Self::Image => "images",
            Self::Archive => "archives",
            Self::Document => "documents",
        }
    }

    /// Target used when a request does not name one.
    pub fn default_target(&self) -> &'static str {
        match self {
            Self::Media => "mp4",
            Self::Image => "png",
            Self::Archive => "zip",
            Self::Document => "pdf",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "media" => Ok(Self::Media),
            "image" | "images" => Ok(Self::Image),
            "archive" | "archives" => Ok(Self::Archive),
            "document" | "documents" => Ok(Self::Document),
            other => Err(format!("Unknown domain: {}", other)),
        }
    }
}

/// A requested source/target combination that no table supports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UnsupportedFormat {
    pub domain: Domain,
    pub format: String,
    message: String,
}

impl UnsupportedFormat {
    /// Target token missing from the domain table.
    pub fn unknown_target(domain: Domain, format: impl Into<String>) -> Self {
        let format = format.into();
        Self {
            message: format!("Format {} is not supported", format),
            domain,
            format,
        }
    }

    /// Archive format that can be read but not produced.
    pub fn extract_only(format: impl Into<String>) -> Self {
        let format = format.into();
        Self {
            message: format!("Format {} can be extracted but not created", format),
            domain: Domain::Archive,
            format,
        }
    }

    /// Input extension the domain cannot read.
    pub fn unsupported_input(domain: Domain, extension: impl Into<String>) -> Self {
        let format = extension.into();
        Self {
            message: format!("Input format {} is not supported", format),
            domain,
            format,
        }
    }

    /// Target not in the allowed list for this input.
    pub fn not_allowed(domain: Domain, target: impl Into<String>, extension: &str) -> Self {
        let format = target.into();
        Self {
            message: format!("Target format {} is not allowed for {}", format, extension),
            domain,
            format,
        }
    }
}

/// Normalizes a format token for lookup.
pub fn normalize_token(token: &str) -> String {
    token.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Lower-cased last extension of a path, without the dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

/// Target tokens supported by a domain, sorted.
pub fn target_formats(domain: Domain) -> Vec<&'static str> {
    match domain {
        Domain::Media => media::formats(),
        Domain::Image => image::formats(),
        Domain::Archive => archive::creatable_formats(),
        Domain::Document => document::output_formats(),
    }
}
