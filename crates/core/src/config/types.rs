use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::tool::program_name;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub status: StatusConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_port() -> u16 {
    8080
}

/// Where converted files end up.
///
/// `folder` is the directory chosen during setup. Each domain writes into its
/// own subdirectory (`media`, `images`, `archives`, `documents`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub folder: Option<PathBuf>,
}

/// Paths and flags for the external command-line tools.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    #[serde(default = "default_seven_zip_path")]
    pub seven_zip_path: PathBuf,
    #[serde(default = "default_libreoffice_path")]
    pub libreoffice_path: PathBuf,
    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_ffmpeg_log_level")]
    pub ffmpeg_log_level: String,
    /// Per-invocation timeout in seconds. 0 disables the timeout.
    #[serde(default)]
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            seven_zip_path: default_seven_zip_path(),
            libreoffice_path: default_libreoffice_path(),
            ffmpeg_log_level: default_ffmpeg_log_level(),
            timeout_secs: 0,
        }
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_seven_zip_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("7za.exe")
    } else {
        PathBuf::from("7zz")
    }
}

fn default_libreoffice_path() -> PathBuf {
    PathBuf::from("soffice")
}

fn default_ffmpeg_log_level() -> String {
    "error".to_string()
}

/// Limits for recursive archive flattening.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiveConfig {
    /// Deepest archive-inside-archive nesting that will be expanded.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Upper bound on extraction passes for a single input.
    #[serde(default = "default_max_extractions")]
    pub max_extractions: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_extractions: default_max_extractions(),
        }
    }
}

fn default_max_depth() -> usize {
    32
}

fn default_max_extractions() -> usize {
    1024
}

/// Status channel configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusConfig {
    /// Capacity of the status event channel.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
        }
    }
}

fn default_buffer_size() -> usize {
    256
}

/// Config view returned by the API.
///
/// Tool paths are reduced to their file names so host layout is not exposed.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub output_folder_configured: bool,
    pub tools: SanitizedToolsConfig,
    pub archive: ArchiveConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedToolsConfig {
    pub ffmpeg: String,
    pub seven_zip: String,
    pub libreoffice: String,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            output_folder_configured: config.output.folder.is_some(),
            tools: SanitizedToolsConfig {
                ffmpeg: program_name(&config.tools.ffmpeg_path),
                seven_zip: program_name(&config.tools.seven_zip_path),
                libreoffice: program_name(&config.tools.libreoffice_path),
                timeout_secs: config.tools.timeout_secs,
            },
            archive: config.archive.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert!(config.output.folder.is_none());
        assert_eq!(config.tools.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.tools.libreoffice_path, PathBuf::from("soffice"));
        assert_eq!(config.tools.timeout_secs, 0);
        assert_eq!(config.archive.max_depth, 32);
        assert_eq!(config.archive.max_extractions, 1024);
        assert_eq!(config.status.buffer_size, 256);
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000

[output]
folder = "/home/user/Converted"

[tools]
ffmpeg_path = "/usr/local/bin/ffmpeg"
seven_zip_path = "/opt/7zip/7zz"
libreoffice_path = "/usr/bin/libreoffice"
ffmpeg_log_level = "warning"
timeout_secs = 600

[archive]
max_depth = 4
max_extractions = 50
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.output.folder,
            Some(PathBuf::from("/home/user/Converted"))
        );
        assert_eq!(config.tools.seven_zip_path, PathBuf::from("/opt/7zip/7zz"));
        assert_eq!(config.tools.ffmpeg_log_level, "warning");
        assert_eq!(config.tools.timeout_secs, 600);
        assert_eq!(config.archive.max_depth, 4);
        assert_eq!(config.archive.max_extractions, 50);
    }

    #[test]
    fn test_sanitized_config_hides_tool_directories() {
        let mut config = Config::default();
        config.tools.ffmpeg_path = PathBuf::from("/opt/secret/bin/ffmpeg");
        config.output.folder = Some(PathBuf::from("/data/out"));

        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.tools.ffmpeg, "ffmpeg");
        assert!(sanitized.output_folder_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("/opt/secret"));
    }
}
