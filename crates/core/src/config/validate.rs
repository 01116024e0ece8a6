use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Output folder, when set, is absolute
/// - Archive limits and status buffer are at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if let Some(folder) = &config.output.folder {
        if !folder.is_absolute() {
            return Err(ConfigError::ValidationError(format!(
                "output.folder must be an absolute path, got {}",
                folder.display()
            )));
        }
    }

    if config.archive.max_depth == 0 {
        return Err(ConfigError::ValidationError(
            "archive.max_depth must be at least 1".to_string(),
        ));
    }

    if config.archive.max_extractions == 0 {
        return Err(ConfigError::ValidationError(
            "archive.max_extractions must be at least 1".to_string(),
        ));
    }

    if config.status.buffer_size == 0 {
        return Err(ConfigError::ValidationError(
            "status.buffer_size must be at least 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_relative_output_folder_fails() {
        let mut config = Config::default();
        config.output.folder = Some(PathBuf::from("relative/out"));
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("output.folder"));
    }

    #[test]
    fn test_validate_zero_archive_limits_fail() {
        let mut config = Config::default();
        config.archive.max_depth = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.archive.max_extractions = 0;
        assert!(validate_config(&config).is_err());
    }
}
