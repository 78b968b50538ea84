//! Error types for readalong.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadAlongError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Script contract violations
    #[error("Script has no pages")]
    EmptyScript,

    #[error("Page {page} has no sentences")]
    EmptyPage { page: usize },

    #[error("Sentence {sentence} on page {page} has no words")]
    EmptySentence { page: usize, sentence: usize },

    // Story content
    #[error("Failed to parse story: {0}")]
    StoryParse(#[from] serde_json::Error),

    // Recognizer transport
    #[error("Transport error: {message}")]
    Transport { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ReadAlongError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_file_not_found_display() {
        let error = ReadAlongError::ConfigFileNotFound {
            path: "/path/to/config.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at /path/to/config.toml"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = ReadAlongError::ConfigInvalidValue {
            key: "focus.window_width".to_string(),
            message: "must be at least 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for focus.window_width: must be at least 1"
        );
    }

    #[test]
    fn test_script_contract_display() {
        assert_eq!(ReadAlongError::EmptyScript.to_string(), "Script has no pages");
        assert_eq!(
            ReadAlongError::EmptyPage { page: 3 }.to_string(),
            "Page 3 has no sentences"
        );
        assert_eq!(
            ReadAlongError::EmptySentence {
                page: 1,
                sentence: 2
            }
            .to_string(),
            "Sentence 2 on page 1 has no words"
        );
    }

    #[test]
    fn test_transport_display() {
        let error = ReadAlongError::Transport {
            message: "connection reset".to_string(),
        };
        assert_eq!(error.to_string(), "Transport error: connection reset");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "story missing");
        let error: ReadAlongError = io_error.into();
        assert!(error.to_string().contains("story missing"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: ReadAlongError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: ReadAlongError = json_error.into();
        assert!(error.to_string().starts_with("Failed to parse story"));
    }

    #[test]
    fn test_error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: ReadAlongError = io_error.into();
        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<ReadAlongError>();
        assert_sync::<ReadAlongError>();
    }
}
