//! Result and error types for renderlottie.

use thiserror::Error;

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering an animation
#[derive(Debug, Error)]
pub enum RenderError {
    /// Invalid or conflicting configuration, detected before any browser
    /// or subprocess is started
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Malformed animation data (missing or invalid frame rate, width, height)
    #[error("Invalid animation data: {message}")]
    Animation {
        /// Error message
        message: String,
    },

    /// Browser launch or shutdown error
    #[error("Browser error: {message}")]
    Browser {
        /// Error message
        message: String,
    },

    /// Page-level error (creation, content, close)
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// In-page script evaluation failed
    #[error("Script evaluation failed: {message}")]
    Evaluation {
        /// Error message
        message: String,
    },

    /// Frame capture failed
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// An encoder subprocess could not be started
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// An encoder subprocess exited with a non-zero status
    #[error("{program} exited with {status}: {stderr}")]
    Encoder {
        /// Program that failed
        program: String,
        /// Exit status description
        status: String,
        /// Captured stderr output
        stderr: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an animation data error
    #[must_use]
    pub fn animation(message: impl Into<String>) -> Self {
        Self::Animation {
            message: message.into(),
        }
    }

    /// Create a browser error
    #[must_use]
    pub fn browser(message: impl Into<String>) -> Self {
        Self::Browser {
            message: message.into(),
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::Page {
            message: message.into(),
        }
    }

    /// Create an evaluation error
    #[must_use]
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    /// Create a screenshot error
    #[must_use]
    pub fn screenshot(message: impl Into<String>) -> Self {
        Self::Screenshot {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = RenderError::config("both animationData and path given");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("animationData"));
    }

    #[test]
    fn test_animation_error_display() {
        let err = RenderError::animation("missing frame rate");
        assert!(err.to_string().contains("Invalid animation data"));
    }

    #[test]
    fn test_encoder_error_display() {
        let err = RenderError::Encoder {
            program: "ffmpeg".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "pipe:0: Invalid data".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ffmpeg"));
        assert!(msg.contains("Invalid data"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: RenderError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
