use thiserror::Error;

pub type RelayResult<T> = Result<T, RelayError>;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Tracking script not found (marker '{marker}')")]
    ScriptNotFound { marker: String },

    #[error("Tracking script has no query string: {src}")]
    MissingQuery { src: String },

    #[error("Pixel call failed on {platform}: {message}")]
    PixelCall { platform: String, message: String },

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),
}

impl RelayError {
    /// Shorthand for a failed call into a third-party pixel function.
    pub fn pixel_call(platform: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PixelCall {
            platform: platform.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = RelayError::pixel_call("facebook", "fbq threw");
        assert_eq!(err.to_string(), "Pixel call failed on facebook: fbq threw");

        let err = RelayError::ScriptNotFound {
            marker: "tracking-script".into(),
        };
        assert_eq!(
            err.to_string(),
            "Tracking script not found (marker 'tracking-script')"
        );
    }

    #[test]
    fn test_settings_error_converts() {
        let err: RelayError = config::ConfigError::Message("bad value".into()).into();
        assert!(matches!(err, RelayError::Settings(_)));
        assert_eq!(err.to_string(), "Settings error: bad value");
    }
}
