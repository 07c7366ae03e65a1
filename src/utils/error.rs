use crate::domain::model::Subsystem;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote API error at {endpoint}: {message}")]
    Remote { endpoint: String, message: String },

    #[error("No parcel found for identifier '{identifier}'")]
    NotFound { identifier: String },

    #[error("{subsystem} overlay lookup failed: {source}")]
    Resolution {
        subsystem: Subsystem,
        #[source]
        source: Box<ExtractError>,
    },

    #[error("No parcel identifiers supplied")]
    EmptyInput,

    #[error("Failed to load layer table '{path}': {message}")]
    LayerTable { path: String, message: String },

    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Lookup,
    Input,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ExtractError {
    pub fn remote(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_) | Self::Remote { .. } | Self::Resolution { .. } => ErrorCategory::Network,
            Self::NotFound { .. } | Self::LayerTable { .. } => ErrorCategory::Lookup,
            Self::EmptyInput => ErrorCategory::Input,
            Self::Config { .. } | Self::InvalidConfigValue { .. } | Self::MissingConfig { .. } => {
                ErrorCategory::Configuration
            }
            Self::Zip(_)
            | Self::Csv(_)
            | Self::Xlsx(_)
            | Self::Io(_)
            | Self::Serialization(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound { .. } => ErrorSeverity::Low,
            Self::Http(_) | Self::Remote { .. } | Self::Resolution { .. } => ErrorSeverity::Medium,
            Self::EmptyInput
            | Self::LayerTable { .. }
            | Self::Config { .. }
            | Self::InvalidConfigValue { .. }
            | Self::MissingConfig { .. } => ErrorSeverity::High,
            Self::Zip(_)
            | Self::Csv(_)
            | Self::Xlsx(_)
            | Self::Io(_)
            | Self::Serialization(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::Http(e) if e.is_timeout() => {
                "The planning API did not answer in time; raise --timeout-seconds or try again later"
            }
            Self::Http(_) | Self::Remote { .. } | Self::Resolution { .. } => {
                "Check network access to the planning API and that the base URL is correct"
            }
            Self::NotFound { .. } => "Check the lot/plan identifier, e.g. 2SP335900",
            Self::EmptyInput => "Enter at least one parcel number, separated by commas",
            Self::LayerTable { .. } => {
                "Make sure the layer register file exists and is a JSON array of {id, name} records"
            }
            Self::Config { .. } | Self::InvalidConfigValue { .. } | Self::MissingConfig { .. } => {
                "Review the command line flags or the TOML configuration file"
            }
            Self::Zip(_)
            | Self::Csv(_)
            | Self::Xlsx(_)
            | Self::Io(_)
            | Self::Serialization(_) => {
                "Check that the output directory is writable and has free space"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::EmptyInput => "Please enter at least one parcel number.".to_string(),
            Self::NotFound { identifier } => format!("Parcel {} was not found", identifier),
            Self::Resolution { subsystem, source } => {
                format!("Could not retrieve {} overlays: {}", subsystem, source)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error_keeps_source() {
        let err = ExtractError::Resolution {
            subsystem: Subsystem::Dams,
            source: Box::new(ExtractError::remote("/api/v1/dams_intersect/", "HTTP 502")),
        };

        assert_eq!(
            err.to_string(),
            "DAMS overlay lookup failed: Remote API error at /api/v1/dams_intersect/: HTTP 502"
        );
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_severity_ordering() {
        assert_eq!(ExtractError::EmptyInput.severity(), ErrorSeverity::High);
        assert!(
            ExtractError::NotFound {
                identifier: "1RP1".to_string()
            }
            .severity()
                < ExtractError::EmptyInput.severity()
        );
    }
}
