use std::path::PathBuf;

use thiserror::Error;

use crate::{exit_codes::HoundExitCode, model::ResourceKind};

/// Errors produced by the resource client layer.
///
/// Every operation in [`crate::session`], [`crate::transport`],
/// [`crate::synthesizer`] and [`crate::resources`] returns these as values.
/// Only the CLI boundary decides whether an error terminates the process.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The supplied bearer token does not look like a JWT
    #[error("invalid JWT format: expected three dot-separated segments")]
    CredentialFormat,

    /// The token source could not produce a value at all
    #[error("failed to read the bearer token: {0}")]
    CredentialUnavailable(String),

    /// DNS, TLS, connection or timeout failure; no HTTP status is available
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a status code of 400 or above
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// A node type upload collided with existing kind names (HTTP 409)
    #[error("kind name conflict for {}: {detail}", .names.join(", "))]
    Conflict { names: Vec<String>, detail: String },

    #[error("{} '{key}' not found: {cause}", .kind.label())]
    NotFound {
        kind: ResourceKind,
        key: String,
        cause: String,
    },

    #[error("file error on {path:?}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON, CSV or archive input, or an undecodable response body
    #[error("format error: {0}")]
    Format(String),

    /// Required fields are missing from a synthesized or fetched document
    #[error("validation error: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ClientError::FileIo {
            path: path.into(),
            source,
        }
    }

    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Conflict { .. } => Some(409),
            _ => None,
        }
    }

    /// Credential errors cannot be recovered from within the process
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClientError::CredentialFormat | ClientError::CredentialUnavailable(_)
        )
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> HoundExitCode {
        match self {
            ClientError::CredentialFormat | ClientError::CredentialUnavailable(_) => {
                HoundExitCode::AuthError
            }
            ClientError::Network(_) => HoundExitCode::NetworkError,
            ClientError::Http { status, .. } if *status == 401 || *status == 403 => {
                HoundExitCode::AuthError
            }
            ClientError::Http { .. } => HoundExitCode::ApiError,
            ClientError::Conflict { .. } => HoundExitCode::Conflict,
            ClientError::NotFound { .. } => HoundExitCode::NotFound,
            ClientError::FileIo { .. } => HoundExitCode::IoError,
            ClientError::Format(_) | ClientError::Validation(_) => HoundExitCode::DataError,
            ClientError::Configuration(_) => HoundExitCode::ConfigError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_lists_names() {
        let error = ClientError::Conflict {
            names: vec!["Printer".to_string(), "Scanner".to_string()],
            detail: "already exists".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "kind name conflict for Printer, Scanner: already exists"
        );
        assert_eq!(error.status(), Some(409));
        assert_eq!(error.exit_code(), HoundExitCode::Conflict);
    }

    #[test]
    fn test_credential_errors_are_fatal() {
        assert!(ClientError::CredentialFormat.is_fatal());
        assert!(!ClientError::Validation("x".to_string()).is_fatal());
        assert_eq!(
            ClientError::CredentialFormat.exit_code(),
            HoundExitCode::AuthError
        );
    }

    #[test]
    fn test_not_found_uses_readable_kind() {
        let error = ClientError::NotFound {
            kind: ResourceKind::CypherQuery,
            key: "42".to_string(),
            cause: "HTTP 404: missing".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "saved query '42' not found: HTTP 404: missing"
        );
        assert_eq!(error.exit_code(), HoundExitCode::NotFound);
    }

    #[test]
    fn test_unauthorized_maps_to_auth_exit_code() {
        let error = ClientError::Http {
            status: 401,
            body: String::new(),
        };
        assert_eq!(error.exit_code(), HoundExitCode::AuthError);
        let error = ClientError::Http {
            status: 500,
            body: String::new(),
        };
        assert_eq!(error.exit_code(), HoundExitCode::ApiError);
    }
}
