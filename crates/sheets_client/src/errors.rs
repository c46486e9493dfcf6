use std::fmt;
use std::path::PathBuf;

use reqwest::StatusCode;

pub type Result<T, E = SheetsError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("Failed to read service account key '{}': {source}", path.display())]
    CredentialsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid service account key: {0}")]
    InvalidCredentials(String),

    #[error("Token request rejected ({status}): {message}")]
    TokenRejected { status: StatusCode, message: String },

    /// The remote service answered with a non-success status. The message is
    /// the remote's own.
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Failed to process json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to serialize request body to url encoded form: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error("Endpoint '{0}' cannot be used as a base url")]
    InvalidEndpoint(String),
}

/// Coarse classification of a [`SheetsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local key file missing or malformed, or the identity provider refused it.
    Credentials,
    /// The spreadsheet service rejected the request.
    Upstream,
    /// The remote could not be reached.
    Transport,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Credentials => "credentials",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Transport => "transport",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

impl SheetsError {
    pub fn upstream(status: StatusCode, message: impl Into<String>) -> Self {
        SheetsError::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SheetsError::CredentialsIo { .. }
            | SheetsError::InvalidCredentials(_)
            | SheetsError::TokenRejected { .. } => ErrorKind::Credentials,
            SheetsError::Upstream { .. } => ErrorKind::Upstream,
            SheetsError::Transport(_) => ErrorKind::Transport,
            SheetsError::Json(_)
            | SheetsError::Form(_)
            | SheetsError::Url(_)
            | SheetsError::InvalidEndpoint(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_is_unchanged() {
        let err = SheetsError::upstream(
            StatusCode::BAD_REQUEST,
            "Unable to parse range: Nope!A1",
        );
        assert_eq!("Unable to parse range: Nope!A1", err.to_string());
        assert_eq!(ErrorKind::Upstream, err.kind());
    }

    #[test]
    fn missing_key_file_is_credentials_failure() {
        let err = SheetsError::CredentialsIo {
            path: PathBuf::from("credentials.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(ErrorKind::Credentials, err.kind());
        assert!(err.to_string().contains("credentials.json"));
    }
}
