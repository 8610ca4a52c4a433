//! # Design
//!
//! - Keep error messages constant; store operational context in fields.
//! - Distinguish an explicit `Forbidden` answer from other HTTP failures so callers can hint at
//!   the Web UI authentication settings.

use thiserror::Error;

/// Result alias for qBittorrent adapter operations.
pub type QbitResult<T> = Result<T, QbitError>;

/// Errors raised while talking to the qBittorrent Web API.
#[derive(Debug, Error)]
pub enum QbitError {
    /// The configured base URL could not be parsed or joined.
    #[error("invalid download client url")]
    InvalidUrl {
        /// Offending value.
        value: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
    /// Building the HTTP client failed.
    #[error("failed to build http client")]
    ClientBuild {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The request could not be sent or its body could not be read.
    #[error("download client request failed")]
    Request {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The client refused access.
    #[error("download client refused access")]
    Forbidden {
        /// Operation identifier.
        operation: &'static str,
    },
    /// The client answered with a non-success status.
    #[error("download client returned an error status")]
    Status {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, trimmed.
        body: String,
    },
    /// The torrent listing was not valid JSON.
    #[error("failed to decode download client response")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// A torrent entry lacked a required field or carried the wrong type.
    #[error("malformed torrent entry")]
    MalformedTorrent {
        /// Position of the entry in the listing.
        index: usize,
        /// Field that was missing or mistyped.
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_constant() {
        let forbidden = QbitError::Forbidden {
            operation: "torrents.info",
        };
        assert_eq!(forbidden.to_string(), "download client refused access");

        let malformed = QbitError::MalformedTorrent {
            index: 2,
            field: "hash",
        };
        assert_eq!(malformed.to_string(), "malformed torrent entry");
    }
}
