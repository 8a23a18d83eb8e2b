//! Error types for API calls and entity construction.

use serde::Deserialize;
use thiserror::Error;

use crate::transport::TransportError;

/// One `{code, message}` entry of a backend `MutationError`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MutationErrorEntry {
    /// Backend error code (free-form; the site uses strings and integers).
    #[serde(default, deserialize_with = "crate::api::response::lenient_string")]
    pub code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

impl std::fmt::Display for MutationErrorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Errors raised by the session facade and entity constructors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request itself failed (network, status, undecodable body).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An entity could not be resolved to a usable payload.
    #[error("{input} not found: {reason}")]
    NotFound {
        /// What the caller asked for (id, URL or "payload").
        input: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The backend answered 200 with a `MutationError` instead of data.
    #[error("{} rejected by backend: {}", .operation, format_entries(.errors))]
    Mutation {
        /// GraphQL operation name.
        operation: &'static str,
        /// Every error the backend reported.
        errors: Vec<MutationErrorEntry>,
    },

    /// The response did not have the shape the operation expects.
    #[error("malformed {operation} response: {detail}")]
    MalformedResponse {
        /// GraphQL operation name.
        operation: &'static str,
        /// What was missing or wrong.
        detail: String,
    },

    /// The login page reported rejected credentials.
    #[error("login failed for {username}: check your credentials")]
    LoginFailed {
        /// The rejected username.
        username: String,
    },
}

impl ApiError {
    /// Creates a not-found error.
    pub fn not_found(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotFound {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            operation,
            detail: detail.into(),
        }
    }

    /// Returns true for [`ApiError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn format_entries(errors: &[MutationErrorEntry]) -> String {
    if errors.is_empty() {
        return "no details".to_string();
    }
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_error_lists_every_entry() {
        let error = ApiError::Mutation {
            operation: "getAlbumInfo",
            errors: vec![
                MutationErrorEntry {
                    code: "404".to_string(),
                    message: "Album not found".to_string(),
                },
                MutationErrorEntry {
                    code: "perm".to_string(),
                    message: "Login required".to_string(),
                },
            ],
        };
        let msg = error.to_string();
        assert!(msg.contains("getAlbumInfo"), "{msg}");
        assert!(msg.contains("[404] Album not found"), "{msg}");
        assert!(msg.contains("[perm] Login required"), "{msg}");
    }

    #[test]
    fn test_not_found_display_and_predicate() {
        let error = ApiError::not_found("album 42", "no payload");
        assert_eq!(error.to_string(), "album 42 not found: no payload");
        assert!(error.is_not_found());
        assert!(!ApiError::malformed("x", "y").is_not_found());
    }

    #[test]
    fn test_login_failed_display() {
        let error = ApiError::LoginFailed {
            username: "reader".to_string(),
        };
        assert!(error.to_string().contains("reader"));
    }
}
