use http::StatusCode;
use jsonwebtoken::errors::ErrorKind;

use crate::response::{IntoResponse, Response};

/// Why a request failed authentication, or why a token could not be issued.
///
/// Every verification failure ends the request at the gate with a `401` and a
/// JSON `{"error": ...}` body. The body never says more than
/// [`message`](AuthError::message); the `Display` text is for logs.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no bearer token in header or cookie")]
    MissingCredential,
    #[error("token is not a well-formed JWT")]
    InvalidToken,
    #[error("token signature does not verify")]
    InvalidSignature,
    #[error("token signed with an unexpected algorithm")]
    UnsupportedAlgorithm,
    #[error("token expired")]
    Expired,
    #[error("token has no string identity claim")]
    MalformedClaims,
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Client-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingCredential => "Authorization required. Please sign in.",
            Self::InvalidToken
            | Self::InvalidSignature
            | Self::UnsupportedAlgorithm
            | Self::Expired => "Invalid or expired token",
            Self::MalformedClaims => "Invalid user ID in token",
            Self::Signing(_) => "Failed to generate token",
        }
    }
}

/// Maps verification failures. Signing failures are wrapped explicitly in
/// [`AuthError::Signing`] at the call site.
impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => Self::UnsupportedAlgorithm,
            ErrorKind::MissingRequiredClaim(_) => Self::MalformedClaims,
            _ => Self::InvalidToken,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        Response::error(self.status(), self.message())
    }
}
