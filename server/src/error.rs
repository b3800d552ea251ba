use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tally_types::ValidationError;
use thiserror::Error;
use tracing::{error, warn};

/// Every way a request can fail. Each variant maps to one HTTP answer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or expired session; the client is sent to the login page.
    #[error("authentication required")]
    Unauthenticated,
    #[error("Invalid username or password")]
    InvalidCredentials,
    /// Authenticated, but not the organizer.
    #[error("{0}")]
    Forbidden(&'static str),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("internal storage error")]
    Storage(#[source] tally_ledger::Error),
    #[error("internal error")]
    Internal(&'static str),
}

impl From<tally_ledger::Error> for ApiError {
    fn from(e: tally_ledger::Error) -> Self {
        match e {
            tally_ledger::Error::Validation(e) => Self::Validation(e),
            e => Self::Storage(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => Redirect::to("/login").into_response(),
            Self::InvalidCredentials => (StatusCode::FORBIDDEN, self.to_string()).into_response(),
            Self::Forbidden(reason) => {
                warn!(reason, "request denied");
                (StatusCode::FORBIDDEN, reason).into_response()
            }
            Self::Validation(e) => {
                warn!(error = %e, "request rejected");
                (StatusCode::BAD_REQUEST, e.to_string()).into_response()
            }
            Self::Storage(ref e) => {
                error!(error = %e, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
            Self::Internal(context) => {
                error!(context, "internal failure");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}
