use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use thiserror::Error;
use tracing::error;

use trial_types::status::TransitionError;

use crate::flash::{self, Level};

/// Business-rule failures a service can report. Everything except
/// `Internal` is an expected outcome shown to the user as a flash message.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Duplicate(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    /// Text safe to show the user. Internal errors are logged, not shown.
    pub fn user_message(&self) -> String {
        match self {
            Self::Internal(e) => {
                error!("Internal service error: {:#}", e);
                "A temporary error occurred. Please try again in a moment.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn flash_level(&self) -> Level {
        match self {
            Self::Duplicate(_) => Level::Warning,
            _ => Level::Error,
        }
    }

    /// Flash this error and redirect to `to`.
    pub fn redirect(&self, jar: CookieJar, to: &str) -> Response {
        let jar = flash::push(jar, self.flash_level(), self.user_message());
        (jar, Redirect::to(to)).into_response()
    }
}

/// Used by page handlers, where there is no sensible page to redirect to.
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::InvalidState(_) | Self::Duplicate(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.user_message()).into_response()
    }
}

impl From<TransitionError> for ServiceError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Campaign { .. } => Self::InvalidState(
                "This campaign has already closed recruitment or completed selection.".into(),
            ),
            TransitionError::ProposalDecided(_) => {
                Self::InvalidState("That application has already been decided.".into())
            }
        }
    }
}
