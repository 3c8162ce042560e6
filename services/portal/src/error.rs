use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::domain::password::PasswordErrors;

/// Portal error variants. The `Display` text is what the user sees in a flash
/// message or re-rendered form.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("All fields are required.")]
    MissingFields,
    #[error("Email is already taken.")]
    EmailTaken,
    #[error("A user with that username already exists.")]
    UsernameTaken,
    #[error("Enter a valid email address.")]
    InvalidEmail,
    #[error("{0}")]
    WeakPassword(PasswordErrors),
    #[error("Incorrect email or password. Please try again.")]
    InvalidCredentials,
    #[error("Invalid OTP. Please try again.")]
    InvalidOtp,
    #[error("Please log in first.")]
    PendingLoginMissing,
    #[error("Invalid session. Please log in again.")]
    PendingUserMissing,
    #[error("No OTP device found. Please set up OTP first.")]
    DeviceMissing,
    #[error("All fields except message are required.")]
    MissingBookingFields,
    #[error("Phone number must be 11 digits.")]
    InvalidPhone,
    #[error("Enter a valid date.")]
    InvalidDate,
    #[error("Enter a valid time.")]
    InvalidTime,
    #[error("An error occurred while submitting your booking. Please try again.")]
    BookingFailed,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl PortalError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingFields => "MISSING_FIELDS",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidOtp => "INVALID_OTP",
            Self::PendingLoginMissing => "PENDING_LOGIN_MISSING",
            Self::PendingUserMissing => "PENDING_USER_MISSING",
            Self::DeviceMissing => "DEVICE_MISSING",
            Self::MissingBookingFields => "MISSING_BOOKING_FIELDS",
            Self::InvalidPhone => "INVALID_PHONE",
            Self::InvalidDate => "INVALID_DATE",
            Self::InvalidTime => "INVALID_TIME",
            Self::BookingFailed => "BOOKING_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether the error is the user's to fix (shown back on the form) rather
    /// than a server fault.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::PendingLoginMissing | Self::PendingUserMissing => StatusCode::UNAUTHORIZED,
            Self::InvalidCredentials | Self::InvalidOtp => StatusCode::UNAUTHORIZED,
            Self::EmailTaken | Self::UsernameTaken => StatusCode::CONFLICT,
            Self::DeviceMissing => StatusCode::NOT_FOUND,
            Self::BookingFailed | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        // TraceLayer records every request; only the anyhow chain of a 500 is worth logging.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = format!(
            "<!DOCTYPE html><html><body><p class=\"{}\">{}</p></body></html>",
            self.kind(),
            self
        );
        (status, Html(body)).into_response()
    }
}
