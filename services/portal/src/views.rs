//! Server-rendered pages. Every page carries an optional flash message shown
//! above its content by `base.html`.

use askama::Template;
use axum::response::Html;

use zerogate_auth_types::flash::Flash;

use crate::domain::types::BookingForm;
use crate::error::PortalError;

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupPage {
    pub flash: Option<Flash>,
    pub username: String,
    pub email: String,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub flash: Option<Flash>,
    pub identifier: String,
}

/// OTP entry page; `qr_code` and `secret` are set only right after enrollment.
#[derive(Template)]
#[template(path = "otp.html")]
pub struct OtpPage {
    pub flash: Option<Flash>,
    pub qr_code: Option<String>,
    pub secret: Option<String>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub flash: Option<Flash>,
    pub username: String,
    pub booking: BookingForm,
}

pub fn render<T: Template>(page: &T) -> Result<Html<String>, PortalError> {
    page.render()
        .map(Html)
        .map_err(|e| PortalError::Internal(e.into()))
}
