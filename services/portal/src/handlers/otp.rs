use axum::extract::{Form, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use zerogate_auth_types::cookie::{PENDING_COOKIE, clear_cookie, set_session_cookie};
use zerogate_auth_types::flash::{Flash, take_flash};

use crate::domain::repository::PendingLoginStore;
use crate::error::PortalError;
use crate::handlers::{pending_id, redirect_with_flash, restart_login};
use crate::state::AppState;
use crate::usecase::otp::{Provisioning, ProvisionDeviceUseCase, VerifyOtpUseCase};
use crate::views::{OtpPage, render};

const OTP_VERIFY_PATH: &str = "/otp/verify";

// ── GET /otp ──────────────────────────────────────────────────────────────────

/// Enroll an authenticator on first visit, otherwise go straight to code entry.
pub async fn otp_setup(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, PortalError> {
    let opts = state.cookie_options();
    let Some(pending_id) = pending_id(&jar) else {
        return Ok(restart_login(jar, &opts, &PortalError::PendingLoginMissing));
    };

    let usecase = ProvisionDeviceUseCase {
        users: state.user_repo(),
        devices: state.device_repo(),
        pending: state.pending_store(),
        totp: state.totp.clone(),
    };

    match usecase.execute(&pending_id).await {
        Ok(Provisioning::Enrolled {
            qr_code, secret, ..
        }) => {
            let (jar, flash) = take_flash(jar, &opts);
            let page = OtpPage {
                flash,
                qr_code: Some(qr_code),
                secret: Some(secret),
            };
            Ok((jar, render(&page)?).into_response())
        }
        Ok(Provisioning::AlreadyEnrolled) => Ok(Redirect::to(OTP_VERIFY_PATH).into_response()),
        Err(e @ (PortalError::PendingLoginMissing | PortalError::PendingUserMissing)) => {
            Ok(restart_login(jar, &opts, &e))
        }
        Err(e) => Err(e),
    }
}

// ── GET /otp/verify ───────────────────────────────────────────────────────────

pub async fn otp_verify_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, PortalError> {
    let opts = state.cookie_options();
    let Some(pending_id) = pending_id(&jar) else {
        return Ok(restart_login(jar, &opts, &PortalError::PendingLoginMissing));
    };
    if state.pending_store().get(&pending_id).await?.is_none() {
        return Ok(restart_login(jar, &opts, &PortalError::PendingLoginMissing));
    }

    let (jar, flash) = take_flash(jar, &opts);
    let page = OtpPage {
        flash,
        qr_code: None,
        secret: None,
    };
    Ok((jar, render(&page)?).into_response())
}

// ── POST /otp/verify ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct OtpForm {
    #[serde(default)]
    pub otp: String,
}

pub async fn otp_verify(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<OtpForm>,
) -> Result<Response, PortalError> {
    let opts = state.cookie_options();
    let Some(pending_id) = pending_id(&jar) else {
        return Ok(restart_login(jar, &opts, &PortalError::PendingLoginMissing));
    };

    let usecase = VerifyOtpUseCase {
        users: state.user_repo(),
        devices: state.device_repo(),
        pending: state.pending_store(),
        totp: state.totp.clone(),
        session_secret: state.config.session_secret.clone(),
        session_ttl_secs: state.config.session_ttl_secs,
    };

    match usecase.execute(&pending_id, &form.otp).await {
        Ok(verified) => {
            let jar = clear_cookie(jar, PENDING_COOKIE, &opts);
            let jar = set_session_cookie(
                jar,
                verified.session_token,
                state.config.session_ttl_secs,
                &opts,
            );
            Ok(redirect_with_flash(
                jar,
                &opts,
                "/",
                Flash::success("Login successful!"),
            ))
        }
        Err(e @ PortalError::InvalidOtp) => {
            let page = OtpPage {
                flash: Some(Flash::error(e.to_string())),
                qr_code: None,
                secret: None,
            };
            Ok(render(&page)?.into_response())
        }
        Err(e @ PortalError::DeviceMissing) => Ok(redirect_with_flash(
            jar,
            &opts,
            "/otp",
            Flash::error(e.to_string()),
        )),
        Err(e @ (PortalError::PendingLoginMissing | PortalError::PendingUserMissing)) => {
            Ok(restart_login(jar, &opts, &e))
        }
        Err(e) => Err(e),
    }
}
