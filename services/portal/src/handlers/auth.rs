use axum::extract::{Form, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use zerogate_auth_types::cookie::{SESSION_COOKIE, clear_auth_cookies, clear_cookie, set_pending_cookie};
use zerogate_auth_types::flash::{Flash, take_flash};
use zerogate_auth_types::identity::{LOGIN_PATH, SessionUser};

use crate::domain::repository::PendingLoginStore;
use crate::error::PortalError;
use crate::handlers::{pending_id, redirect_with_flash};
use crate::state::AppState;
use crate::usecase::login::{LoginInput, LoginUseCase};
use crate::usecase::signup::{SignupInput, SignupUseCase};
use crate::views::{LoginPage, SignupPage, render};

// ── GET /signup ───────────────────────────────────────────────────────────────

pub async fn signup_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, PortalError> {
    let (jar, flash) = take_flash(jar, &state.cookie_options());
    let page = SignupPage {
        flash,
        username: String::new(),
        email: String::new(),
    };
    Ok((jar, render(&page)?).into_response())
}

// ── POST /signup ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<Response, PortalError> {
    let usecase = SignupUseCase {
        users: state.user_repo(),
    };
    let input = SignupInput {
        username: form.username.clone(),
        email: form.email.clone(),
        password: form.password,
    };

    match usecase.execute(input).await {
        Ok(_) => Ok(redirect_with_flash(
            jar,
            &state.cookie_options(),
            LOGIN_PATH,
            Flash::success("Account created successfully! Please log in."),
        )),
        Err(e) if e.is_user_facing() => {
            let page = SignupPage {
                flash: Some(Flash::error(e.to_string())),
                username: form.username,
                email: form.email,
            };
            Ok(render(&page)?.into_response())
        }
        Err(e) => Err(e),
    }
}

// ── GET /login ────────────────────────────────────────────────────────────────

pub async fn login_page(
    State(state): State<AppState>,
    user: Option<SessionUser>,
    jar: CookieJar,
) -> Result<Response, PortalError> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let (jar, flash) = take_flash(jar, &state.cookie_options());
    let page = LoginPage {
        flash,
        identifier: String::new(),
    };
    Ok((jar, render(&page)?).into_response())
}

// ── POST /login ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginForm {
    /// Email address or username.
    #[serde(default, alias = "email", alias = "username")]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, PortalError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        pending: state.pending_store(),
        pending_ttl_secs: state.config.pending_login_ttl_secs,
    };
    let input = LoginInput {
        identifier: form.identifier.clone(),
        password: form.password,
    };

    match usecase.execute(input).await {
        Ok(output) => {
            let opts = state.cookie_options();
            // A stale session must not outlive a fresh password step.
            let jar = clear_cookie(jar, SESSION_COOKIE, &opts);
            let jar = set_pending_cookie(
                jar,
                output.pending_id,
                state.config.pending_login_ttl_secs,
                &opts,
            );
            Ok((jar, Redirect::to("/otp")).into_response())
        }
        Err(e) if e.is_user_facing() => {
            let page = LoginPage {
                flash: Some(Flash::error(e.to_string())),
                identifier: form.identifier,
            };
            Ok(render(&page)?.into_response())
        }
        Err(e) => Err(e),
    }
}

// ── GET /logout ───────────────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    user: Option<SessionUser>,
    jar: CookieJar,
) -> Response {
    if let Some(id) = pending_id(&jar) {
        // Best effort: the marker expires on its own if Redis is unreachable.
        if let Err(e) = state.pending_store().take(&id).await {
            tracing::warn!(error = %e, "failed to drop pending login on logout");
        }
    }

    let opts = state.cookie_options();
    let jar = clear_auth_cookies(jar, &opts);
    match user {
        Some(user) => {
            tracing::info!(user_id = %user.user_id, "user logged out");
            let flash = Flash::info(format!(
                "Goodbye, {}! You've been logged out.",
                user.username
            ));
            redirect_with_flash(jar, &opts, LOGIN_PATH, flash)
        }
        None => (jar, Redirect::to(LOGIN_PATH)).into_response(),
    }
}
