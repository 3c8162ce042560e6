use axum::extract::{Form, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use zerogate_auth_types::flash::{Flash, take_flash};
use zerogate_auth_types::identity::SessionUser;

use crate::domain::types::BookingForm;
use crate::error::PortalError;
use crate::handlers::redirect_with_flash;
use crate::state::AppState;
use crate::usecase::booking::SubmitBookingUseCase;
use crate::views::{IndexPage, render};

// ── GET / ─────────────────────────────────────────────────────────────────────

pub async fn index(
    State(state): State<AppState>,
    user: SessionUser,
    jar: CookieJar,
) -> Result<Response, PortalError> {
    let (jar, flash) = take_flash(jar, &state.cookie_options());
    let page = IndexPage {
        flash,
        username: user.username,
        booking: BookingForm::default(),
    };
    Ok((jar, render(&page)?).into_response())
}

// ── POST /submit-booking ──────────────────────────────────────────────────────

pub async fn submit_booking(
    State(state): State<AppState>,
    user: SessionUser,
    jar: CookieJar,
    Form(form): Form<BookingForm>,
) -> Result<Response, PortalError> {
    let usecase = SubmitBookingUseCase {
        bookings: state.booking_repo(),
    };

    match usecase.execute(user.user_id, form.clone()).await {
        Ok(_) => Ok(redirect_with_flash(
            jar,
            &state.cookie_options(),
            "/",
            Flash::success("Booking submitted successfully!"),
        )),
        Err(e) if e.is_user_facing() => {
            let page = IndexPage {
                flash: Some(Flash::error(e.to_string())),
                username: user.username,
                booking: form,
            };
            Ok(render(&page)?.into_response())
        }
        Err(e) => Err(e),
    }
}

// ── GET /submit-booking ───────────────────────────────────────────────────────

pub async fn submit_booking_redirect() -> Redirect {
    Redirect::to("/")
}
