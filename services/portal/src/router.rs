use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use zerogate_core::health::{healthz, readyz};
use zerogate_core::middleware::{AllowedHosts, enforce_allowed_hosts, request_id_layer};

use crate::handlers::{
    auth::{login, login_page, logout, signup, signup_page},
    booking::{index, submit_booking, submit_booking_redirect},
    otp::{otp_setup, otp_verify, otp_verify_page},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let allowed_hosts = Arc::new(AllowedHosts::new(
        state.config.allowed_hosts.iter().cloned(),
    ));

    let pages = Router::new()
        // Registration
        .route("/signup", get(signup_page).post(signup))
        // Password step
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        // Second factor
        .route("/otp", get(otp_setup))
        .route("/otp/verify", get(otp_verify_page).post(otp_verify))
        // Protected
        .route("/", get(index))
        .route(
            "/submit-booking",
            get(submit_booking_redirect).post(submit_booking),
        )
        .route_layer(middleware::from_fn_with_state(
            allowed_hosts,
            enforce_allowed_hosts,
        ));

    Router::new()
        // Health checks bypass the host allow-list
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .merge(pages)
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
