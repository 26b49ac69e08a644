//! Router assembly.
//!
//! All `/api` routes except `/api/login` and `/api/logout` require the
//! signed session cookie, enforced per-handler through the `AuthUser`
//! extractor. Logout stays open so an expired session can still clear its
//! cookie; `/healthz` stays open for liveness probes.

pub mod auth;
pub mod components;
pub mod error;
pub mod prompts;
pub mod stats;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route(
            "/api/components",
            get(components::list_components).post(components::create_component),
        )
        .route("/api/components/grouped", get(components::grouped_components))
        .route(
            "/api/components/{id}",
            get(components::get_component)
                .put(components::update_component)
                .delete(components::delete_component),
        )
        .route("/api/assemble", post(prompts::preview))
        .route(
            "/api/prompts",
            get(prompts::list_prompts).post(prompts::create_prompt),
        )
        .route(
            "/api/prompts/{id}",
            get(prompts::get_prompt)
                .put(prompts::update_prompt)
                .delete(prompts::delete_prompt),
        )
        .route("/api/stats", get(stats::summary))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
