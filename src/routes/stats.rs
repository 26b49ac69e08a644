//! Stats route — record totals and per-kind component counts.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use crate::routes::auth::AuthUser;
use crate::routes::error::ApiError;
use crate::services::component::ComponentKind;
use crate::state::AppState;

#[derive(Serialize)]
pub struct StatsResponse {
    pub total_components: i64,
    pub total_prompts: i64,
    /// Always carries all four kinds, zero-filled.
    pub components_by_kind: BTreeMap<ComponentKind, i64>,
}

/// `GET /api/stats` — summary counts for the dashboard.
pub async fn summary(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let total_components: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM components")
        .fetch_one(&state.pool)
        .await
        .map_err(db_error)?;
    let total_prompts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assembled_prompts")
        .fetch_one(&state.pool)
        .await
        .map_err(db_error)?;
    let counts = sqlx::query_as::<_, (String, i64)>(
        "SELECT kind, COUNT(*) FROM components GROUP BY kind",
    )
    .fetch_all(&state.pool)
    .await
    .map_err(db_error)?;

    let mut components_by_kind: BTreeMap<ComponentKind, i64> =
        ComponentKind::ALL.iter().map(|&kind| (kind, 0)).collect();
    for (kind, count) in counts {
        if let Some(kind) = ComponentKind::from_str(&kind) {
            components_by_kind.insert(kind, count);
        }
    }

    Ok(Json(StatsResponse { total_components, total_prompts, components_by_kind }))
}

fn db_error(err: sqlx::Error) -> ApiError {
    tracing::error!(error = %err, "stats query failed");
    ApiError::Internal
}
