//! Saved prompt routes — CRUD plus the assemble preview endpoint.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::routes::error::ApiError;
use crate::services::prompt::{self, AssembledPrompt, NewPrompt, PromptRefs};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PromptBody {
    pub name: String,
    pub context_id: Option<Uuid>,
    pub instructions_id: Option<Uuid>,
    pub details_id: Option<Uuid>,
    pub input_id: Option<Uuid>,
    pub final_text: Option<String>,
}

impl PromptBody {
    fn into_new_prompt(self) -> NewPrompt {
        NewPrompt {
            name: self.name,
            refs: PromptRefs {
                context_id: self.context_id,
                instructions_id: self.instructions_id,
                details_id: self.details_id,
                input_id: self.input_id,
            },
            final_text: self.final_text,
        }
    }
}

/// `GET /api/prompts` — list saved prompts with resolved references.
pub async fn list_prompts(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<AssembledPrompt>>, ApiError> {
    let prompts = prompt::list_prompts(&state.pool).await?;
    Ok(Json(prompts))
}

/// `POST /api/prompts` — save an assembled prompt.
pub async fn create_prompt(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(body): Json<PromptBody>,
) -> Result<(StatusCode, Json<AssembledPrompt>), ApiError> {
    let created = prompt::create_prompt(&state.pool, body.into_new_prompt()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/prompts/:id` — fetch one saved prompt.
pub async fn get_prompt(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AssembledPrompt>, ApiError> {
    let found = prompt::get_prompt(&state.pool, id).await?;
    Ok(Json(found))
}

/// `PUT /api/prompts/:id` — replace a saved prompt's fields.
pub async fn update_prompt(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<PromptBody>,
) -> Result<Json<AssembledPrompt>, ApiError> {
    let updated = prompt::update_prompt(&state.pool, id, body.into_new_prompt()).await?;
    Ok(Json(updated))
}

/// `DELETE /api/prompts/:id` — delete a saved prompt.
pub async fn delete_prompt(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    prompt::delete_prompt(&state.pool, id).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// =============================================================================
// PREVIEW
// =============================================================================

#[derive(Deserialize)]
pub struct PreviewBody {
    pub context_id: Option<Uuid>,
    pub instructions_id: Option<Uuid>,
    pub details_id: Option<Uuid>,
    pub input_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub text: String,
    pub chars: usize,
    pub lines: usize,
}

/// `POST /api/assemble` — assemble the selection without saving it.
pub async fn preview(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(body): Json<PreviewBody>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let refs = PromptRefs {
        context_id: body.context_id,
        instructions_id: body.instructions_id,
        details_id: body.details_id,
        input_id: body.input_id,
    };
    let text = prompt::preview_text(&state.pool, refs).await?;
    let chars = text.chars().count();
    let lines = if text.is_empty() { 0 } else { text.lines().count() };
    Ok(Json(PreviewResponse { text, chars, lines }))
}

#[cfg(test)]
#[path = "prompts_test.rs"]
mod tests;
