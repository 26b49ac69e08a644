//! Saved prompt store — CRUD over assembled prompts with resolved references.
//!
//! DESIGN
//! ======
//! A saved prompt stores its final text as a plain column captured at save
//! time. Reads never re-derive it, so later edits to a referenced component
//! leave existing prompts untouched. References are resolved to full
//! component records for display on every read.
//!
//! ERROR HANDLING
//! ==============
//! Reference problems (unknown ID, kind not matching its slot) are caller
//! errors surfaced before any write happens.

use serde::Serialize;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::services::assembly::{self, Selection};
use crate::services::component::{self, Component, ComponentError, ComponentKind};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("{0}")]
    Invalid(&'static str),
    #[error("referenced {0} component not found")]
    MissingReference(ComponentKind),
    #[error("referenced component is not of kind {0}")]
    KindMismatch(ComponentKind),
    #[error("prompt not found: {0}")]
    NotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ComponentError> for PromptError {
    fn from(err: ComponentError) -> Self {
        match err {
            ComponentError::Database(e) => Self::Database(e),
            ComponentError::Invalid(msg) => Self::Invalid(msg),
            ComponentError::NotFound(_) => Self::Invalid("invalid component reference"),
        }
    }
}

/// Optional component references, at most one per kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptRefs {
    pub context_id: Option<Uuid>,
    pub instructions_id: Option<Uuid>,
    pub details_id: Option<Uuid>,
    pub input_id: Option<Uuid>,
}

impl PromptRefs {
    #[must_use]
    pub fn id_for(&self, kind: ComponentKind) -> Option<Uuid> {
        match kind {
            ComponentKind::Context => self.context_id,
            ComponentKind::Instructions => self.instructions_id,
            ComponentKind::Details => self.details_id,
            ComponentKind::Input => self.input_id,
        }
    }

    fn ids(&self) -> Vec<Uuid> {
        ComponentKind::ALL
            .iter()
            .filter_map(|&kind| self.id_for(kind))
            .collect()
    }
}

/// Caller-supplied fields for create and update. When `final_text` is
/// omitted it is assembled server-side from the referenced components.
#[derive(Debug, Clone)]
pub struct NewPrompt {
    pub name: String,
    pub refs: PromptRefs,
    pub final_text: Option<String>,
}

/// A saved prompt with its references resolved for display.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledPrompt {
    pub id: Uuid,
    pub name: String,
    pub final_text: String,
    pub context_id: Option<Uuid>,
    pub instructions_id: Option<Uuid>,
    pub details_id: Option<Uuid>,
    pub input_id: Option<Uuid>,
    pub context: Option<Component>,
    pub instructions: Option<Component>,
    pub details: Option<Component>,
    pub input: Option<Component>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

type PromptRow = (
    Uuid,
    String,
    String,
    Option<Uuid>,
    Option<Uuid>,
    Option<Uuid>,
    Option<Uuid>,
    OffsetDateTime,
    OffsetDateTime,
);

const PROMPT_COLUMNS: &str =
    "id, name, final_text, context_id, instructions_id, details_id, input_id, created_at, updated_at";

// =============================================================================
// REFERENCE RESOLUTION
// =============================================================================

/// Referenced components loaded and kind-checked, one slot per kind.
#[derive(Debug, Default)]
struct LoadedRefs {
    context: Option<Component>,
    instructions: Option<Component>,
    details: Option<Component>,
    input: Option<Component>,
}

impl LoadedRefs {
    fn slot_mut(&mut self, kind: ComponentKind) -> &mut Option<Component> {
        match kind {
            ComponentKind::Context => &mut self.context,
            ComponentKind::Instructions => &mut self.instructions,
            ComponentKind::Details => &mut self.details,
            ComponentKind::Input => &mut self.input,
        }
    }

    fn selection(&self) -> Selection<'_> {
        Selection {
            context: self.context.as_ref(),
            instructions: self.instructions.as_ref(),
            details: self.details.as_ref(),
            input: self.input.as_ref(),
        }
    }
}

/// Load and validate every referenced component: it must exist and its kind
/// must match the slot it is referenced from.
async fn load_refs(pool: &PgPool, refs: PromptRefs) -> Result<LoadedRefs, PromptError> {
    let by_id = component::get_components_by_ids(pool, &refs.ids()).await?;

    let mut loaded = LoadedRefs::default();
    for kind in ComponentKind::ALL {
        if let Some(id) = refs.id_for(kind) {
            let component = by_id
                .get(&id)
                .cloned()
                .ok_or(PromptError::MissingReference(kind))?;
            if component.kind != kind {
                return Err(PromptError::KindMismatch(kind));
            }
            *loaded.slot_mut(kind) = Some(component);
        }
    }
    Ok(loaded)
}

/// Assemble the final text for a set of references without saving anything.
///
/// # Errors
///
/// Returns a reference error or a database error.
pub async fn preview_text(pool: &PgPool, refs: PromptRefs) -> Result<String, PromptError> {
    let loaded = load_refs(pool, refs).await?;
    Ok(assembly::assemble(&loaded.selection()))
}

async fn capture_final_text(
    pool: &PgPool,
    input: &NewPrompt,
) -> Result<(String, LoadedRefs), PromptError> {
    let loaded = load_refs(pool, input.refs).await?;

    let final_text = match &input.final_text {
        Some(text) => text.clone(),
        None => {
            let text = assembly::assemble(&loaded.selection());
            if text.is_empty() {
                return Err(PromptError::Invalid(
                    "at least one component or an explicit final_text is required",
                ));
            }
            text
        }
    };
    Ok((final_text, loaded))
}

// =============================================================================
// CRUD
// =============================================================================

/// Create a saved prompt, capturing its final text at save time.
///
/// # Errors
///
/// Returns a validation error, a reference error, or a database error.
pub async fn create_prompt(pool: &PgPool, input: NewPrompt) -> Result<AssembledPrompt, PromptError> {
    if input.name.trim().is_empty() {
        return Err(PromptError::Invalid("name is required"));
    }
    let (final_text, loaded) = capture_final_text(pool, &input).await?;

    let id = Uuid::new_v4();
    let (created_at, updated_at) = sqlx::query_as::<_, (OffsetDateTime, OffsetDateTime)>(
        "INSERT INTO assembled_prompts (id, name, final_text, context_id, instructions_id, details_id, input_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING created_at, updated_at",
    )
    .bind(id)
    .bind(&input.name)
    .bind(&final_text)
    .bind(input.refs.context_id)
    .bind(input.refs.instructions_id)
    .bind(input.refs.details_id)
    .bind(input.refs.input_id)
    .fetch_one(pool)
    .await?;

    Ok(AssembledPrompt {
        id,
        name: input.name,
        final_text,
        context_id: input.refs.context_id,
        instructions_id: input.refs.instructions_id,
        details_id: input.refs.details_id,
        input_id: input.refs.input_id,
        context: loaded.context,
        instructions: loaded.instructions,
        details: loaded.details,
        input: loaded.input,
        created_at,
        updated_at,
    })
}

/// List all saved prompts newest first, with references resolved.
///
/// # Errors
///
/// Returns a database error if a query fails.
pub async fn list_prompts(pool: &PgPool) -> Result<Vec<AssembledPrompt>, PromptError> {
    let rows = sqlx::query_as::<_, PromptRow>(&format!(
        "SELECT {PROMPT_COLUMNS} FROM assembled_prompts ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    resolve_rows(pool, rows).await
}

/// Fetch one saved prompt by ID, with references resolved.
///
/// # Errors
///
/// Returns `NotFound` when the ID does not exist, or a database error.
pub async fn get_prompt(pool: &PgPool, id: Uuid) -> Result<AssembledPrompt, PromptError> {
    let row = sqlx::query_as::<_, PromptRow>(&format!(
        "SELECT {PROMPT_COLUMNS} FROM assembled_prompts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(PromptError::NotFound(id))?;

    let mut resolved = resolve_rows(pool, vec![row]).await?;
    resolved.pop().ok_or(PromptError::NotFound(id))
}

/// Replace a saved prompt's fields, recapturing final text, and bump
/// `updated_at`.
///
/// # Errors
///
/// Returns a validation error, a reference error, `NotFound`, or a database
/// error.
pub async fn update_prompt(
    pool: &PgPool,
    id: Uuid,
    input: NewPrompt,
) -> Result<AssembledPrompt, PromptError> {
    if input.name.trim().is_empty() {
        return Err(PromptError::Invalid("name is required"));
    }
    let (final_text, loaded) = capture_final_text(pool, &input).await?;

    let row = sqlx::query_as::<_, PromptRow>(&format!(
        "UPDATE assembled_prompts
         SET name = $2, final_text = $3, context_id = $4, instructions_id = $5,
             details_id = $6, input_id = $7, updated_at = now()
         WHERE id = $1
         RETURNING {PROMPT_COLUMNS}"
    ))
    .bind(id)
    .bind(&input.name)
    .bind(&final_text)
    .bind(input.refs.context_id)
    .bind(input.refs.instructions_id)
    .bind(input.refs.details_id)
    .bind(input.refs.input_id)
    .fetch_optional(pool)
    .await?
    .ok_or(PromptError::NotFound(id))?;

    let (id, name, final_text, context_id, instructions_id, details_id, input_id, created_at, updated_at) = row;
    Ok(AssembledPrompt {
        id,
        name,
        final_text,
        context_id,
        instructions_id,
        details_id,
        input_id,
        context: loaded.context,
        instructions: loaded.instructions,
        details: loaded.details,
        input: loaded.input,
        created_at,
        updated_at,
    })
}

/// Delete a saved prompt by ID.
///
/// # Errors
///
/// Returns `NotFound` when the ID does not exist, or a database error.
pub async fn delete_prompt(pool: &PgPool, id: Uuid) -> Result<(), PromptError> {
    let result = sqlx::query("DELETE FROM assembled_prompts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(PromptError::NotFound(id));
    }
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

async fn resolve_rows(pool: &PgPool, rows: Vec<PromptRow>) -> Result<Vec<AssembledPrompt>, PromptError> {
    let ids: Vec<Uuid> = rows
        .iter()
        .flat_map(|(_, _, _, context_id, instructions_id, details_id, input_id, _, _)| {
            [*context_id, *instructions_id, *details_id, *input_id]
        })
        .flatten()
        .collect();
    let by_id = component::get_components_by_ids(pool, &ids).await?;

    let lookup = |id: Option<Uuid>| id.and_then(|id| by_id.get(&id).cloned());

    Ok(rows
        .into_iter()
        .map(
            |(id, name, final_text, context_id, instructions_id, details_id, input_id, created_at, updated_at)| {
                AssembledPrompt {
                    id,
                    name,
                    final_text,
                    context_id,
                    instructions_id,
                    details_id,
                    input_id,
                    context: lookup(context_id),
                    instructions: lookup(instructions_id),
                    details: lookup(details_id),
                    input: lookup(input_id),
                    created_at,
                    updated_at,
                }
            },
        )
        .collect())
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
