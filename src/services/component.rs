//! Component store — CRUD and filtered listing over Postgres.
//!
//! DESIGN
//! ======
//! Components are the reusable CIDI snippets everything else builds on.
//! Listing supports four independent filters (kind, free-text search,
//! category, tag) combined with AND; ordering is always newest-first.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("{0}")]
    Invalid(&'static str),
    #[error("component not found: {0}")]
    NotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The four fixed CIDI roles a component can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentKind {
    Context,
    Instructions,
    Details,
    Input,
}

impl ComponentKind {
    /// Fixed assembly order: Context, Instructions, Details, Input.
    pub const ALL: [Self; 4] = [Self::Context, Self::Instructions, Self::Details, Self::Input];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Context => "CONTEXT",
            Self::Instructions => "INSTRUCTIONS",
            Self::Details => "DETAILS",
            Self::Input => "INPUT",
        }
    }

    #[must_use]
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "CONTEXT" => Some(Self::Context),
            "INSTRUCTIONS" => Some(Self::Instructions),
            "DETAILS" => Some(Self::Details),
            "INPUT" => Some(Self::Input),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored component. Mirrors the `components` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: Uuid,
    pub kind: ComponentKind,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Caller-supplied fields for create and update.
#[derive(Debug, Clone)]
pub struct NewComponent {
    pub kind: ComponentKind,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

/// Independent list filters, combined with AND. `None` means no filter.
#[derive(Debug, Clone, Default)]
pub struct ComponentListFilter {
    pub kind: Option<ComponentKind>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
}

type ComponentRow = (
    Uuid,
    String,
    String,
    String,
    Option<String>,
    Vec<String>,
    OffsetDateTime,
    OffsetDateTime,
);

const COMPONENT_COLUMNS: &str = "id, kind, title, content, category, tags, created_at, updated_at";

fn row_to_component(row: ComponentRow) -> Component {
    let (id, kind, title, content, category, tags, created_at, updated_at) = row;
    Component {
        // The kind column is CHECK-constrained to the closed set.
        kind: ComponentKind::from_str(&kind).unwrap_or(ComponentKind::Context),
        id,
        title,
        content,
        category,
        tags,
        created_at,
        updated_at,
    }
}

fn validate(input: &NewComponent) -> Result<(), ComponentError> {
    if input.title.trim().is_empty() {
        return Err(ComponentError::Invalid("title is required"));
    }
    if input.content.trim().is_empty() {
        return Err(ComponentError::Invalid("content is required"));
    }
    Ok(())
}

/// Escape LIKE wildcards so user input matches literally.
#[must_use]
pub(crate) fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// =============================================================================
// CRUD
// =============================================================================

/// Create a component.
///
/// # Errors
///
/// Returns a validation error for empty title/content, or a database error.
pub async fn create_component(pool: &PgPool, input: NewComponent) -> Result<Component, ComponentError> {
    validate(&input)?;

    let id = Uuid::new_v4();
    let (created_at, updated_at) = sqlx::query_as::<_, (OffsetDateTime, OffsetDateTime)>(
        "INSERT INTO components (id, kind, title, content, category, tags)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING created_at, updated_at",
    )
    .bind(id)
    .bind(input.kind.as_str())
    .bind(&input.title)
    .bind(&input.content)
    .bind(&input.category)
    .bind(&input.tags)
    .fetch_one(pool)
    .await?;

    Ok(Component {
        id,
        kind: input.kind,
        title: input.title,
        content: input.content,
        category: input.category,
        tags: input.tags,
        created_at,
        updated_at,
    })
}

/// List components matching the filter, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_components(
    pool: &PgPool,
    filter: &ComponentListFilter,
) -> Result<Vec<Component>, ComponentError> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT {COMPONENT_COLUMNS} FROM components WHERE TRUE"
    ));

    if let Some(kind) = filter.kind {
        builder.push(" AND kind = ").push_bind(kind.as_str());
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        builder.push(" AND (title ILIKE ").push_bind(pattern.clone());
        builder.push(" OR content ILIKE ").push_bind(pattern);
        builder.push(" OR ").push_bind(search.to_owned()).push(" = ANY(tags))");
    }
    if let Some(category) = filter.category.as_deref().filter(|s| !s.is_empty()) {
        builder.push(" AND category = ").push_bind(category.to_owned());
    }
    if let Some(tag) = filter.tag.as_deref().filter(|s| !s.is_empty()) {
        builder.push(" AND ").push_bind(tag.to_owned()).push(" = ANY(tags)");
    }
    builder.push(" ORDER BY created_at DESC");

    let rows = builder.build_query_as::<ComponentRow>().fetch_all(pool).await?;
    Ok(rows.into_iter().map(row_to_component).collect())
}

/// Fetch one component by ID.
///
/// # Errors
///
/// Returns `NotFound` when the ID does not exist, or a database error.
pub async fn get_component(pool: &PgPool, id: Uuid) -> Result<Component, ComponentError> {
    let row = sqlx::query_as::<_, ComponentRow>(&format!(
        "SELECT {COMPONENT_COLUMNS} FROM components WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(ComponentError::NotFound(id))?;

    Ok(row_to_component(row))
}

/// Fetch a batch of components keyed by ID.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get_components_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, Component>, ComponentError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, ComponentRow>(&format!(
        "SELECT {COMPONENT_COLUMNS} FROM components WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(row_to_component)
        .map(|c| (c.id, c))
        .collect())
}

/// Replace a component's mutable fields and bump `updated_at`.
///
/// # Errors
///
/// Returns a validation error, `NotFound`, or a database error.
pub async fn update_component(
    pool: &PgPool,
    id: Uuid,
    input: NewComponent,
) -> Result<Component, ComponentError> {
    validate(&input)?;

    let row = sqlx::query_as::<_, ComponentRow>(&format!(
        "UPDATE components
         SET kind = $2, title = $3, content = $4, category = $5, tags = $6, updated_at = now()
         WHERE id = $1
         RETURNING {COMPONENT_COLUMNS}"
    ))
    .bind(id)
    .bind(input.kind.as_str())
    .bind(&input.title)
    .bind(&input.content)
    .bind(&input.category)
    .bind(&input.tags)
    .fetch_optional(pool)
    .await?
    .ok_or(ComponentError::NotFound(id))?;

    Ok(row_to_component(row))
}

/// Delete a component. Saved prompts referencing it keep their text; the
/// reference itself is nulled by the schema.
///
/// # Errors
///
/// Returns `NotFound` when the ID does not exist, or a database error.
pub async fn delete_component(pool: &PgPool, id: Uuid) -> Result<(), ComponentError> {
    let result = sqlx::query("DELETE FROM components WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ComponentError::NotFound(id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "component_test.rs"]
mod tests;
