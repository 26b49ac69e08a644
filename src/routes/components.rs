//! Component routes — list/filter, CRUD, and the grouped picker listing.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::routes::error::ApiError;
use crate::services::assembly::{self, PickerFilter};
use crate::services::component::{
    self, Component, ComponentKind, ComponentListFilter, NewComponent,
};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ComponentBody {
    pub kind: String,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn parse_kind(raw: &str) -> Result<ComponentKind, ApiError> {
    ComponentKind::from_str(raw)
        .ok_or_else(|| ApiError::Validation(format!("unknown component kind: {raw}")))
}

impl ComponentBody {
    fn into_new_component(self) -> Result<NewComponent, ApiError> {
        let kind = parse_kind(&self.kind)?;
        Ok(NewComponent {
            kind,
            title: self.title,
            content: self.content,
            category: self.category.filter(|c| !c.trim().is_empty()),
            tags: self.tags.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize, Default)]
pub struct ListComponentsQuery {
    pub kind: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
}

/// The picker UI sends `all` through its select widgets; treat it as unset.
fn without_all_sentinel(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "all")
}

impl ListComponentsQuery {
    fn into_filter(self) -> Result<ComponentListFilter, ApiError> {
        let kind = match without_all_sentinel(self.kind) {
            Some(raw) => Some(parse_kind(&raw)?),
            None => None,
        };
        Ok(ComponentListFilter {
            kind,
            search: self.search,
            category: without_all_sentinel(self.category),
            tag: without_all_sentinel(self.tag),
        })
    }
}

/// `GET /api/components` — list components, optionally filtered.
pub async fn list_components(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListComponentsQuery>,
) -> Result<Json<Vec<Component>>, ApiError> {
    let filter = query.into_filter()?;
    let components = component::list_components(&state.pool, &filter).await?;
    Ok(Json(components))
}

/// `POST /api/components` — create a component.
pub async fn create_component(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(body): Json<ComponentBody>,
) -> Result<(StatusCode, Json<Component>), ApiError> {
    let input = body.into_new_component()?;
    let created = component::create_component(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/components/:id` — fetch one component.
pub async fn get_component(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Component>, ApiError> {
    let found = component::get_component(&state.pool, id).await?;
    Ok(Json(found))
}

/// `PUT /api/components/:id` — replace a component's fields.
pub async fn update_component(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ComponentBody>,
) -> Result<Json<Component>, ApiError> {
    let input = body.into_new_component()?;
    let updated = component::update_component(&state.pool, id, input).await?;
    Ok(Json(updated))
}

/// `DELETE /api/components/:id` — delete a component.
pub async fn delete_component(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    component::delete_component(&state.pool, id).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// =============================================================================
// GROUPED LISTING
// =============================================================================

#[derive(Deserialize, Default)]
pub struct GroupedQuery {
    pub title: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
}

impl GroupedQuery {
    fn into_picker_filter(self) -> PickerFilter {
        PickerFilter {
            title: self.title.unwrap_or_default(),
            category: without_all_sentinel(self.category),
            tag: without_all_sentinel(self.tag),
        }
    }
}

#[derive(Serialize)]
pub struct KindBucket {
    pub components: Vec<Component>,
    pub total: usize,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

/// Vocabularies and the total come from the full bucket, so narrowing the
/// picker never hides the other filter options.
fn to_bucket(components: Vec<Component>, filter: &PickerFilter) -> KindBucket {
    let options = assembly::filter_options(&components);
    let total = components.len();
    let matched =
        assembly::filter_components(&components, filter).into_iter().cloned().collect();
    KindBucket {
        components: matched,
        total,
        categories: options.categories,
        tags: options.tags,
    }
}

#[derive(Serialize)]
pub struct GroupedComponentsResponse {
    pub context: KindBucket,
    pub instructions: KindBucket,
    pub details: KindBucket,
    pub input: KindBucket,
}

/// `GET /api/components/grouped` — components partitioned into the four kind
/// buckets, each with its category and tag vocabularies for the picker. The
/// optional `title`/`category`/`tag` filters narrow every bucket at once.
pub async fn grouped_components(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<GroupedQuery>,
) -> Result<Json<GroupedComponentsResponse>, ApiError> {
    let components =
        component::list_components(&state.pool, &ComponentListFilter::default()).await?;
    let grouped = assembly::group_by_kind(components);
    let filter = query.into_picker_filter();

    Ok(Json(GroupedComponentsResponse {
        context: to_bucket(grouped.context, &filter),
        instructions: to_bucket(grouped.instructions, &filter),
        details: to_bucket(grouped.details, &filter),
        input: to_bucket(grouped.input, &filter),
    }))
}

#[cfg(test)]
#[path = "components_test.rs"]
mod tests;
