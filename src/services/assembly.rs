//! Assembly reducer — pure, deterministic prompt construction.
//!
//! DESIGN
//! ======
//! Everything here is a plain function over in-memory components: grouping
//! into the four kind buckets, per-kind filtering, filter vocabularies, and
//! the final labeled concatenation. No I/O, no partial failure; the output
//! is fully determined by the inputs.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::services::component::{Component, ComponentKind};

// =============================================================================
// SELECTION AND ASSEMBLY
// =============================================================================

/// At most one selected component per kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct Selection<'a> {
    pub context: Option<&'a Component>,
    pub instructions: Option<&'a Component>,
    pub details: Option<&'a Component>,
    pub input: Option<&'a Component>,
}

impl<'a> Selection<'a> {
    #[must_use]
    pub fn get(&self, kind: ComponentKind) -> Option<&'a Component> {
        match kind {
            ComponentKind::Context => self.context,
            ComponentKind::Instructions => self.instructions,
            ComponentKind::Details => self.details,
            ComponentKind::Input => self.input,
        }
    }
}

/// Concatenate the selected components in fixed kind order.
///
/// Each selected kind contributes `**<KIND>:**` followed by its content;
/// parts are joined by a blank line. Unselected kinds are omitted entirely,
/// so an empty selection yields an empty string.
#[must_use]
pub fn assemble(selection: &Selection<'_>) -> String {
    let mut parts = Vec::new();
    for kind in ComponentKind::ALL {
        if let Some(component) = selection.get(kind) {
            parts.push(format!("**{kind}:**\n{}", component.content));
        }
    }
    parts.join("\n\n")
}

// =============================================================================
// IN-MEMORY FILTERING
// =============================================================================

/// Per-kind picker filter: title substring, category equality, tag
/// membership. Empty/`None` fields pass everything.
#[derive(Debug, Clone, Default)]
pub struct PickerFilter {
    pub title: String,
    pub category: Option<String>,
    pub tag: Option<String>,
}

#[must_use]
pub fn matches_filter(component: &Component, filter: &PickerFilter) -> bool {
    let title_ok = filter.title.is_empty()
        || component
            .title
            .to_lowercase()
            .contains(&filter.title.to_lowercase());

    let category_ok = filter
        .category
        .as_deref()
        .is_none_or(|wanted| component.category.as_deref() == Some(wanted));

    let tag_ok = filter
        .tag
        .as_deref()
        .is_none_or(|wanted| component.tags.iter().any(|tag| tag == wanted));

    title_ok && category_ok && tag_ok
}

/// Filter a component list, preserving input order.
#[must_use]
pub fn filter_components<'a>(components: &'a [Component], filter: &PickerFilter) -> Vec<&'a Component> {
    components
        .iter()
        .filter(|component| matches_filter(component, filter))
        .collect()
}

/// Sorted, de-duplicated category and tag vocabularies for a component list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

#[must_use]
pub fn filter_options(components: &[Component]) -> FilterOptions {
    let categories: BTreeSet<String> = components
        .iter()
        .filter_map(|c| c.category.clone())
        .filter(|category| !category.is_empty())
        .collect();
    let tags: BTreeSet<String> = components
        .iter()
        .flat_map(|c| c.tags.iter())
        .filter(|tag| !tag.is_empty())
        .cloned()
        .collect();

    FilterOptions {
        categories: categories.into_iter().collect(),
        tags: tags.into_iter().collect(),
    }
}

// =============================================================================
// GROUPING
// =============================================================================

/// Components partitioned into the four kind buckets, input order preserved.
#[derive(Debug, Default)]
pub struct GroupedComponents {
    pub context: Vec<Component>,
    pub instructions: Vec<Component>,
    pub details: Vec<Component>,
    pub input: Vec<Component>,
}

#[must_use]
pub fn group_by_kind(components: Vec<Component>) -> GroupedComponents {
    let mut grouped = GroupedComponents::default();
    for component in components {
        match component.kind {
            ComponentKind::Context => grouped.context.push(component),
            ComponentKind::Instructions => grouped.instructions.push(component),
            ComponentKind::Details => grouped.details.push(component),
            ComponentKind::Input => grouped.input.push(component),
        }
    }
    grouped
}

#[cfg(test)]
#[path = "assembly_test.rs"]
mod tests;
