use super::*;
use crate::state::test_helpers::dummy_component;

// =============================================================================
// ComponentKind
// =============================================================================

#[test]
fn kind_round_trips_through_str() {
    for kind in ComponentKind::ALL {
        assert_eq!(ComponentKind::from_str(kind.as_str()), Some(kind));
    }
}

#[test]
fn unknown_kind_strings_are_rejected() {
    for raw in ["", "context", "Context", "OTHER", "CONTEXT "] {
        assert_eq!(ComponentKind::from_str(raw), None, "accepted {raw:?}");
    }
}

#[test]
fn kind_order_is_context_instructions_details_input() {
    assert_eq!(
        ComponentKind::ALL,
        [
            ComponentKind::Context,
            ComponentKind::Instructions,
            ComponentKind::Details,
            ComponentKind::Input,
        ]
    );
    // BTreeMap ordering (used by stats) follows the same fixed order.
    assert!(ComponentKind::Context < ComponentKind::Instructions);
    assert!(ComponentKind::Instructions < ComponentKind::Details);
    assert!(ComponentKind::Details < ComponentKind::Input);
}

#[test]
fn kind_serde_uses_screaming_snake_case() {
    let json = serde_json::to_string(&ComponentKind::Instructions).unwrap();
    assert_eq!(json, "\"INSTRUCTIONS\"");

    let parsed: ComponentKind = serde_json::from_str("\"INPUT\"").unwrap();
    assert_eq!(parsed, ComponentKind::Input);
}

// =============================================================================
// validation
// =============================================================================

fn valid_input() -> NewComponent {
    NewComponent {
        kind: ComponentKind::Context,
        title: "Support persona".into(),
        content: "You are a support agent.".into(),
        category: Some("personas".into()),
        tags: vec!["support".into()],
    }
}

#[test]
fn valid_input_passes_validation() {
    assert!(validate(&valid_input()).is_ok());
}

#[test]
fn empty_title_is_rejected() {
    let mut input = valid_input();
    input.title = "   ".into();
    let err = validate(&input).unwrap_err();
    assert!(matches!(err, ComponentError::Invalid("title is required")));
}

#[test]
fn empty_content_is_rejected() {
    let mut input = valid_input();
    input.content = String::new();
    let err = validate(&input).unwrap_err();
    assert!(matches!(err, ComponentError::Invalid("content is required")));
}

// =============================================================================
// helpers
// =============================================================================

#[test]
fn escape_like_escapes_wildcards() {
    assert_eq!(escape_like("100%_done\\now"), "100\\%\\_done\\\\now");
    assert_eq!(escape_like("plain"), "plain");
    assert_eq!(escape_like(""), "");
}

#[test]
fn component_serde_round_trip() {
    let component = dummy_component(ComponentKind::Details);
    let json = serde_json::to_string(&component).unwrap();
    let restored: Component = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.id, component.id);
    assert_eq!(restored.kind, ComponentKind::Details);
    assert_eq!(restored.title, component.title);
    assert_eq!(restored.content, component.content);
    assert_eq!(restored.created_at, component.created_at);
}

// =============================================================================
// live database tier
// =============================================================================

#[cfg(feature = "live-db-tests")]
use crate::state::test_helpers::integration_pool;

#[cfg(feature = "live-db-tests")]
fn new_component(kind: ComponentKind, title: &str) -> NewComponent {
    NewComponent {
        kind,
        title: title.into(),
        content: format!("{title} content"),
        category: None,
        tags: Vec::new(),
    }
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn component_crud_round_trip_preserves_every_field() {
    let pool = integration_pool().await;

    let created = create_component(
        &pool,
        NewComponent {
            kind: ComponentKind::Details,
            title: "Style constraints".into(),
            content: "Short sentences. No passive voice.".into(),
            category: Some("writing".into()),
            tags: vec!["style".into(), "strict".into()],
        },
    )
    .await
    .expect("create_component should succeed");

    let fetched = get_component(&pool, created.id)
        .await
        .expect("get_component should find the new row");
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.kind, ComponentKind::Details);
    assert_eq!(fetched.title, "Style constraints");
    assert_eq!(fetched.content, "Short sentences. No passive voice.");
    assert_eq!(fetched.category.as_deref(), Some("writing"));
    assert_eq!(fetched.tags, vec!["style".to_owned(), "strict".to_owned()]);
    assert_eq!(fetched.created_at, created.created_at);

    let updated = update_component(
        &pool,
        created.id,
        NewComponent {
            kind: ComponentKind::Details,
            title: "Style constraints v2".into(),
            content: "Short sentences.".into(),
            category: None,
            tags: Vec::new(),
        },
    )
    .await
    .expect("update_component should succeed");
    assert_eq!(updated.title, "Style constraints v2");
    assert!(updated.category.is_none());
    assert!(updated.tags.is_empty());
    assert!(updated.updated_at >= fetched.updated_at);

    delete_component(&pool, created.id)
        .await
        .expect("delete_component should succeed");
    assert!(matches!(
        get_component(&pool, created.id).await,
        Err(ComponentError::NotFound(_))
    ));
    assert!(matches!(
        delete_component(&pool, created.id).await,
        Err(ComponentError::NotFound(_))
    ));
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn list_filters_narrow_by_kind_search_category_and_tag() {
    let pool = integration_pool().await;

    let mut persona = new_component(ComponentKind::Context, "fz1 persona");
    persona.category = Some("personas".into());
    persona.tags = vec!["support".into()];
    let persona = create_component(&pool, persona).await.expect("seed persona");

    let mut ticket = new_component(ComponentKind::Input, "fz1 ticket");
    ticket.tags = vec!["support".into(), "draft".into()];
    let ticket = create_component(&pool, ticket).await.expect("seed ticket");

    let literal = create_component(&pool, new_component(ComponentKind::Input, "fz1 100%_done"))
        .await
        .expect("seed literal-wildcard title");
    let lookalike = create_component(&pool, new_component(ComponentKind::Input, "fz1 100x-done"))
        .await
        .expect("seed lookalike title");

    // Kind filter returns only that kind.
    let inputs = list_components(
        &pool,
        &ComponentListFilter { kind: Some(ComponentKind::Input), ..ComponentListFilter::default() },
    )
    .await
    .expect("list by kind");
    assert!(inputs.iter().all(|c| c.kind == ComponentKind::Input));
    assert!(inputs.iter().any(|c| c.id == ticket.id));
    assert!(!inputs.iter().any(|c| c.id == persona.id));

    // Search wildcards are matched literally: an unescaped `%100%_%` would
    // also catch the lookalike.
    let hits = list_components(
        &pool,
        &ComponentListFilter { search: Some("100%_".into()), ..ComponentListFilter::default() },
    )
    .await
    .expect("list by search");
    assert!(hits.iter().any(|c| c.id == literal.id));
    assert!(!hits.iter().any(|c| c.id == lookalike.id));

    // Search also hits exact tags.
    let tag_hits = list_components(
        &pool,
        &ComponentListFilter { search: Some("draft".into()), ..ComponentListFilter::default() },
    )
    .await
    .expect("list by tag search");
    assert!(tag_hits.iter().any(|c| c.id == ticket.id));

    // Category is exact; filters AND together.
    let personas = list_components(
        &pool,
        &ComponentListFilter { category: Some("personas".into()), ..ComponentListFilter::default() },
    )
    .await
    .expect("list by category");
    assert!(personas.iter().any(|c| c.id == persona.id));
    assert!(personas.iter().all(|c| c.category.as_deref() == Some("personas")));

    let combined = list_components(
        &pool,
        &ComponentListFilter {
            kind: Some(ComponentKind::Input),
            tag: Some("support".into()),
            ..ComponentListFilter::default()
        },
    )
    .await
    .expect("list by kind and tag");
    assert!(combined.iter().any(|c| c.id == ticket.id));
    assert!(combined
        .iter()
        .all(|c| c.kind == ComponentKind::Input && c.tags.iter().any(|t| t == "support")));
}

#[test]
fn row_to_component_maps_kind_column() {
    let now = time::OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
    let row: ComponentRow = (
        Uuid::new_v4(),
        "INPUT".into(),
        "title".into(),
        "content".into(),
        None,
        vec!["tag".into()],
        now,
        now,
    );
    let component = row_to_component(row);
    assert_eq!(component.kind, ComponentKind::Input);
    assert_eq!(component.tags, vec!["tag".to_owned()]);
}
