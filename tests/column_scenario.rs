use std::collections::BTreeSet;
use std::sync::Arc;

use colview::{
    ColumnCatalog, ColumnDescriptor, ColumnVisibilityController, DragOutcome, FileStore,
    KeyValueStore, MemoryStore, PreferenceAdapter,
};

fn catalog() -> ColumnCatalog {
    ColumnCatalog::new(vec![
        ColumnDescriptor::new("A", "Alpha").can_hide(false),
        ColumnDescriptor::new("B", "Beta").default_visible(true),
        ColumnDescriptor::new("C", "Gamma").default_visible(false),
    ])
    .expect("valid catalog")
}

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn order(controller: &ColumnVisibilityController) -> Vec<&str> {
    controller.preference().order.iter().map(String::as_str).collect()
}

#[test]
fn walkthrough_from_fresh_to_reload() {
    let store = Arc::new(MemoryStore::new());
    let mut columns = ColumnVisibilityController::new(
        "orders",
        Some("alice"),
        catalog(),
        PreferenceAdapter::new(store.clone()),
    );

    assert!(columns.is_loaded());
    assert_eq!(order(&columns), ["A", "B", "C"]);
    assert_eq!(columns.preference().visible, set(&["A", "B"]));
    assert_eq!(columns.visible_count(), 1);
    assert_eq!(columns.total_count(), 2);
    assert!(store.get("table_column_prefs_orders_alice").unwrap().is_none());

    assert!(columns.toggle("C"));
    assert_eq!(columns.preference().visible, set(&["A", "B", "C"]));

    assert!(!columns.toggle("A"));
    assert_eq!(columns.preference().visible, set(&["A", "B", "C"]));

    assert!(columns.move_column(1, 0));
    assert_eq!(order(&columns), ["B", "A", "C"]);
    assert_eq!(columns.preference().visible, set(&["A", "B", "C"]));

    assert!(columns.reset_to_defaults());
    assert_eq!(order(&columns), ["A", "B", "C"]);
    assert_eq!(columns.preference().visible, set(&["A", "B"]));

    assert!(columns.show_all_columns());
    assert_eq!(columns.preference().visible, set(&["A", "B", "C"]));
    let expected = columns.preference().clone();

    let reloaded = ColumnVisibilityController::new(
        "orders",
        Some("alice"),
        catalog(),
        PreferenceAdapter::new(store),
    );
    assert_eq!(reloaded.preference(), &expected);
}

#[test]
fn preferences_are_scoped_per_table_and_user() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let mut alice = ColumnVisibilityController::new(
        "orders",
        Some("alice"),
        catalog(),
        PreferenceAdapter::new(store.clone()),
    );
    alice.toggle("B");

    let bob = ColumnVisibilityController::new(
        "orders",
        Some("bob"),
        catalog(),
        PreferenceAdapter::new(store.clone()),
    );
    let other_table = ColumnVisibilityController::new(
        "invoices",
        Some("alice"),
        catalog(),
        PreferenceAdapter::new(store.clone()),
    );
    let alice_again = ColumnVisibilityController::new(
        "orders",
        Some("alice"),
        catalog(),
        PreferenceAdapter::new(store),
    );

    assert!(bob.is_visible("B"));
    assert!(other_table.is_visible("B"));
    assert!(!alice_again.is_visible("B"));
}

#[test]
fn anonymous_user_shares_one_slot() {
    let store = Arc::new(MemoryStore::new());
    let mut first = ColumnVisibilityController::new(
        "orders",
        None,
        catalog(),
        PreferenceAdapter::new(store.clone()),
    );
    first.toggle("C");

    assert!(store.get("table_column_prefs_orders_anonymous").unwrap().is_some());
    let second = ColumnVisibilityController::new(
        "orders",
        Some(""),
        catalog(),
        PreferenceAdapter::new(store),
    );
    assert!(second.is_visible("C"));
}

#[test]
fn stored_preference_survives_catalog_changes() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(
            "table_column_prefs_orders_alice",
            r#"{"order":["C","gone","B","A"],"visible":["C","gone"]}"#,
        )
        .unwrap();

    let next_release = ColumnCatalog::new(vec![
        ColumnDescriptor::new("A", "Alpha").can_hide(false),
        ColumnDescriptor::new("B", "Beta").default_visible(true),
        ColumnDescriptor::new("C", "Gamma").default_visible(false),
        ColumnDescriptor::new("D", "Delta").default_visible(true),
        ColumnDescriptor::new("E", "Epsilon").default_hidden(true),
    ])
    .unwrap();
    let columns = ColumnVisibilityController::new(
        "orders",
        Some("alice"),
        next_release,
        PreferenceAdapter::new(store),
    );

    assert_eq!(order(&columns), ["C", "B", "A", "D", "E"]);
    assert_eq!(columns.preference().visible, set(&["A", "C", "D"]));
    let labels: Vec<&str> = columns
        .ordered_visible_columns()
        .iter()
        .map(|c| c.label.as_str())
        .collect();
    assert_eq!(labels, ["Gamma", "Alpha", "Delta"]);
}

#[test]
fn drag_and_drop_reorders_and_persists() {
    let store = Arc::new(MemoryStore::new());
    let mut columns = ColumnVisibilityController::new(
        "orders",
        Some("alice"),
        catalog(),
        PreferenceAdapter::new(store.clone()),
    );

    assert_eq!(columns.drag_start("C"), DragOutcome::Pending);
    columns.drag_enter("A");
    assert_eq!(
        columns.drop_on("A"),
        DragOutcome::Committed {
            source: "C".to_string(),
            target: "A".to_string()
        }
    );
    assert_eq!(order(&columns), ["C", "A", "B"]);

    let reloaded = ColumnVisibilityController::new(
        "orders",
        Some("alice"),
        catalog(),
        PreferenceAdapter::new(store),
    );
    assert_eq!(order(&reloaded), ["C", "A", "B"]);
}

#[test]
fn bundled_sample_tracking_catalog() {
    let catalog =
        ColumnCatalog::from_json(include_str!("../demos/sample_tracking.columns.json")).unwrap();
    let adapter = PreferenceAdapter::in_memory();
    let mut columns = ColumnVisibilityController::new("sample_tracking", None, catalog, adapter);

    assert_eq!(columns.total_count(), 11);
    assert_eq!(columns.visible_count(), 7);
    assert_eq!(columns.quick_toggle_label(), "Show All");
    assert!(!columns.is_visible("createdBy"));

    assert_eq!(columns.drag_start("uniqueId"), DragOutcome::Ignored);
    assert!(!columns.move_column(0, 3));

    columns.toggle_show_all_or_compact();
    assert_eq!(columns.visible_count(), 11);
    assert_eq!(columns.quick_toggle_label(), "Compact View");

    columns.toggle_show_all_or_compact();
    assert_eq!(columns.visible_count(), 7);
}

#[test]
fn file_backed_tables_with_similar_ids_stay_separate() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(tmp_dir.path()));

    let mut dotted = ColumnVisibilityController::new(
        "sample.tracking",
        Some("alice"),
        catalog(),
        PreferenceAdapter::new(store.clone()),
    );
    assert!(dotted.toggle("B"));

    let underscored = ColumnVisibilityController::new(
        "sample_tracking",
        Some("alice"),
        catalog(),
        PreferenceAdapter::new(store.clone()),
    );
    assert!(underscored.is_visible("B"));

    let dotted_again = ColumnVisibilityController::new(
        "sample.tracking",
        Some("alice"),
        catalog(),
        PreferenceAdapter::new(store),
    );
    assert!(!dotted_again.is_visible("B"));
}
