use std::collections::BTreeSet;

use colview::{
    ColumnCatalog, ColumnDescriptor, ColumnPreference, ColumnVisibilityController,
    PreferenceAdapter, reconcile,
};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn descriptor() -> impl Strategy<Value = (bool, Option<bool>, bool)> {
    (any::<bool>(), proptest::option::of(any::<bool>()), any::<bool>())
}

fn catalog_strategy() -> impl Strategy<Value = ColumnCatalog> {
    prop::collection::btree_set("[a-h]{1,2}", 1..12)
        .prop_flat_map(|ids| {
            let n = ids.len();
            (Just(ids), prop::collection::vec(descriptor(), n))
        })
        .prop_map(|(ids, flags)| {
            let columns = ids
                .into_iter()
                .zip(flags)
                .map(|(id, (can_hide, default_visible, default_hidden))| {
                    let mut c = ColumnDescriptor::new(id.clone(), id.to_uppercase())
                        .can_hide(can_hide)
                        .default_hidden(default_hidden);
                    c.default_visible = default_visible;
                    c
                })
                .collect();
            ColumnCatalog::new(columns).expect("unique ids")
        })
}

// Ids overlap the catalog alphabet but also include ones no catalog has.
fn stored_strategy() -> impl Strategy<Value = Option<ColumnPreference>> {
    proptest::option::of(
        (
            prop::collection::vec("[a-j]{1,2}", 0..16),
            prop::collection::btree_set("[a-j]{1,2}", 0..16),
        )
            .prop_map(|(order, visible)| ColumnPreference { order, visible }),
    )
}

fn catalog_ids(catalog: &ColumnCatalog) -> Vec<String> {
    let mut ids: Vec<String> = catalog.ids().map(str::to_string).collect();
    ids.sort();
    ids
}

fn controller(catalog: ColumnCatalog) -> ColumnVisibilityController {
    ColumnVisibilityController::new("t", Some("u"), catalog, PreferenceAdapter::in_memory())
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn reconciled_order_is_a_permutation_of_the_catalog(
        catalog in catalog_strategy(),
        stored in stored_strategy()
    ) {
        let pref = reconcile(stored.as_ref(), &catalog);
        let mut order = pref.order.clone();
        order.sort();
        prop_assert_eq!(order, catalog_ids(&catalog));
        prop_assert!(pref.visible.iter().all(|id| catalog.contains(id)));
    }

    #[test]
    fn locked_columns_are_always_visible(
        catalog in catalog_strategy(),
        stored in stored_strategy()
    ) {
        let pref = reconcile(stored.as_ref(), &catalog);
        for c in catalog.columns().iter().filter(|c| !c.can_hide) {
            prop_assert!(pref.visible.contains(&c.id));
        }
    }

    #[test]
    fn reconcile_is_idempotent(
        catalog in catalog_strategy(),
        stored in stored_strategy()
    ) {
        let once = reconcile(stored.as_ref(), &catalog);
        let twice = reconcile(Some(&once), &catalog);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn toggling_a_locked_column_changes_nothing(
        catalog in catalog_strategy(),
        toggles in 1_usize..5
    ) {
        let mut columns = controller(catalog.clone());
        for c in catalog.columns().iter().filter(|c| !c.can_hide) {
            for _ in 0..toggles {
                prop_assert!(!columns.toggle(&c.id));
                prop_assert!(columns.is_visible(&c.id));
            }
        }
    }

    #[test]
    fn moving_keeps_the_same_ids(
        catalog in catalog_strategy(),
        from in 0_usize..14,
        to in 0_usize..14
    ) {
        let mut columns = controller(catalog.clone());
        let visible_before = columns.preference().visible.clone();
        columns.move_column(from, to);
        let mut order = columns.preference().order.clone();
        order.sort();
        prop_assert_eq!(order, catalog_ids(&catalog));
        prop_assert_eq!(&columns.preference().visible, &visible_before);
    }

    #[test]
    fn saved_preference_loads_back_unchanged(
        catalog in catalog_strategy(),
        stored in stored_strategy()
    ) {
        let pref = reconcile(stored.as_ref(), &catalog);
        let adapter = PreferenceAdapter::in_memory();
        adapter.save("t", Some("u"), &pref);
        let loaded = adapter.load("t", Some("u"));
        prop_assert_eq!(reconcile(loaded.as_ref(), &catalog), pref);
    }

    #[test]
    fn compact_view_is_never_empty(catalog in catalog_strategy()) {
        let mut columns = controller(catalog);
        columns.show_compact_view();
        prop_assert!(!columns.preference().visible.is_empty());
        prop_assert!(!columns.ordered_visible_columns().is_empty());
    }
}

#[test]
fn compact_view_falls_back_to_leading_columns() {
    let catalog = ColumnCatalog::new(
        (0..12)
            .map(|i| ColumnDescriptor::new(format!("c{i:02}"), format!("Column {i}")))
            .collect(),
    )
    .unwrap();
    let mut columns = controller(catalog);
    columns.show_compact_view();
    let expected: BTreeSet<String> = (0..8).map(|i| format!("c{i:02}")).collect();
    assert_eq!(columns.preference().visible, expected);
}
