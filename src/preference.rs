use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::catalog::ColumnCatalog;

/// What a user chose for one table: column order and the set of shown columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPreference {
    pub order: Vec<String>,
    pub visible: BTreeSet<String>,
}

impl ColumnPreference {
    pub fn defaults(catalog: &ColumnCatalog) -> Self {
        Self {
            order: catalog.ids().map(str::to_string).collect(),
            visible: catalog
                .columns()
                .iter()
                .filter(|c| c.visible_by_default())
                .map(|c| c.id.clone())
                .collect(),
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|o| o == id)
    }
}

/// Repair a stored preference against the current catalog.
///
/// Columns that disappeared are dropped, new columns are appended in catalog order
/// and shown if they are visible by default, and columns that cannot be hidden are
/// always shown. Applying this to its own output changes nothing.
pub fn reconcile(stored: Option<&ColumnPreference>, catalog: &ColumnCatalog) -> ColumnPreference {
    let Some(stored) = stored else {
        return ColumnPreference::defaults(catalog);
    };

    let mut seen: HashSet<&str> = HashSet::with_capacity(catalog.len());
    let mut order: Vec<String> = Vec::with_capacity(catalog.len());
    for id in stored.order.iter() {
        if catalog.contains(id) && seen.insert(id.as_str()) {
            order.push(id.clone());
        }
    }
    let known: HashSet<&str> = stored.order.iter().map(String::as_str).collect();
    let mut added = Vec::new();
    for c in catalog.columns() {
        if !seen.contains(c.id.as_str()) {
            order.push(c.id.clone());
            if !known.contains(c.id.as_str()) {
                added.push(c);
            }
        }
    }

    let mut visible: BTreeSet<String> = stored
        .visible
        .iter()
        .filter(|id| catalog.contains(id))
        .cloned()
        .collect();
    for c in added.iter().filter(|c| c.visible_by_default()) {
        visible.insert(c.id.clone());
    }
    for c in catalog.columns().iter().filter(|c| !c.can_hide) {
        visible.insert(c.id.clone());
    }

    if !added.is_empty() {
        trace!("Reconcile: {} new column(s) appended", added.len());
    }
    ColumnPreference { order, visible }
}
