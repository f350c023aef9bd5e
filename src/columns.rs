use std::collections::BTreeSet;

use tracing::{debug, info, trace};

use crate::catalog::{ColumnCatalog, ColumnDescriptor};
use crate::drag::{DragOutcome, DragReorder, DragState};
use crate::preference::{ColumnPreference, reconcile};
use crate::store::PreferenceAdapter;

/// Number of leading columns the compact view falls back to when no column is essential.
pub const COMPACT_FALLBACK_COLUMNS: usize = 8;

/// Column visibility and order of one rendered table for one user.
///
/// The stored preference is read once on construction and repaired against the catalog.
/// Every operation that changes the preference writes it back right away. Unknown ids
/// and out of range indices are ignored, they come from UI events and are not trusted.
pub struct ColumnVisibilityController {
    table_id: String,
    user_id: Option<String>,
    catalog: ColumnCatalog,
    pref: ColumnPreference,
    drag: DragReorder,
    adapter: PreferenceAdapter,
    is_loaded: bool,
}

impl ColumnVisibilityController {
    pub fn new(
        table_id: impl Into<String>,
        user_id: Option<&str>,
        catalog: ColumnCatalog,
        adapter: PreferenceAdapter,
    ) -> Self {
        let mut controller = Self {
            table_id: table_id.into(),
            user_id: user_id.map(str::to_string),
            pref: ColumnPreference::defaults(&catalog),
            catalog,
            drag: DragReorder::default(),
            adapter,
            is_loaded: false,
        };
        controller.load();
        controller
    }

    fn load(&mut self) {
        let stored = self.adapter.load(&self.table_id, self.user_id.as_deref());
        self.pref = reconcile(stored.as_ref(), &self.catalog);
        self.is_loaded = true;
        info!(
            "Loaded column preferences for {} ({} of {} columns)",
            self.table_id,
            self.visible_count(),
            self.total_count()
        );
    }

    fn commit(&mut self, next: ColumnPreference) -> bool {
        if next == self.pref {
            trace!("Column preferences unchanged");
            return false;
        }
        self.pref = next;
        self.adapter.save(&self.table_id, self.user_id.as_deref(), &self.pref);
        true
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn catalog(&self) -> &ColumnCatalog {
        &self.catalog
    }

    pub fn preference(&self) -> &ColumnPreference {
        &self.pref
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.pref.is_visible(id)
    }

    fn hideable(&self, id: &str) -> Option<&ColumnDescriptor> {
        match self.catalog.get(id) {
            Some(c) if c.is_hideable() => Some(c),
            Some(_) => {
                trace!("Column {id} cannot be hidden");
                None
            }
            None => {
                trace!("Unknown column {id}");
                None
            }
        }
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        if self.hideable(id).is_none() {
            return false;
        }
        let show = !self.is_visible(id);
        self.set_visibility(id, show)
    }

    pub fn set_visibility(&mut self, id: &str, show: bool) -> bool {
        if self.hideable(id).is_none() {
            return false;
        }
        let mut next = self.pref.clone();
        if show {
            next.visible.insert(id.to_string());
        } else {
            next.visible.remove(id);
        }
        debug!("Set column {id} visible={show}");
        self.commit(next)
    }

    pub fn show_all_columns(&mut self) -> bool {
        let mut next = self.pref.clone();
        next.visible = self.catalog.ids().map(str::to_string).collect();
        self.commit(next)
    }

    pub fn show_compact_view(&mut self) -> bool {
        let mut visible: BTreeSet<String> = self
            .catalog
            .columns()
            .iter()
            .filter(|c| c.is_essential())
            .map(|c| c.id.clone())
            .collect();
        if visible.is_empty() {
            visible = self
                .catalog
                .ids()
                .take(COMPACT_FALLBACK_COLUMNS)
                .map(str::to_string)
                .collect();
        }
        let mut next = self.pref.clone();
        next.visible = visible;
        self.commit(next)
    }

    fn has_hidden_columns(&self) -> bool {
        self.catalog
            .columns()
            .iter()
            .any(|c| c.is_hideable() && !self.is_visible(&c.id))
    }

    /// Show everything if anything is hidden, otherwise switch to the compact view.
    pub fn toggle_show_all_or_compact(&mut self) -> bool {
        if self.has_hidden_columns() {
            self.show_all_columns()
        } else {
            self.show_compact_view()
        }
    }

    pub fn quick_toggle_label(&self) -> &'static str {
        if self.has_hidden_columns() {
            "Show All"
        } else {
            "Compact View"
        }
    }

    pub fn reset_to_defaults(&mut self) -> bool {
        self.commit(ColumnPreference::defaults(&self.catalog))
    }

    /// Move the column at `from` in the full order to `to`. Pinned columns stay in place.
    pub fn move_column(&mut self, from: usize, to: usize) -> bool {
        let len = self.pref.order.len();
        if from == to || from >= len || to >= len {
            trace!("Ignoring column move {from} -> {to} ({len} columns)");
            return false;
        }
        if self
            .catalog
            .get(&self.pref.order[from])
            .is_none_or(|c| c.is_sticky())
        {
            trace!("Column {} is pinned", self.pref.order[from]);
            return false;
        }
        let mut next = self.pref.clone();
        let moved = next.order.remove(from);
        next.order.insert(to, moved);
        debug!("Moved column {from} -> {to}");
        self.commit(next)
    }

    /// Move a column `delta` positions within the full order, clamped to the edges.
    pub fn move_column_by_id(&mut self, id: &str, delta: isize) -> bool {
        let Some(from) = self.pref.position(id) else {
            trace!("Unknown column {id}");
            return false;
        };
        let last = self.pref.order.len().saturating_sub(1) as isize;
        let to = (from as isize + delta).clamp(0, last) as usize;
        self.move_column(from, to)
    }

    pub fn ordered_visible_columns(&self) -> Vec<&ColumnDescriptor> {
        self.pref
            .order
            .iter()
            .filter(|id| self.pref.is_visible(id))
            .filter_map(|id| self.catalog.get(id))
            .collect()
    }

    /// Columns listed in the settings menu, in catalog order.
    pub fn hideable_columns(&self) -> Vec<&ColumnDescriptor> {
        self.catalog.columns().iter().filter(|c| c.is_hideable()).collect()
    }

    /// Visible columns among the hideable ones. Columns that cannot be hidden are left
    /// out, so the count pairs with [`Self::total_count`] as "N of M" with `N <= M`. This
    /// differs from counting every shown column, which would include locked columns.
    pub fn visible_count(&self) -> usize {
        self.catalog
            .columns()
            .iter()
            .filter(|c| c.is_hideable() && self.is_visible(&c.id))
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.catalog.columns().iter().filter(|c| c.is_hideable()).count()
    }

    // -------------------- Drag reordering ---------------------- //

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn drag_start(&mut self, id: &str) -> DragOutcome {
        let draggable = self.catalog.get(id).is_some_and(|c| !c.is_sticky());
        self.drag.drag_start(id, draggable)
    }

    pub fn drag_enter(&mut self, id: &str) -> DragOutcome {
        if !self.catalog.contains(id) {
            return DragOutcome::Ignored;
        }
        self.drag.drag_enter(id)
    }

    pub fn drag_leave(&mut self) -> DragOutcome {
        self.drag.drag_leave()
    }

    /// Finish the drag on `id`. Reports `Committed` only when the order actually changed,
    /// a drop that moves nothing ends the drag as `Cancelled`.
    pub fn drop_on(&mut self, id: &str) -> DragOutcome {
        match self.drag.drop_on(id) {
            DragOutcome::Committed { source, target } => {
                let moved = match (self.pref.position(&source), self.pref.position(&target)) {
                    (Some(from), Some(to)) => self.move_column(from, to),
                    _ => false,
                };
                if moved {
                    DragOutcome::Committed { source, target }
                } else {
                    trace!("Drop of {source} on {target} moved nothing");
                    DragOutcome::Cancelled
                }
            }
            outcome => outcome,
        }
    }

    pub fn drag_end(&mut self) -> DragOutcome {
        self.drag.drag_end()
    }
}
