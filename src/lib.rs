pub mod catalog;
pub mod columns;
pub mod controller;
pub mod data;
pub mod domain;
pub mod drag;
pub mod model;
pub mod preference;
pub mod store;
pub mod ui;

pub use catalog::{ColumnCatalog, ColumnDescriptor, StickySide};
pub use columns::{COMPACT_FALLBACK_COLUMNS, ColumnVisibilityController};
pub use domain::ColumnsError;
pub use drag::{DragOutcome, DragState};
pub use preference::{ColumnPreference, reconcile};
pub use store::{FileStore, KeyValueStore, MemoryStore, PreferenceAdapter};
