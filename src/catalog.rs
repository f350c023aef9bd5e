use std::collections::HashSet;

use derive_setters::Setters;
use serde::{Deserialize, Serialize};

use crate::domain::ColumnsError;

/// Edge a pinned column sticks to. Pinned columns never take part in drag reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StickySide {
    Left,
    Right,
}

/// Static metadata for one column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Setters)]
#[serde(rename_all = "camelCase")]
#[setters(strip_option)]
pub struct ColumnDescriptor {
    #[setters(skip)]
    pub id: String,
    #[setters(into)]
    pub label: String,
    #[serde(default = "default_can_hide")]
    pub can_hide: bool,
    /// `Some(true)` also marks the column as essential for the compact view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_visible: Option<bool>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default_hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky: Option<StickySide>,
}

fn default_can_hide() -> bool {
    true
}

impl ColumnDescriptor {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            can_hide: true,
            default_visible: None,
            default_hidden: false,
            sticky: None,
        }
    }

    pub fn is_hideable(&self) -> bool {
        self.can_hide
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky.is_some()
    }

    pub fn visible_by_default(&self) -> bool {
        !self.can_hide || (!self.default_hidden && self.default_visible != Some(false))
    }

    pub fn is_essential(&self) -> bool {
        !self.can_hide || (!self.default_hidden && self.default_visible == Some(true))
    }
}

/// The ordered set of columns a table offers. Ids are unique and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnCatalog {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnCatalog {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Result<Self, ColumnsError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for c in columns.iter() {
            if c.id.is_empty() {
                return Err(ColumnsError::EmptyColumnId);
            }
            if !seen.insert(c.id.as_str()) {
                return Err(ColumnsError::DuplicateColumnId(c.id.clone()));
            }
        }
        Ok(Self { columns })
    }

    pub fn from_json(json: &str) -> Result<Self, ColumnsError> {
        let columns: Vec<ColumnDescriptor> = serde_json::from_str(json)?;
        Self::new(columns)
    }

    /// Build a catalog from bare column names, e.g. a data file header.
    /// The first column identifies a row, so it is pinned to the left and cannot be hidden.
    pub fn from_header<S: AsRef<str>>(names: &[S]) -> Result<Self, ColumnsError> {
        let columns = names
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let name = name.as_ref();
                let column = ColumnDescriptor::new(name, name);
                if idx == 0 {
                    column.can_hide(false).sticky(StickySide::Left)
                } else {
                    column
                }
            })
            .collect();
        Self::new(columns)
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn get(&self, id: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
