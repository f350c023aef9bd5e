use std::fmt;
use std::io::Error;
use std::path::PathBuf;

use polars::error::PolarsError;

#[derive(Debug)]
pub enum ColumnsError {
    IoError(Error),
    JsonError(serde_json::Error),
    PolarsError(PolarsError),
    DuplicateColumnId(String),
    EmptyColumnId,
    StorageUnavailable(String),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl fmt::Display for ColumnsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnsError::IoError(e) => write!(f, "io error: {e}"),
            ColumnsError::JsonError(e) => write!(f, "json error: {e}"),
            ColumnsError::PolarsError(e) => write!(f, "polars error: {e}"),
            ColumnsError::DuplicateColumnId(id) => write!(f, "duplicate column id \"{id}\""),
            ColumnsError::EmptyColumnId => write!(f, "column id must not be empty"),
            ColumnsError::StorageUnavailable(msg) => write!(f, "storage unavailable: {msg}"),
            ColumnsError::LoadingFailed(msg) => write!(f, "loading failed: {msg}"),
            ColumnsError::FileNotFound => write!(f, "file not found"),
            ColumnsError::PermissionDenied => write!(f, "permission denied"),
            ColumnsError::UnknownFileType => write!(f, "unknown file type"),
        }
    }
}

impl std::error::Error for ColumnsError {}

impl From<Error> for ColumnsError {
    fn from(err: Error) -> Self {
        ColumnsError::IoError(err)
    }
}

impl From<serde_json::Error> for ColumnsError {
    fn from(err: serde_json::Error) -> Self {
        ColumnsError::JsonError(err)
    }
}

impl From<PolarsError> for ColumnsError {
    fn from(err: PolarsError) -> Self {
        ColumnsError::PolarsError(err)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub event_poll_time: u64,
    pub data_file: PathBuf,
    pub catalog_file: Option<PathBuf>,
    pub table_id: String,
    pub user_id: Option<String>,
    pub storage_dir: Option<PathBuf>, // None keeps preferences in memory only
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    Help,
    Exit,
    Enter,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Resize(usize, usize),
    ToggleColumn,
    ShowAllColumns,
    CompactView,
    QuickToggle,
    ResetColumns,
    MoveColumnLeft,
    MoveColumnRight,
    StartDrag,
    Settings,
}

pub const HELP_TEXT: &str = "\
Columns
  ←/→        select column
  space      hide/show selected column
  a          show all columns
  c          compact view
  v          toggle between show all and compact view
  r          reset to defaults
  </>        move selected column left/right
  m          drag selected column, ←/→ to pick target, enter to drop, esc to cancel
  s          column settings
  ?          this help
  q          quit

Preferences are saved automatically per table and user.";
