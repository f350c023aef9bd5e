use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::domain::ColumnsError;
use crate::preference::ColumnPreference;

pub const KEY_PREFIX: &str = "table_column_prefs_";
pub const ANONYMOUS_USER: &str = "anonymous";

/// Minimal string key-value storage the preferences are written to.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ColumnsError>;
    fn set(&self, key: &str, value: &str) -> Result<(), ColumnsError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ColumnsError> {
        let map = self
            .map
            .lock()
            .map_err(|_| ColumnsError::StorageUnavailable("memory store lock poisoned".into()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ColumnsError> {
        let mut map = self
            .map
            .lock()
            .map_err(|_| ColumnsError::StorageUnavailable("memory store lock poisoned".into()))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let fname = escape(key, |c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        self.dir.join(format!("{fname}.json"))
    }
}

// Writes every char rejected by `keep`, and `%` itself, as `%XX` per utf-8 byte, so
// distinct inputs never collide.
fn escape(raw: &str, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c != '%' && keep(c) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for b in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{b:02X}"));
            }
        }
    }
    out
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ColumnsError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ColumnsError::IoError(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ColumnsError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        trace!("Wrote {:?}", path);
        Ok(())
    }
}

// Records written by earlier versions used other field names; all are read, only the
// first shape is written.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Current {
        order: Vec<String>,
        visible: Vec<String>,
    },
    Hidden {
        order: Vec<String>,
        hidden: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Hook {
        column_order: Vec<String>,
        visible_columns: Vec<String>,
    },
}

impl From<StoredRecord> for ColumnPreference {
    fn from(record: StoredRecord) -> Self {
        match record {
            StoredRecord::Current { order, visible } => ColumnPreference {
                order,
                visible: visible.into_iter().collect(),
            },
            StoredRecord::Hidden { order, hidden } => {
                let hidden: BTreeSet<String> = hidden.into_iter().collect();
                let visible = order.iter().filter(|id| !hidden.contains(*id)).cloned().collect();
                ColumnPreference { order, visible }
            }
            StoredRecord::Hook {
                column_order,
                visible_columns,
            } => ColumnPreference {
                order: column_order,
                visible: visible_columns.into_iter().collect(),
            },
        }
    }
}

/// Reads and writes preference records. Never fails: storage problems are logged and
/// the caller keeps working from memory.
pub struct PreferenceAdapter {
    store: Arc<dyn KeyValueStore>,
}

impl PreferenceAdapter {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// `table_column_prefs_{table}_{user}`. A `_` inside either id is escaped, so the
    /// separator stays unambiguous.
    pub fn storage_key(table_id: &str, user_id: Option<&str>) -> String {
        let user = user_id
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(ANONYMOUS_USER);
        let part = |raw: &str| escape(raw, |c| c != '_');
        format!("{KEY_PREFIX}{}_{}", part(table_id), part(user))
    }

    pub fn load(&self, table_id: &str, user_id: Option<&str>) -> Option<ColumnPreference> {
        let key = Self::storage_key(table_id, user_id);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored column preferences for {key}");
                return None;
            }
            Err(e) => {
                warn!("Failed to load column preferences for {key}: {e}");
                return None;
            }
        };
        match serde_json::from_str::<StoredRecord>(&raw) {
            Ok(record) => Some(record.into()),
            Err(e) => {
                warn!("Ignoring malformed column preferences for {key}: {e}");
                None
            }
        }
    }

    pub fn save(&self, table_id: &str, user_id: Option<&str>, pref: &ColumnPreference) {
        let key = Self::storage_key(table_id, user_id);
        let result = serde_json::to_string(pref)
            .map_err(ColumnsError::from)
            .and_then(|json| self.store.set(&key, &json));
        if let Err(e) = result {
            warn!("Failed to save column preferences for {key}: {e}");
        }
    }
}
