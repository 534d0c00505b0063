//! Live key/value preference stores.
//!
//! Keys are namespaced as `<group>::<name>` (for example `vision::kP`). A
//! preferences file is plain TOML; tables become key prefixes:
//!
//! ```toml
//! [vision]
//! kP = 1.2
//! enableDepth = false
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use std::time::SystemTime;

use seeker_traits::PreferenceProvider;

/// Build a namespaced preference key. An empty group yields the bare name.
pub fn pref_key(group: &str, name: &str) -> String {
    if group.is_empty() {
        name.to_string()
    } else {
        format!("{group}::{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrefValue {
    Double(f64),
    Bool(bool),
}

/// In-memory store that can be changed at any time from any thread.
#[derive(Debug, Default)]
pub struct PreferenceStore {
    values: RwLock<HashMap<String, PrefValue>>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_double(&self, key: impl Into<String>, value: f64) {
        self.set(key, PrefValue::Double(value));
    }

    pub fn set_bool(&self, key: impl Into<String>, value: bool) {
        self.set(key, PrefValue::Bool(value));
    }

    pub fn set(&self, key: impl Into<String>, value: PrefValue) {
        if let Ok(mut map) = self.values.write() {
            map.insert(key.into(), value);
        }
    }

    pub fn remove(&self, key: &str) -> Option<PrefValue> {
        self.values.write().ok().and_then(|mut m| m.remove(key))
    }

    pub fn get(&self, key: &str) -> Option<PrefValue> {
        self.values.read().ok().and_then(|m| m.get(key).copied())
    }

    /// Swap the whole key set in one step so readers never see a half-applied reload.
    pub fn replace_all(&self, values: HashMap<String, PrefValue>) {
        if let Ok(mut map) = self.values.write() {
            *map = values;
        }
    }

    pub fn len(&self) -> usize {
        self.values.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PreferenceProvider for PreferenceStore {
    fn get_double(&self, key: &str, default: f64) -> f64 {
        match self.get(key) {
            Some(PrefValue::Double(v)) => v,
            _ => default,
        }
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(PrefValue::Bool(v)) => v,
            _ => default,
        }
    }
}

/// Flatten a TOML document into namespaced preference values.
///
/// Integers in `i32` range are widened to doubles; larger integers, strings,
/// arrays and dates are rejected.
pub fn flatten_toml(doc: &toml::Table) -> eyre::Result<HashMap<String, PrefValue>> {
    fn walk(
        prefix: &str,
        table: &toml::Table,
        out: &mut HashMap<String, PrefValue>,
    ) -> eyre::Result<()> {
        for (name, value) in table {
            let key = pref_key(prefix, name);
            match value {
                toml::Value::Float(f) => {
                    out.insert(key, PrefValue::Double(*f));
                }
                toml::Value::Integer(i) => {
                    let Ok(n) = i32::try_from(*i) else {
                        eyre::bail!("preference '{key}' integer {i} is out of range");
                    };
                    out.insert(key, PrefValue::Double(f64::from(n)));
                }
                toml::Value::Boolean(b) => {
                    out.insert(key, PrefValue::Bool(*b));
                }
                toml::Value::Table(t) => walk(&key, t, out)?,
                other => eyre::bail!(
                    "preference '{key}' has unsupported type {}",
                    other.type_str()
                ),
            }
        }
        Ok(())
    }

    let mut out = HashMap::new();
    walk("", doc, &mut out)?;
    Ok(out)
}

pub fn parse_preferences(s: &str) -> eyre::Result<HashMap<String, PrefValue>> {
    let doc: toml::Table =
        toml::from_str(s).map_err(|e| eyre::eyre!("parse preferences TOML: {e}"))?;
    flatten_toml(&doc)
}

/// Preference store backed by a TOML file on disk.
///
/// `refresh_if_changed` is cheap (one `stat`) and is meant to be called once per
/// control period; the file is only re-parsed when its modification time moves.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    store: PreferenceStore,
    last_modified: Mutex<Option<SystemTime>>,
}

impl FilePreferences {
    pub fn open(path: impl Into<PathBuf>) -> eyre::Result<Self> {
        let prefs = Self {
            path: path.into(),
            store: PreferenceStore::new(),
            last_modified: Mutex::new(None),
        };
        prefs.reload()?;
        Ok(prefs)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file unconditionally. On error the previous values stay in place.
    pub fn reload(&self) -> eyre::Result<()> {
        let modified = std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .ok();
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| eyre::eyre!("read preferences {:?}: {}", self.path, e))?;
        let values = parse_preferences(&text)?;
        self.store.replace_all(values);
        if let Ok(mut lm) = self.last_modified.lock() {
            *lm = modified;
        }
        Ok(())
    }

    /// Reload when the file's modification time changed. Returns whether a reload happened.
    pub fn refresh_if_changed(&self) -> eyre::Result<bool> {
        let modified = std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|e| eyre::eyre!("stat preferences {:?}: {}", self.path, e))?;
        let changed = self
            .last_modified
            .lock()
            .map(|lm| *lm != Some(modified))
            .unwrap_or(true);
        if changed {
            self.reload()?;
        }
        Ok(changed)
    }

    pub fn store(&self) -> &PreferenceStore {
        &self.store
    }
}

impl PreferenceProvider for FilePreferences {
    fn get_double(&self, key: &str, default: f64) -> f64 {
        self.store.get_double(key, default)
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.store.get_bool(key, default)
    }
}
