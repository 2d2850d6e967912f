//! Abbreviation storage backends.
//!
//! Responsibilities implemented here:
//! - `AbbreviationLookup`: the point-query the expansion resolver depends on.
//! - `InMemoryAbbreviationStore`: thread-safe map, used by tests and sessions
//!   that do not persist anything.
//! - `RedbAbbreviationStore`: persistent store backed by `redb`.
//! - `AbbreviationStore` enum: backend switch used by higher-level code.
//!
//! Both backends share the same editing rules: triggers are normalized to
//! lower case, ids are assigned by the store and survive edits, and a trigger
//! collision replaces the previous owner of that trigger.
use crate::abbreviation::{validate, Abbreviation};
use crate::error::StoreError;
use parking_lot::RwLock;
use redb::{ReadableTable, ReadableTableMetadata};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only lookup of an abbreviation by its lower-cased trigger.
pub trait AbbreviationLookup {
    /// Look up `key` exactly. Callers pass an already lower-cased key.
    fn get_abbreviation(&self, key: &str) -> Result<Option<Abbreviation>, StoreError>;
}

impl<T: AbbreviationLookup + ?Sized> AbbreviationLookup for &T {
    fn get_abbreviation(&self, key: &str) -> Result<Option<Abbreviation>, StoreError> {
        (**self).get_abbreviation(key)
    }
}

impl<T: AbbreviationLookup + ?Sized> AbbreviationLookup for Arc<T> {
    fn get_abbreviation(&self, key: &str) -> Result<Option<Abbreviation>, StoreError> {
        (**self).get_abbreviation(key)
    }
}

/// Plain trigger -> expansion maps act as a lookup; ids are reported as 0.
impl AbbreviationLookup for HashMap<String, String> {
    fn get_abbreviation(&self, key: &str) -> Result<Option<Abbreviation>, StoreError> {
        Ok(self
            .get(key)
            .map(|expansion| Abbreviation::new(0, key, expansion.as_str())))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    by_trigger: HashMap<String, Abbreviation>,
    next_id: u64,
}

impl MemoryState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A thread-safe in-memory abbreviation store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryAbbreviationStore {
    inner: Arc<RwLock<MemoryState>>,
}

impl InMemoryAbbreviationStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new abbreviation or edit an existing one.
    ///
    /// With `id`, the row carrying that id is edited and may be renamed.
    /// Without it, an existing row for the same trigger keeps its id.
    pub fn insert_or_update(
        &self,
        abbreviation: &str,
        expansion: &str,
        id: Option<u64>,
    ) -> Result<Abbreviation, StoreError> {
        let trigger = validate(abbreviation, expansion)?;
        let mut state = self.inner.write();

        let id = match id {
            Some(id) => {
                let old = state
                    .by_trigger
                    .values()
                    .find(|row| row.id == id)
                    .map(|row| row.abbreviation.clone())
                    .ok_or(StoreError::NotFound(id))?;
                if old != trigger {
                    state.by_trigger.remove(&old);
                }
                id
            }
            None => {
                let existing = state.by_trigger.get(&trigger).map(|row| row.id);
                match existing {
                    Some(id) => id,
                    None => state.allocate_id(),
                }
            }
        };

        let row = Abbreviation::new(id, trigger.clone(), expansion);
        state.by_trigger.insert(trigger, row.clone());
        tracing::debug!(id, abbreviation = %row.abbreviation, "stored abbreviation");
        Ok(row)
    }

    /// Delete by id. Returns whether a row was removed.
    pub fn delete(&self, id: u64) -> bool {
        let mut state = self.inner.write();
        let before = state.by_trigger.len();
        state.by_trigger.retain(|_, row| row.id != id);
        before != state.by_trigger.len()
    }

    /// All abbreviations sorted by trigger.
    pub fn all(&self) -> Vec<Abbreviation> {
        let mut rows: Vec<_> = self.inner.read().by_trigger.values().cloned().collect();
        rows.sort_by(|a, b| a.abbreviation.cmp(&b.abbreviation));
        rows
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_trigger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the entire contents with `entries`, assigning fresh ids.
    /// Nothing is changed if any entry is invalid.
    pub fn replace_with(&self, entries: &[(String, String)]) -> Result<(), StoreError> {
        let mut fresh = MemoryState::default();
        for (abbreviation, expansion) in entries {
            let trigger = validate(abbreviation, expansion)?;
            let existing = fresh.by_trigger.get(&trigger).map(|row| row.id);
            let id = match existing {
                Some(id) => id,
                None => fresh.allocate_id(),
            };
            fresh
                .by_trigger
                .insert(trigger.clone(), Abbreviation::new(id, trigger, expansion.as_str()));
        }
        *self.inner.write() = fresh;
        Ok(())
    }
}

impl AbbreviationLookup for InMemoryAbbreviationStore {
    fn get_abbreviation(&self, key: &str) -> Result<Option<Abbreviation>, StoreError> {
        Ok(self.inner.read().by_trigger.get(key).cloned())
    }
}

/// Redb-backed abbreviation store.
///
/// Rows live in one table keyed by trigger with `(id, expansion)` values; the
/// id counter lives in a small metadata table. Every edit is a single write
/// transaction.
#[derive(Clone)]
pub struct RedbAbbreviationStore {
    db: Arc<redb::Database>,
    path: PathBuf,
}

type RowTable = redb::TableDefinition<'static, &'static str, (u64, &'static str)>;
type MetaTable = redb::TableDefinition<'static, &'static str, u64>;

impl RedbAbbreviationStore {
    const TABLE_DEF: RowTable = redb::TableDefinition::new("abbreviations");
    const META_DEF: MetaTable = redb::TableDefinition::new("abbreviation_meta");
    const NEXT_ID_KEY: &'static str = "next_id";

    /// Create or open a redb database at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = redb::Database::create(path.as_ref())?;

        // Make sure both tables exist so read transactions can always open them.
        let txn = db.begin_write()?;
        {
            txn.open_table(Self::TABLE_DEF)?;
            txn.open_table(Self::META_DEF)?;
        }
        txn.commit()?;

        tracing::debug!(path = %path.as_ref().display(), "opened abbreviation store");
        Ok(Self {
            db: Arc::new(db),
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// See [`InMemoryAbbreviationStore::insert_or_update`].
    pub fn insert_or_update(
        &self,
        abbreviation: &str,
        expansion: &str,
        id: Option<u64>,
    ) -> Result<Abbreviation, StoreError> {
        let trigger = validate(abbreviation, expansion)?;
        let txn = self.db.begin_write()?;
        let row = {
            let mut table = txn.open_table(Self::TABLE_DEF)?;
            let id = match id {
                Some(id) => {
                    let old = find_trigger_by_id(&table, id)?.ok_or(StoreError::NotFound(id))?;
                    if old != trigger {
                        table.remove(old.as_str())?;
                    }
                    id
                }
                None => {
                    let existing = table.get(trigger.as_str())?.map(|guard| guard.value().0);
                    match existing {
                        Some(id) => id,
                        None => {
                            let mut meta = txn.open_table(Self::META_DEF)?;
                            let next = meta
                                .get(Self::NEXT_ID_KEY)?
                                .map(|guard| guard.value())
                                .unwrap_or(0)
                                + 1;
                            meta.insert(Self::NEXT_ID_KEY, next)?;
                            next
                        }
                    }
                }
            };
            table.insert(trigger.as_str(), (id, expansion))?;
            Abbreviation::new(id, trigger, expansion)
        };
        txn.commit()?;
        tracing::debug!(id = row.id, abbreviation = %row.abbreviation, "stored abbreviation");
        Ok(row)
    }

    /// Delete by id. Returns whether a row was removed.
    pub fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(Self::TABLE_DEF)?;
            match find_trigger_by_id(&table, id)? {
                Some(trigger) => {
                    table.remove(trigger.as_str())?;
                    true
                }
                None => false,
            }
        };
        txn.commit()?;
        Ok(removed)
    }

    /// All abbreviations sorted by trigger (redb keeps keys ordered).
    pub fn all(&self) -> Result<Vec<Abbreviation>, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(Self::TABLE_DEF)?;
        let mut out = Vec::new();
        for item in table.iter()? {
            let (k, v) = item?;
            let (id, expansion) = v.value();
            out.push(Abbreviation::new(id, k.value(), expansion));
        }
        Ok(out)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(Self::TABLE_DEF)?;
        Ok(table.len()? as usize)
    }

    /// Replace the entire contents atomically, assigning fresh ids.
    pub fn replace_with(&self, entries: &[(String, String)]) -> Result<(), StoreError> {
        let validated = entries
            .iter()
            .map(|(a, e)| validate(a, e).map(|trigger| (trigger, e.as_str())))
            .collect::<Result<Vec<_>, _>>()?;

        let txn = self.db.begin_write()?;
        {
            txn.delete_table(Self::TABLE_DEF)?;
            let mut table = txn.open_table(Self::TABLE_DEF)?;
            let mut next = 0u64;
            for (trigger, expansion) in &validated {
                let existing = table.get(trigger.as_str())?.map(|guard| guard.value().0);
                let id = match existing {
                    Some(id) => id,
                    None => {
                        next += 1;
                        next
                    }
                };
                table.insert(trigger.as_str(), (id, *expansion))?;
            }
            let mut meta = txn.open_table(Self::META_DEF)?;
            meta.insert(Self::NEXT_ID_KEY, next)?;
        }
        txn.commit()?;
        Ok(())
    }
}

impl AbbreviationLookup for RedbAbbreviationStore {
    fn get_abbreviation(&self, key: &str) -> Result<Option<Abbreviation>, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(Self::TABLE_DEF)?;
        let row = table.get(key)?.map(|guard| {
            let (id, expansion) = guard.value();
            Abbreviation::new(id, key, expansion)
        });
        Ok(row)
    }
}

impl std::fmt::Debug for RedbAbbreviationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbAbbreviationStore")
            .field("path", &self.path)
            .finish()
    }
}

fn find_trigger_by_id<T>(table: &T, id: u64) -> Result<Option<String>, StoreError>
where
    T: ReadableTable<&'static str, (u64, &'static str)>,
{
    for item in table.iter()? {
        let (k, v) = item?;
        if v.value().0 == id {
            return Ok(Some(k.value().to_string()));
        }
    }
    Ok(None)
}

/// Backend switch used by sessions and tools.
#[derive(Clone, Debug)]
pub enum AbbreviationStore {
    InMemory(InMemoryAbbreviationStore),
    Redb(RedbAbbreviationStore),
}

impl AbbreviationStore {
    /// Construct an empty `InMemory` store.
    pub fn new_in_memory() -> Self {
        AbbreviationStore::InMemory(InMemoryAbbreviationStore::new())
    }

    /// Construct a `Redb` store at `path`, creating the file if needed.
    pub fn new_redb<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Ok(AbbreviationStore::Redb(RedbAbbreviationStore::new(path)?))
    }

    pub fn insert_or_update(
        &self,
        abbreviation: &str,
        expansion: &str,
        id: Option<u64>,
    ) -> Result<Abbreviation, StoreError> {
        match self {
            AbbreviationStore::InMemory(m) => m.insert_or_update(abbreviation, expansion, id),
            AbbreviationStore::Redb(r) => r.insert_or_update(abbreviation, expansion, id),
        }
    }

    pub fn delete(&self, id: u64) -> Result<bool, StoreError> {
        match self {
            AbbreviationStore::InMemory(m) => Ok(m.delete(id)),
            AbbreviationStore::Redb(r) => r.delete(id),
        }
    }

    pub fn all(&self) -> Result<Vec<Abbreviation>, StoreError> {
        match self {
            AbbreviationStore::InMemory(m) => Ok(m.all()),
            AbbreviationStore::Redb(r) => r.all(),
        }
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        match self {
            AbbreviationStore::InMemory(m) => Ok(m.len()),
            AbbreviationStore::Redb(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    pub fn replace_with(&self, entries: &[(String, String)]) -> Result<(), StoreError> {
        match self {
            AbbreviationStore::InMemory(m) => m.replace_with(entries),
            AbbreviationStore::Redb(r) => r.replace_with(entries),
        }
    }
}

impl AbbreviationLookup for AbbreviationStore {
    fn get_abbreviation(&self, key: &str) -> Result<Option<Abbreviation>, StoreError> {
        match self {
            AbbreviationStore::InMemory(m) => m.get_abbreviation(key),
            AbbreviationStore::Redb(r) => r.get_abbreviation(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_insert_and_lookup() {
        let store = InMemoryAbbreviationStore::new();
        let row = store.insert_or_update("BRB", "be right back", None).unwrap();
        assert_eq!(row.abbreviation, "brb");
        let found = store.get_abbreviation("brb").unwrap().unwrap();
        assert_eq!(found.expansion, "be right back");
        assert!(store.get_abbreviation("BRB").unwrap().is_none());
    }

    #[test]
    fn in_memory_same_trigger_keeps_id() {
        let store = InMemoryAbbreviationStore::new();
        let first = store.insert_or_update("omw", "on my way", None).unwrap();
        let second = store.insert_or_update("OMW", "on my way!", None).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_abbreviation("omw").unwrap().unwrap().expansion, "on my way!");
    }

    #[test]
    fn in_memory_edit_by_id_renames() {
        let store = InMemoryAbbreviationStore::new();
        let row = store.insert_or_update("ty", "thank you", None).unwrap();
        store.insert_or_update("tyvm", "thank you very much", Some(row.id)).unwrap();
        assert!(store.get_abbreviation("ty").unwrap().is_none());
        assert_eq!(store.get_abbreviation("tyvm").unwrap().unwrap().id, row.id);
    }

    #[test]
    fn in_memory_edit_unknown_id_fails() {
        let store = InMemoryAbbreviationStore::new();
        let err = store.insert_or_update("x", "y", Some(42)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(42)));
    }

    #[test]
    fn in_memory_delete() {
        let store = InMemoryAbbreviationStore::new();
        let row = store.insert_or_update("brb", "be right back", None).unwrap();
        assert!(store.delete(row.id));
        assert!(!store.delete(row.id));
        assert!(store.is_empty());
    }

    #[test]
    fn in_memory_replace_with_is_all_or_nothing() {
        let store = InMemoryAbbreviationStore::new();
        store.insert_or_update("old", "gone soon", None).unwrap();
        let bad = vec![
            ("a".to_string(), "alpha".to_string()),
            (" ".to_string(), "blank".to_string()),
        ];
        assert!(store.replace_with(&bad).is_err());
        assert_eq!(store.len(), 1);

        let good = vec![
            ("b".to_string(), "beta".to_string()),
            ("a".to_string(), "alpha".to_string()),
        ];
        store.replace_with(&good).unwrap();
        let triggers: Vec<_> = store.all().into_iter().map(|r| r.abbreviation).collect();
        assert_eq!(triggers, vec!["a", "b"]);
    }

    #[test]
    fn hashmap_lookup() {
        let mut map = HashMap::new();
        map.insert("brb".to_string(), "be right back".to_string());
        assert!(map.get_abbreviation("brb").unwrap().is_some());
        assert!(map.get_abbreviation("nope").unwrap().is_none());
    }

    #[test]
    fn enum_in_memory_roundtrip() {
        let store = AbbreviationStore::new_in_memory();
        store.insert_or_update("sig", "Best,\n$0", None).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert!(!store.is_empty().unwrap());
        assert!(store.get_abbreviation("sig").unwrap().is_some());
    }
}
