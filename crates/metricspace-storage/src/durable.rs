//! File-backed storage backend built on `redb`.

use std::path::{Path, PathBuf};

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::error::{Error, Result};
use crate::traits::StorageBackend;

const ENTRIES: TableDefinition<&str, &str> = TableDefinition::new("entries");

/// Single-file store that survives process restarts.
pub struct RedbBackend {
    db: Database,
    path: PathBuf,
}

impl RedbBackend {
    /// Opens (or creates) the database at `path`, creating parent
    /// directories as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path).map_err(Error::backend)?;

        // Readers open the table directly, so it has to exist up front.
        let txn = db.begin_write().map_err(Error::backend)?;
        txn.open_table(ENTRIES).map_err(Error::backend)?;
        txn.commit().map_err(Error::backend)?;

        tracing::debug!(path = %path.display(), "Opened redb store");
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBackend")
            .field("path", &self.path)
            .finish()
    }
}

impl StorageBackend for RedbBackend {
    fn name(&self) -> &'static str {
        "redb"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let txn = self.db.begin_read().map_err(Error::backend)?;
        let table = txn.open_table(ENTRIES).map_err(Error::backend)?;
        let value = table.get(key).map_err(Error::backend)?;
        Ok(value.map(|guard| guard.value().to_string()))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let txn = self.db.begin_write().map_err(Error::backend)?;
        {
            let mut table = txn.open_table(ENTRIES).map_err(Error::backend)?;
            table.insert(key, value).map_err(Error::backend)?;
        }
        txn.commit().map_err(Error::backend)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let txn = self.db.begin_write().map_err(Error::backend)?;
        {
            let mut table = txn.open_table(ENTRIES).map_err(Error::backend)?;
            table.remove(key).map_err(Error::backend)?;
        }
        txn.commit().map_err(Error::backend)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let txn = self.db.begin_read().map_err(Error::backend)?;
        let table = txn.open_table(ENTRIES).map_err(Error::backend)?;
        let mut keys = Vec::new();
        for entry in table.range(prefix..).map_err(Error::backend)? {
            let (key, _) = entry.map_err(Error::backend)?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            keys.push(key.to_string());
        }
        Ok(keys)
    }
}
