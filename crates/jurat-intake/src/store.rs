//! Client and draft storage
//!
//! Intake operations take a [`ClientStore`] instead of touching a global
//! location. Two adapters ship with the crate:
//!
//! - [`MemoryStore`] keeps everything in memory
//! - [`JsonFileStore`] keeps `clients.json` and `drafts.json` in a directory
//!
//! Lists are stored newest first.

use std::fs;
use std::path::{Path, PathBuf};

use jurat_core::RawClientRecord;
use serde::Serialize;
use serde_json::Value;

use crate::draft::Draft;
use crate::error::{IntakeError, Result};
use crate::import::record_from_object;

/// File holding the client list
pub const CLIENTS_FILE: &str = "clients.json";

/// File holding the draft list
pub const DRAFTS_FILE: &str = "drafts.json";

/// Storage port for clients and drafts
pub trait ClientStore {
    fn load_clients(&self) -> Result<Vec<RawClientRecord>>;
    fn save_clients(&mut self, clients: &[RawClientRecord]) -> Result<()>;
    fn load_drafts(&self) -> Result<Vec<Draft>>;
    fn save_drafts(&mut self, drafts: &[Draft]) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    clients: Vec<RawClientRecord>,
    drafts: Vec<Draft>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStore for MemoryStore {
    fn load_clients(&self) -> Result<Vec<RawClientRecord>> {
        Ok(self.clients.clone())
    }

    fn save_clients(&mut self, clients: &[RawClientRecord]) -> Result<()> {
        self.clients = clients.to_vec();
        Ok(())
    }

    fn load_drafts(&self) -> Result<Vec<Draft>> {
        Ok(self.drafts.clone())
    }

    fn save_drafts(&mut self, drafts: &[Draft]) -> Result<()> {
        self.drafts = drafts.to_vec();
        Ok(())
    }
}

/// JSON files in a directory
///
/// Loading never fails: a missing file is an empty list, and a file that
/// cannot be read or parsed is logged and treated as empty. Entries that do
/// not parse are skipped on load but written back verbatim on save, after
/// the parsed ones. Saving over a file that cannot be read at all fails with
/// [`IntakeError::UnreadableStore`] and leaves the file untouched.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

/// Content of one store file
enum StoreFile {
    Missing,
    Entries(Vec<Value>),
    Unreadable(String),
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_file(&self, file: &str) -> StoreFile {
        let path = self.dir.join(file);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return StoreFile::Missing,
            Err(e) => return StoreFile::Unreadable(e.to_string()),
        };

        match serde_json::from_str(&text) {
            Ok(Value::Array(items)) => StoreFile::Entries(items),
            Ok(_) => StoreFile::Unreadable("not a JSON array".to_string()),
            Err(e) => StoreFile::Unreadable(e.to_string()),
        }
    }

    fn load_entries<T>(&self, file: &str, parse: fn(Value) -> Result<T>) -> Vec<T> {
        let items = match self.read_file(file) {
            StoreFile::Missing => return Vec::new(),
            StoreFile::Entries(items) => items,
            StoreFile::Unreadable(reason) => {
                log::warn!("Ignoring {}: {}", self.dir.join(file).display(), reason);
                return Vec::new();
            }
        };

        items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                parse(item)
                    .map_err(|e| log::warn!("Skipping entry {} in {}: {}", index, file, e))
                    .ok()
            })
            .collect()
    }

    fn save_entries<T: Serialize>(
        &self,
        file: &str,
        items: &[T],
        parse: fn(Value) -> Result<T>,
    ) -> Result<()> {
        let path = self.dir.join(file);
        let kept: Vec<Value> = match self.read_file(file) {
            StoreFile::Missing => Vec::new(),
            StoreFile::Entries(existing) => existing
                .into_iter()
                .filter(|item| parse(item.clone()).is_err())
                .collect(),
            StoreFile::Unreadable(reason) => {
                return Err(IntakeError::UnreadableStore { path, reason });
            }
        };

        let mut entries = items
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if !kept.is_empty() {
            log::warn!("Keeping {} unparsed entries in {}", kept.len(), path.display());
        }
        entries.extend(kept);

        fs::create_dir_all(&self.dir)?;
        fs::write(&path, serde_json::to_string_pretty(&entries)?)?;
        log::debug!("Wrote {} entries to {}", items.len(), path.display());
        Ok(())
    }
}

fn parse_client(item: Value) -> Result<RawClientRecord> {
    match item {
        Value::Object(object) => record_from_object(object),
        _ => Err(IntakeError::InvalidImportPayload("not an object".to_string())),
    }
}

fn parse_draft(item: Value) -> Result<Draft> {
    Ok(serde_json::from_value(item)?)
}

impl ClientStore for JsonFileStore {
    fn load_clients(&self) -> Result<Vec<RawClientRecord>> {
        Ok(self.load_entries(CLIENTS_FILE, parse_client))
    }

    fn save_clients(&mut self, clients: &[RawClientRecord]) -> Result<()> {
        self.save_entries(CLIENTS_FILE, clients, parse_client)
    }

    fn load_drafts(&self) -> Result<Vec<Draft>> {
        Ok(self.load_entries(DRAFTS_FILE, parse_draft))
    }

    fn save_drafts(&mut self, drafts: &[Draft]) -> Result<()> {
        self.save_entries(DRAFTS_FILE, drafts, parse_draft)
    }
}

/// Add a client in front of the stored list
pub fn add_client(store: &mut dyn ClientStore, client: RawClientRecord) -> Result<()> {
    let mut clients = store.load_clients()?;
    clients.insert(0, client);
    store.save_clients(&clients)
}

/// Find a stored client by id
pub fn find_client(store: &dyn ClientStore, id: &str) -> Result<Option<RawClientRecord>> {
    Ok(store
        .load_clients()?
        .into_iter()
        .find(|client| client.id.as_deref() == Some(id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: &str) -> RawClientRecord {
        RawClientRecord {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        add_client(&mut store, client("CL-1")).unwrap();
        add_client(&mut store, client("CL-2")).unwrap();

        let ids: Vec<_> = store
            .load_clients()
            .unwrap()
            .into_iter()
            .map(|c| c.id.unwrap())
            .collect();
        assert_eq!(ids, vec!["CL-2", "CL-1"]);
        assert!(find_client(&store, "CL-1").unwrap().is_some());
        assert!(find_client(&store, "CL-9").unwrap().is_none());
    }

    #[test]
    fn test_json_store_missing_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("not-yet-created"));
        assert!(store.load_clients().unwrap().is_empty());
        assert!(store.load_drafts().unwrap().is_empty());
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("data"));
        store.save_clients(&[client("CL-1")]).unwrap();
        store.save_drafts(&[Draft::new("N-400")]).unwrap();

        let reopened = JsonFileStore::new(dir.path().join("data"));
        assert_eq!(reopened.load_clients().unwrap(), vec![client("CL-1")]);
        assert_eq!(reopened.load_drafts().unwrap().len(), 1);
        assert!(dir.path().join("data").join(CLIENTS_FILE).exists());
    }

    #[test]
    fn test_json_store_unreadable_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CLIENTS_FILE), "{ broken").unwrap();
        fs::write(dir.path().join(DRAFTS_FILE), "{\"not\": \"an array\"}").unwrap();

        let store = JsonFileStore::new(dir.path());
        assert!(store.load_clients().unwrap().is_empty());
        assert!(store.load_drafts().unwrap().is_empty());
    }

    #[test]
    fn test_json_store_skips_bad_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CLIENTS_FILE),
            r#"[{"id": "CL-1", "tripsCount": 3}, 17, {"id": "CL-2"}]"#,
        )
        .unwrap();

        let mut store = JsonFileStore::new(dir.path());
        let mut clients = store.load_clients().unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].trips_count.as_deref(), Some("3"));

        clients.remove(1);
        store.save_clients(&clients).unwrap();
        let text = fs::read_to_string(dir.path().join(CLIENTS_FILE)).unwrap();
        let saved: Vec<Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0]["id"], "CL-1");
        assert_eq!(saved[1], Value::from(17));
    }

    #[test]
    fn test_json_store_refuses_to_overwrite_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CLIENTS_FILE), "{ broken").unwrap();

        let mut store = JsonFileStore::new(dir.path());
        let err = store.save_clients(&[client("CL-1")]).unwrap_err();
        assert!(matches!(err, IntakeError::UnreadableStore { .. }));
        assert_eq!(
            fs::read_to_string(dir.path().join(CLIENTS_FILE)).unwrap(),
            "{ broken"
        );
    }
}
