use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{now_millis, ConfigDocument};

/// Persistence boundary for composed documents. The engine only ever hands
/// over complete documents; partial writes are not part of the contract.
pub trait ConfigStore {
    fn list(&self) -> Result<Vec<ConfigDocument>, String>;
    fn load(&self, id: &str) -> Result<Option<ConfigDocument>, String>;
    fn save(&self, document: &ConfigDocument) -> Result<(), String>;
    fn delete(&self, id: &str) -> Result<bool, String>;
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct DocumentStore {
    #[serde(default)]
    documents: HashMap<String, ConfigDocument>,
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

/// File-backed store: one pretty-printed JSON file holding every document,
/// read and rewritten whole on each operation.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn default_path() -> Result<PathBuf, String> {
        let home = dirs::home_dir().ok_or_else(|| "Cannot determine home directory".to_string())?;
        Ok(home.join(".opencfg").join("configs.json"))
    }

    pub fn open_default() -> Result<Self, String> {
        Ok(JsonFileStore::new(Self::default_path()?))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_store(&self) -> Result<DocumentStore, String> {
        if !self.path.exists() {
            return Ok(DocumentStore::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| format!("Failed to read {}: {}", self.path.display(), e))?;
        if content.trim().is_empty() {
            return Ok(DocumentStore::default());
        }
        match serde_json::from_str(&content) {
            Ok(store) => Ok(store),
            Err(e) => {
                log::warn!(
                    "Corrupted document store {}, resetting to default: {}",
                    self.path.display(),
                    e
                );
                Ok(DocumentStore::default())
            }
        }
    }

    fn write_store(&self, store: &DocumentStore) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create store directory: {}", e))?;
        }
        let content = serde_json::to_string_pretty(store)
            .map_err(|e| format!("Failed to serialize document store: {}", e))?;
        std::fs::write(&self.path, content)
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))
    }
}

impl ConfigStore for JsonFileStore {
    fn list(&self) -> Result<Vec<ConfigDocument>, String> {
        let store = self.read_store()?;
        let mut documents: Vec<ConfigDocument> = store.documents.into_values().collect();
        documents.sort_by(|a, b| {
            let lhs = a.updated_at.or(a.created_at).unwrap_or(0);
            let rhs = b.updated_at.or(b.created_at).unwrap_or(0);
            rhs.cmp(&lhs)
        });
        Ok(documents)
    }

    fn load(&self, id: &str) -> Result<Option<ConfigDocument>, String> {
        let store = self.read_store()?;
        Ok(store.documents.get(id).cloned())
    }

    fn save(&self, document: &ConfigDocument) -> Result<(), String> {
        let id = document.id.trim();
        if id.is_empty() {
            return Err("Document id is required".to_string());
        }
        let mut store = self.read_store()?;
        let mut document = document.clone();
        if document.created_at.is_none() {
            document.created_at = Some(now_millis());
        }
        store.documents.insert(id.to_string(), document);
        self.write_store(&store)
    }

    fn delete(&self, id: &str) -> Result<bool, String> {
        let mut store = self.read_store()?;
        let removed = store.documents.remove(id).is_some();
        if removed {
            self.write_store(&store)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_store() -> JsonFileStore {
        let dir = std::env::temp_dir().join(format!("opencfg-test-{}", Uuid::new_v4()));
        JsonFileStore::new(dir.join("configs.json"))
    }

    #[test]
    fn save_load_delete_roundtrip() {
        let store = temp_store();
        let mut document = ConfigDocument::new("Main");
        document
            .agents
            .insert("explore".to_string(), serde_json::json!({ "model": "m" }));

        store.save(&document).expect("save");
        let loaded = store.load(&document.id).expect("load").expect("present");
        assert_eq!(loaded.name, "Main");
        assert_eq!(loaded.agents, document.agents);

        assert!(store.delete(&document.id).expect("delete"));
        assert!(!store.delete(&document.id).expect("second delete"));
        assert!(store.load(&document.id).expect("load").is_none());
    }

    #[test]
    fn missing_file_lists_empty() {
        let store = temp_store();
        assert!(store.list().expect("list").is_empty());
    }

    #[test]
    fn corrupted_file_resets_to_default() {
        let store = temp_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).expect("mkdir");
        std::fs::write(store.path(), "{not json").expect("write garbage");
        assert!(store.list().expect("list").is_empty());
    }

    #[test]
    fn save_requires_an_id() {
        let store = temp_store();
        let document = ConfigDocument {
            name: "No id".to_string(),
            ..ConfigDocument::default()
        };
        assert!(store.save(&document).is_err());
    }

    #[test]
    fn list_sorts_most_recently_updated_first() {
        let store = temp_store();
        for (id, stamp) in [("a", 1000), ("b", 3000), ("c", 2000)] {
            let document = ConfigDocument {
                id: id.to_string(),
                name: id.to_uppercase(),
                updated_at: Some(stamp),
                ..ConfigDocument::default()
            };
            store.save(&document).expect("save");
        }
        let listed = store.list().expect("list");
        let ids: Vec<&str> = listed.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn unknown_store_fields_round_trip() {
        let store = temp_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).expect("mkdir");
        std::fs::write(store.path(), r#"{ "documents": {}, "schemaVersion": 2 }"#)
            .expect("seed file");

        store.save(&ConfigDocument::new("Main")).expect("save");
        let content = std::fs::read_to_string(store.path()).expect("read back");
        assert!(content.contains("schemaVersion"));
    }
}
