use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::error::StoreError;
use crate::models::{Collection, Sequences};

pub const SEQUENCES_FILE: &str = "sequences.json";

/// Whole-document persistence for the three collections.
///
/// Every call reads or rewrites the full document. Callers that mutate are
/// expected to hold the application write lock across read and write.
pub trait DocumentStore: Send + Sync {
    fn read(&self, collection: Collection) -> Result<Value, StoreError>;
    fn write(&self, collection: Collection, doc: &Value) -> Result<(), StoreError>;

    fn read_sequences(&self) -> Result<Sequences, StoreError>;
    fn write_sequences(&self, seq: &Sequences) -> Result<(), StoreError>;
}

/// Stores each collection as a pretty-printed JSON file in one directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_of(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.file_name())
    }

    /// Create the data directory and an empty document for every missing
    /// collection. Existing files are left alone.
    pub fn ensure_seeded(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;

        for collection in Collection::ALL {
            let path = self.path_of(collection);
            if path.exists() {
                continue;
            }
            tracing::info!(path = %path.display(), "seeding empty {}", collection.name());
            write_json(&path, &collection.empty_document())?;
        }
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn read(&self, collection: Collection) -> Result<Value, StoreError> {
        let path = self.path_of(collection);
        let doc = read_json(&path)?;
        check_shape(collection, &doc, &path)?;
        Ok(doc)
    }

    fn write(&self, collection: Collection, doc: &Value) -> Result<(), StoreError> {
        let path = self.path_of(collection);
        check_shape(collection, doc, &path)?;
        write_json(&path, doc)
    }

    fn read_sequences(&self) -> Result<Sequences, StoreError> {
        let path = self.root.join(SEQUENCES_FILE);
        if !path.exists() {
            return Ok(Sequences::default());
        }
        let doc = read_json(&path)?;
        serde_json::from_value(doc).map_err(|source| StoreError::Json { path, source })
    }

    fn write_sequences(&self, seq: &Sequences) -> Result<(), StoreError> {
        let path = self.root.join(SEQUENCES_FILE);
        let doc = serde_json::to_value(seq).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        write_json(&path, &doc)
    }
}

fn read_json(path: &Path) -> Result<Value, StoreError> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

// Write to a sibling temp file, then rename over the target
fn write_json(path: &Path, doc: &Value) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let text = serde_json::to_string_pretty(doc).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    fs::write(&tmp_path, text).map_err(io_err)?;
    fs::rename(&tmp_path, path).map_err(io_err)?;
    Ok(())
}

fn check_shape(collection: Collection, doc: &Value, path: &Path) -> Result<(), StoreError> {
    let corrupt = |reason: &str| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    match collection {
        Collection::Projects => {
            let Some(obj) = doc.as_object() else {
                return Err(corrupt("expected an object with developer and designer arrays"));
            };
            for key in ["developer", "designer"] {
                if !obj.get(key).is_some_and(Value::is_array) {
                    return Err(corrupt(&format!("missing {key} array")));
                }
            }
        }
        Collection::Achievements | Collection::Testimonials => {
            if !doc.is_array() {
                return Err(corrupt("expected an array"));
            }
        }
    }
    Ok(())
}
