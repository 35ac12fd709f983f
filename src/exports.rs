//! CSV serialization of resource lists and the blob storage exports land in.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("invalid blob key: {0}")]
    InvalidKey(String),
}

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for ExportError {
    fn from(err: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        ExportError::Storage(err.into_error())
    }
}

/// Serializes `rows` as CSV with a header row derived from the field names.
///
/// An empty list still yields a header when `headers` is given.
pub fn write_csv<T: Serialize>(rows: &[T], headers: &[&str]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(!rows.is_empty())
        .from_writer(Vec::new());

    if rows.is_empty() && !headers.is_empty() {
        writer.write_record(headers)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }

    Ok(writer.into_inner()?)
}

/// Stores finished export files.
pub trait BlobStore: Send + Sync {
    /// Writes `bytes` under `key`, returning the stored location.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<String, ExportError>;

    /// Removes the blob under `key`. A missing blob is not an error.
    fn delete(&self, key: &str) -> Result<(), ExportError>;
}

/// Blob store writing plain files under a root directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ExportError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_plain {
            return Err(ExportError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<String, ExportError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        log::info!("Stored export {} ({} bytes)", path.display(), bytes.len());
        Ok(path.display().to_string())
    }

    fn delete(&self, key: &str) -> Result<(), ExportError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                log::info!("Removed export {}", path.display());
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        id: i32,
        name: &'static str,
    }

    #[test]
    fn writes_header_and_rows() {
        let bytes = write_csv(
            &[
                Row { id: 1, name: "Acme" },
                Row {
                    id: 2,
                    name: "Smith, John",
                },
            ],
            &["id", "name"],
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "id,name\n1,Acme\n2,\"Smith, John\"\n"
        );
    }

    #[test]
    fn empty_export_keeps_header() {
        let bytes = write_csv::<Row>(&[], &["id", "name"]).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "id,name\n");
    }

    #[test]
    fn fs_store_writes_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        let location = store.put("customers/export.csv", b"id\n1\n").unwrap();

        assert!(location.ends_with("export.csv"));
        assert_eq!(
            fs::read(dir.path().join("customers/export.csv")).unwrap(),
            b"id\n1\n"
        );
    }

    #[test]
    fn fs_store_deletes_stored_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        store.put("1/customers.csv", b"id\n").unwrap();

        store.delete("1/customers.csv").unwrap();

        assert!(!dir.path().join("1/customers.csv").exists());
        store.delete("1/customers.csv").unwrap();
        assert!(matches!(
            store.delete("../outside.csv"),
            Err(ExportError::InvalidKey(_))
        ));
    }

    #[test]
    fn fs_store_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        assert!(matches!(
            store.put("../outside.csv", b""),
            Err(ExportError::InvalidKey(_))
        ));
        assert!(matches!(
            store.put("/etc/passwd", b""),
            Err(ExportError::InvalidKey(_))
        ));
    }
}
