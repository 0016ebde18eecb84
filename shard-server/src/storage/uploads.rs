//! Filesystem-backed upload storage.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Length of the random suffix added when a filename is taken.
const SUFFIX_LEN: usize = 7;

/// Attempts at finding a free name before giving up.
const MAX_ATTEMPTS: usize = 100;

/// Errors from the upload store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The client-supplied filename has nothing usable left after sanitizing.
    #[error("Invalid upload name: {0}")]
    InvalidName(String),

    /// A stored-file reference points outside the storage root.
    #[error("Invalid upload reference: {0}")]
    InvalidReference(String),

    /// No free filename could be found.
    #[error("Could not find an available name for {0}")]
    NameExhausted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Directory of uploaded files, addressed by stored filename.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    /// Open (and create if needed) the storage root.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;
        let root = root.canonicalize()?;
        debug!("Upload storage at {:?}", root);
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `data` under a sanitized, unused version of `original_name`.
    ///
    /// Returns the stored filename, which is the key for later lookups.
    pub fn save(&self, original_name: &str, data: &[u8]) -> Result<String, StorageError> {
        let name = valid_filename(original_name)
            .ok_or_else(|| StorageError::InvalidName(original_name.to_string()))?;

        let mut candidate = name.clone();
        for _ in 0..MAX_ATTEMPTS {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.root.join(&candidate))
            {
                Ok(mut file) => {
                    file.write_all(data)?;
                    info!("Stored upload {} ({} bytes)", candidate, data.len());
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    candidate = with_random_suffix(&name);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StorageError::NameExhausted(name))
    }

    /// Resolve a stored filename to its path inside the root.
    ///
    /// Absolute paths, `..`, and symlinks leading out of the root are rejected.
    pub fn path(&self, name: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(name);
        let is_plain = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(StorageError::InvalidReference(name.to_string()));
        }

        let path = self.root.join(relative);
        if path.exists() && !path.canonicalize()?.starts_with(&self.root) {
            return Err(StorageError::InvalidReference(name.to_string()));
        }
        Ok(path)
    }

    /// Remove a stored file.
    pub fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path(name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reduce a client filename to a safe basename.
///
/// Drops any directory part, turns spaces into underscores and keeps only
/// alphanumerics, `-`, `_` and `.`.
fn valid_filename(original: &str) -> Option<String> {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => None,
        _ => Some(cleaned),
    }
}

/// `edges.csv` -> `edges_Ab3xY9q.csv`
fn with_random_suffix(name: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();

    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}_{}{}", &name[..dot], suffix, &name[dot..]),
        _ => format!("{}_{}", name, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_valid_filename() {
        assert_eq!(valid_filename("edges.csv"), Some("edges.csv".to_string()));
        assert_eq!(valid_filename("my edges.csv"), Some("my_edges.csv".to_string()));
        assert_eq!(valid_filename("../../etc/passwd"), Some("passwd".to_string()));
        assert_eq!(valid_filename("C:\\data\\in.csv"), Some("in.csv".to_string()));
        assert_eq!(valid_filename("a$b?.csv"), Some("ab.csv".to_string()));
        assert_eq!(valid_filename(".."), None);
        assert_eq!(valid_filename("dir/"), None);
        assert_eq!(valid_filename(""), None);
    }

    #[test]
    fn test_random_suffix_keeps_extension() {
        let name = with_random_suffix("edges.csv");
        assert!(name.starts_with("edges_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "edges_.csv".len() + SUFFIX_LEN);

        let name = with_random_suffix("README");
        assert_eq!(name.len(), "README_".len() + SUFFIX_LEN);
    }

    #[test]
    fn test_save_and_resolve() {
        let dir = tempdir().unwrap();
        let storage = UploadStorage::new(dir.path().join("uploads")).unwrap();

        let name = storage.save("edges.csv", b"a,b\n1,2\n").unwrap();
        assert_eq!(name, "edges.csv");
        assert!(storage.path(&name).unwrap().is_file());

        let path = storage.path(&name).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "a,b\n1,2\n");
    }

    #[test]
    fn test_save_deduplicates_names() {
        let dir = tempdir().unwrap();
        let storage = UploadStorage::new(dir.path()).unwrap();

        let first = storage.save("edges.csv", b"first").unwrap();
        let second = storage.save("edges.csv", b"second").unwrap();
        assert_ne!(first, second);
        assert!(second.starts_with("edges_"));

        let read = |n: &str| std::fs::read_to_string(storage.path(n).unwrap()).unwrap();
        assert_eq!(read(&first), "first");
        assert_eq!(read(&second), "second");
    }

    #[test]
    fn test_save_rejects_unusable_name() {
        let dir = tempdir().unwrap();
        let storage = UploadStorage::new(dir.path()).unwrap();
        assert!(matches!(
            storage.save("..", b"x"),
            Err(StorageError::InvalidName(_))
        ));
    }

    #[test]
    fn test_path_rejects_escapes() {
        let dir = tempdir().unwrap();
        let storage = UploadStorage::new(dir.path().join("uploads")).unwrap();

        for bad in ["", "../secret.csv", "/etc/passwd", "a/../../b.csv", "./x.csv"] {
            assert!(
                matches!(storage.path(bad), Err(StorageError::InvalidReference(_))),
                "should reject {:?}",
                bad
            );
        }
        assert!(storage.path("missing.csv").is_ok());
        assert!(!storage.path("missing.csv").unwrap().exists());
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let storage = UploadStorage::new(dir.path()).unwrap();

        let name = storage.save("gone.csv", b"x").unwrap();
        storage.delete(&name).unwrap();
        assert!(!storage.path(&name).unwrap().exists());
        // Deleting twice is fine
        storage.delete(&name).unwrap();
    }
}
