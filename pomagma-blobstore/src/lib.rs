//! Content-addressed blob store: a `POMAGMA_BLOB_DIR` directory of immutable files named by their
//! SHA-1 hex digest, plus "blob ref" files naming one or more such digests
//! (`find_blob`/`create_blob`/`store_blob`/`load_blob_ref`/`dump_blob_ref`), built on `std::fs`
//! and the workspace's `sha1` pin.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use pomagma_util::{PomagmaError, Result};
use sha1::{Digest, Sha1};

const HEXDIGEST_SIZE: usize = 40;

/// A directory of immutable, content-addressed blob files.
pub struct BlobStore {
    dir: PathBuf,
    temp_counter: AtomicU64,
}

impl BlobStore {
    /// Opens (creating if necessary) a blob store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(BlobStore {
            dir,
            temp_counter: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path to the read-only blob named by `hexdigest`, whether or not it currently exists.
    pub fn find_blob(&self, hexdigest: &str) -> PathBuf {
        self.dir.join(hexdigest)
    }

    /// Returns a fresh temp-file path in the same directory, so the final rename in
    /// [`Self::store_blob`] is same-filesystem and therefore atomic.
    pub fn create_blob(&self) -> PathBuf {
        let pid = std::process::id();
        let count = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        let path = self.dir.join(format!("temp.{pid}.{count}"));
        if path.exists() {
            let _ = fs::remove_file(&path);
        }
        path
    }

    /// Hashes `temp_path`, renames it to `<hexdigest>` if no such blob already exists (otherwise
    /// deletes it), and returns the hexdigest. Takes ownership of the file at `temp_path`.
    pub fn store_blob(&self, temp_path: &Path) -> Result<String> {
        let hexdigest = hash_file(temp_path)?;
        let path = self.find_blob(&hexdigest);
        if path.exists() {
            fs::remove_file(temp_path)?;
        } else {
            fs::rename(temp_path, &path)?;
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_readonly(true);
            fs::set_permissions(&path, perms)?;
        }
        tracing::debug!(hexdigest = %hexdigest, "stored blob");
        Ok(hexdigest)
    }

    /// Writes `bytes` as a temp file and stores it in one step, a convenience over
    /// `create_blob`+`store_blob` for in-memory payloads.
    pub fn store_bytes(&self, bytes: &[u8]) -> Result<String> {
        let temp_path = self.create_blob();
        fs::write(&temp_path, bytes)?;
        self.store_blob(&temp_path)
    }

    pub fn load_bytes(&self, hexdigest: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.find_blob(hexdigest))?)
    }

    /// Reads a blob-ref file: a single hex digest, followed by zero or more newline-separated
    /// "sub" digests (used by snapshot dumps that reference several component blobs).
    pub fn load_blob_ref(&self, path: &Path) -> Result<Vec<String>> {
        let contents = fs::read_to_string(path)?;
        let digests: Vec<String> = contents
            .split('\n')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        for digest in &digests {
            if digest.len() != HEXDIGEST_SIZE {
                return Err(PomagmaError::MalformedBlobRef(digest.clone()));
            }
        }
        Ok(digests)
    }

    /// Writes a blob-ref file naming `hexdigest` followed by `sub_hexdigests`, one per line.
    pub fn dump_blob_ref(&self, hexdigest: &str, path: &Path, sub_hexdigests: &[String]) -> Result<()> {
        debug_assert_eq!(hexdigest.len(), HEXDIGEST_SIZE);
        let mut file = fs::File::create(path)?;
        file.write_all(hexdigest.as_bytes())?;
        for sub in sub_hexdigests {
            debug_assert_eq!(sub.len(), HEXDIGEST_SIZE);
            file.write_all(b"\n")?;
            file.write_all(sub.as_bytes())?;
        }
        Ok(())
    }
}

fn hash_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha1::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_find_round_trips_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = BlobStore::new(dir.path()).expect("open");
        let digest = store.store_bytes(b"hello blob").expect("store");
        assert_eq!(digest.len(), HEXDIGEST_SIZE);
        assert_eq!(store.load_bytes(&digest).expect("load"), b"hello blob");
    }

    #[test]
    fn storing_same_bytes_twice_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = BlobStore::new(dir.path()).expect("open");
        let a = store.store_bytes(b"same content").expect("store a");
        let b = store.store_bytes(b"same content").expect("store b");
        assert_eq!(a, b);
    }

    #[test]
    fn blob_ref_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = BlobStore::new(dir.path()).expect("open");
        let main = store.store_bytes(b"main section").expect("store main");
        let sub = store.store_bytes(b"sub section").expect("store sub");
        let ref_path = dir.path().join("snapshot.ref");
        store
            .dump_blob_ref(&main, &ref_path, &[sub.clone()])
            .expect("dump ref");
        let loaded = store.load_blob_ref(&ref_path).expect("load ref");
        assert_eq!(loaded, vec![main, sub]);
    }

    #[test]
    fn malformed_blob_ref_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = BlobStore::new(dir.path()).expect("open");
        let path = dir.path().join("bad.ref");
        fs::write(&path, b"not-a-hexdigest").unwrap();
        assert!(store.load_blob_ref(&path).is_err());
    }
}
