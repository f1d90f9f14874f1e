//! Disk tier: one file per key under a dedicated directory.
//!
//! The tier is unbounded. Entries live until [`DiskCache::remove`] or
//! [`DiskCache::clear`]. Writes are best-effort: failures are logged and
//! never returned. Concurrent writers to the same key are not serialized.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task;
use tracing::{debug, error, warn};

use crate::cache::key::normalize;
use crate::cache::Cacheable;
use crate::codec::Codec;
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Byte Store ==
/// Blocking filesystem primitives the disk tier is built on.
pub trait ByteStore: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Creates or overwrites the file at `path`.
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    /// Deletes a file. A missing file is not an error.
    fn delete(&self, path: &Path) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// [`ByteStore`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl ByteStore for FsStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        fs::write(path, bytes)
    }

    fn delete(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }
}

// == Disk Cache ==
/// Durable tier storing encoded asset bytes, named by normalized key.
pub struct DiskCache<A> {
    dir: PathBuf,
    store: Arc<dyn ByteStore>,
    codec: Arc<dyn Codec<Asset = A>>,
}

impl<A: Clone + Send + Sync + 'static> DiskCache<A> {
    /// Creates the tier rooted at `dir`, creating the directory if needed.
    ///
    /// A directory that cannot be created is logged, not returned: the tier
    /// still works as an always-missing cache until the directory appears.
    pub fn new(
        dir: impl Into<PathBuf>,
        store: Arc<dyn ByteStore>,
        codec: Arc<dyn Codec<Asset = A>>,
    ) -> Self {
        let cache = Self {
            dir: dir.into(),
            store,
            codec,
        };
        ensure_dir(&*cache.store, &cache.dir);
        cache
    }

    /// Opens the tier at [`Config::cache_dir`] on the real filesystem.
    pub fn open(config: &Config, codec: Arc<dyn Codec<Asset = A>>) -> Self {
        Self::new(config.cache_dir(), Arc::new(FsStore), codec)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(normalize(key).as_str())
    }

    /// Reads and decodes the entry for `key` on the blocking pool.
    ///
    /// Fails with `NotFound` if there is no file, and `CorruptData` if the
    /// file cannot be read or decoded. Corrupt files are left in place.
    pub async fn get(&self, key: &str) -> Result<A> {
        let path = self.path_for(key);
        let store = Arc::clone(&self.store);
        let codec = Arc::clone(&self.codec);
        let owned_key = key.to_string();

        task::spawn_blocking(move || read_entry(&*store, &*codec, &path, owned_key))
            .await
            .unwrap_or_else(|err| {
                Err(CacheError::CorruptData {
                    key: key.to_string(),
                    reason: err.to_string(),
                })
            })
    }

    /// Encodes `value` and writes it for `key`.
    ///
    /// `None` is a no-op and leaves any existing file untouched.
    pub async fn put(&self, value: Option<A>, key: &str) {
        let Some(value) = value else {
            return;
        };

        let path = self.path_for(key);
        let store = Arc::clone(&self.store);
        let codec = Arc::clone(&self.codec);
        let owned_key = key.to_string();

        let written = task::spawn_blocking(move || {
            write_entry(&*store, &*codec, &path, &value, &owned_key)
        })
        .await;
        if let Err(err) = written {
            warn!(key, error = %err, "disk tier write task failed");
        }
    }

    /// Deletes the file for `key` on the blocking pool, ignoring failures.
    pub async fn remove(&self, key: &str) {
        let path = self.path_for(key);
        let store = Arc::clone(&self.store);

        let removed = task::spawn_blocking(move || store.delete(&path)).await;
        match removed {
            Ok(Ok(())) => {}
            Ok(Err(err)) => debug!(key, error = %err, "disk tier remove failed"),
            Err(err) => warn!(key, error = %err, "disk tier remove task failed"),
        }
    }

    /// Deletes the whole directory on the blocking pool and recreates it empty.
    pub async fn clear(&self) {
        let dir = self.dir.clone();
        let store = Arc::clone(&self.store);

        let cleared = task::spawn_blocking(move || clear_dir(&*store, &dir)).await;
        if let Err(err) = cleared {
            warn!(dir = %self.dir.display(), error = %err, "disk tier clear task failed");
        }
    }
}

fn ensure_dir(store: &dyn ByteStore, dir: &Path) {
    if store.exists(dir) {
        return;
    }
    if let Err(err) = store.create_dir_all(dir) {
        let err = CacheError::DirectoryOperation(err);
        error!(dir = %dir.display(), error = %err, "failed to create disk tier directory");
    }
}

fn clear_dir(store: &dyn ByteStore, dir: &Path) {
    if let Err(err) = store.remove_dir_all(dir) {
        if err.kind() != io::ErrorKind::NotFound {
            error!(dir = %dir.display(), error = %err, "failed to clear disk tier");
        }
    }
    ensure_dir(store, dir);
}

fn read_entry<A: Clone + Send + Sync + 'static>(
    store: &dyn ByteStore,
    codec: &dyn Codec<Asset = A>,
    path: &Path,
    key: String,
) -> Result<A> {
    if !store.exists(path) {
        return Err(CacheError::NotFound(key));
    }

    let bytes = match store.read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            return Err(CacheError::CorruptData {
                key,
                reason: err.to_string(),
            })
        }
    };

    codec.decode(&bytes).map_err(|err| CacheError::CorruptData {
        key,
        reason: err.to_string(),
    })
}

fn write_entry<A: Clone + Send + Sync + 'static>(
    store: &dyn ByteStore,
    codec: &dyn Codec<Asset = A>,
    path: &Path,
    value: &A,
    key: &str,
) {
    let bytes = match codec.encode(value) {
        Ok(bytes) => bytes,
        Err(err) => {
            let err = CacheError::EncodeFailure {
                key: key.to_string(),
                reason: err.to_string(),
            };
            debug!(error = %err, "skipping disk tier write");
            return;
        }
    };

    if let Err(err) = store.write(path, &bytes) {
        warn!(key, path = %path.display(), error = %err, "disk tier write failed");
    }
}

impl<A> fmt::Debug for DiskCache<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiskCache").field("dir", &self.dir).finish()
    }
}

#[async_trait]
impl<A: Clone + Send + Sync + 'static> Cacheable<str> for DiskCache<A> {
    type Value = A;

    async fn get(&self, key: &str) -> Result<A> {
        DiskCache::get(self, key).await
    }

    async fn put(&self, value: Option<A>, key: &str) {
        DiskCache::put(self, value, key).await
    }

    async fn remove(&self, key: &str) {
        DiskCache::remove(self, key).await
    }

    async fn clear(&self) {
        DiskCache::clear(self).await
    }
}
