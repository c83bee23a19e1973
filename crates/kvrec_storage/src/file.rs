//! Directory-backed key-value store for persistent storage.

use crate::backend::KvStore;
use crate::error::{StorageError, StorageResult};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix of in-flight temporary files. Never produced by key encoding.
const TEMP_PREFIX: &str = ".tmp-";

/// Longest encoded name stored in one path component. Even, so a byte
/// never straddles two components.
const SEGMENT_LEN: usize = 128;

/// Marks a directory holding the continuation of a long encoded name.
/// Not a hex digit, so it never collides with a file name.
const DIR_SUFFIX: char = '~';

/// Longest key in bytes. Keeps the full path well inside `PATH_MAX`.
pub const MAX_KEY_LEN: usize = 1024;

/// A directory-backed key-value store.
///
/// Each key is stored in its own file whose name is the lowercase hex
/// encoding of the key, so any string key maps to a portable file name.
/// Encodings longer than one path component are split across nested
/// directories named `<segment>~`. Keys up to [`MAX_KEY_LEN`] bytes are
/// accepted; longer keys are rejected by `put` and read as absent.
/// Data survives process restarts.
///
/// # Atomicity
///
/// `put` writes the value to a temporary sibling and renames it over the
/// target, so a concurrent `get` sees either the old or the new value,
/// never a torn one. Nothing spans two keys.
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads. It holds
/// no cache; every call goes to the file system.
///
/// # Example
///
/// ```no_run
/// use kvrec_storage::{FileKv, KvStore};
/// use std::path::Path;
///
/// let kv = FileKv::open(Path::new("data")).unwrap();
/// kv.put("todos", b"[]").unwrap();
/// ```
#[derive(Debug)]
pub struct FileKv {
    dir: PathBuf,
    temp_seq: AtomicU64,
}

impl FileKv {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or is not a
    /// directory.
    pub fn open(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir)?;
        if !dir.is_dir() {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", dir.display()),
            )));
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            temp_seq: AtomicU64::new(0),
        })
    }

    /// Returns the root directory of the store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Maps a key to its file, or `None` if the key is too long to store.
    fn key_path(&self, key: &str) -> StorageResult<Option<PathBuf>> {
        if key.is_empty() {
            return Err(StorageError::invalid_key(key, "empty key"));
        }
        if key.len() > MAX_KEY_LEN {
            return Ok(None);
        }

        let encoded = encode_key(key);
        let mut path = self.dir.clone();
        let mut rest = encoded.as_str();
        while rest.len() > SEGMENT_LEN {
            let (segment, tail) = rest.split_at(SEGMENT_LEN);
            path.push(format!("{segment}{DIR_SUFFIX}"));
            rest = tail;
        }
        path.push(rest);
        Ok(Some(path))
    }

    fn temp_path(&self) -> PathBuf {
        let seq = self.temp_seq.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!("{TEMP_PREFIX}{}-{seq}", std::process::id()))
    }

    /// Removes now-empty segment directories between `path` and the root.
    fn prune_dirs(&self, path: &Path) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir == self.dir || fs::remove_dir(dir).is_err() {
                break;
            }
            current = dir.parent();
        }
    }

    fn collect_keys(
        &self,
        dir: &Path,
        encoded_prefix: &str,
        prefix: &str,
        keys: &mut Vec<String>,
    ) -> StorageResult<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with(TEMP_PREFIX) {
                continue;
            }

            if entry.file_type()?.is_dir() {
                match name.strip_suffix(DIR_SUFFIX) {
                    Some(segment) if segment.len() == SEGMENT_LEN && is_hex(segment) => {
                        let nested = format!("{encoded_prefix}{segment}");
                        self.collect_keys(&entry.path(), &nested, prefix, keys)?;
                    }
                    _ => tracing::debug!(dir = name, "ignoring foreign directory in store"),
                }
                continue;
            }

            match decode_key(&format!("{encoded_prefix}{name}")) {
                Some(key) if key.starts_with(prefix) => keys.push(key),
                Some(_) => {}
                None => tracing::debug!(file = name, "ignoring foreign file in store directory"),
            }
        }
        Ok(())
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let Some(path) = self.key_path(key)? else {
            return Ok(None);
        };
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let path = self.key_path(key)?.ok_or_else(|| {
            StorageError::invalid_key(key, format!("longer than {MAX_KEY_LEN} bytes"))
        })?;
        let temp = self.temp_path();

        let result = (|| -> io::Result<()> {
            let mut file = fs::File::create(&temp)?;
            file.write_all(value)?;
            file.sync_all()?;
            let parent = path.parent().unwrap_or(&self.dir);
            fs::create_dir_all(parent)?;
            match fs::rename(&temp, &path) {
                // A concurrent delete pruned the segment directory.
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    fs::create_dir_all(parent)?;
                    fs::rename(&temp, &path)
                }
                other => other,
            }
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let Some(path) = self.key_path(key)? else {
            return Ok(());
        };
        match fs::remove_file(&path) {
            Ok(()) => {
                self.prune_dirs(&path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        self.collect_keys(&self.dir, "", prefix, &mut keys)?;
        keys.sort();
        Ok(keys)
    }
}

fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() * 2);
    for byte in key.as_bytes() {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

fn decode_key(name: &str) -> Option<String> {
    if name.is_empty() || name.len() % 2 != 0 {
        return None;
    }
    let bytes = (0..name.len())
        .step_by(2)
        .map(|i| {
            let pair = name.get(i..i + 2)?;
            if !is_hex(pair) {
                return None;
            }
            u8::from_str_radix(pair, 16).ok()
        })
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}

fn is_hex(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
