//! Persisted shard files
//!
//! Layout under the output root:
//! - `json/<prefix>.json`: map-mode shard, read-modify-write
//! - `js/<prefix>.js`: array-mode script rendered from the json shard
//!
//! Writes go to a temp file that is renamed over the target, so a failed
//! write never leaves a half-written shard behind.

use crate::model::{shard_prefix, AddressGroup, Directory};
use crate::serializer::{from_map_json, to_array_script, to_map_json, CALLBACK};
use crate::{Diagnostics, Error, Result};
use serde::de::Error as _;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const JSON_DIR: &str = "json";
pub const JS_DIR: &str = "js";
const JSON_EXT: &str = "json";
const JS_EXT: &str = "js";

/// Shard files below one output root
#[derive(Debug, Clone)]
pub struct ShardStore {
    root: PathBuf,
    indent: Option<usize>,
    callback: String,
}

impl ShardStore {
    /// Store rooted at `root`; a root already ending in `json` is used as is
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let mut root = root.into();
        if root.file_name().is_some_and(|name| name == JSON_DIR || name == JS_DIR) {
            root.pop();
        }
        Self {
            root,
            indent: None,
            callback: CALLBACK.to_string(),
        }
    }

    /// Pretty-print map-mode output with `indent` spaces
    pub fn with_indent(mut self, indent: Option<usize>) -> Self {
        self.indent = indent;
        self
    }

    /// Callback name wrapped around array-mode scripts
    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = callback.into();
        self
    }

    pub fn callback(&self) -> &str {
        &self.callback
    }

    pub fn json_dir(&self) -> PathBuf {
        self.root.join(JSON_DIR)
    }

    pub fn js_dir(&self) -> PathBuf {
        self.root.join(JS_DIR)
    }

    pub fn shard_path(&self, prefix: &str) -> PathBuf {
        self.json_dir().join(format!("{prefix}.{JSON_EXT}"))
    }

    pub fn script_path(&self, prefix: &str) -> PathBuf {
        self.js_dir().join(format!("{prefix}.{JS_EXT}"))
    }

    /// Read a persisted shard
    ///
    /// Missing file → `Ok(None)`. Undecodable content, or an entry whose key
    /// is not its group's zip code or lies outside `prefix` →
    /// [`Error::PersistedStateCorrupt`].
    pub fn load(&self, prefix: &str) -> Result<Option<BTreeMap<String, AddressGroup>>> {
        let path = self.shard_path(prefix);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Shard not found, starting empty");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), bytes = bytes.len(), "Shard found");
        let groups = from_map_json(&bytes)
            .map_err(|source| Error::PersistedStateCorrupt { path: path.clone(), source })?;

        if let Some((key, group)) = groups
            .iter()
            .find(|(key, group)| shard_prefix(key) != prefix || **key != group.zip_code)
        {
            let source = serde_json::Error::custom(format!(
                "key {key} (zip code {}) does not belong to shard {prefix}",
                group.zip_code
            ));
            return Err(Error::PersistedStateCorrupt { path, source });
        }
        Ok(Some(groups))
    }

    /// Load a shard as a [`Directory`], empty when missing
    pub fn open(&self, prefix: &str) -> Result<Directory> {
        let persisted = self.load(prefix)?.unwrap_or_default();
        Ok(Directory::from_groups(prefix, persisted))
    }

    /// Write `staged` to its shard file
    ///
    /// **Algorithm:**
    /// 1. `renew`: ignore existing content, write `staged` with sorted keys
    /// 2. Otherwise load the persisted shard (corrupt → abort, file untouched)
    ///    and merge `staged` into it
    /// 3. Write atomically and return the shard as written
    ///
    /// Guard violations met while merging into persisted groups are counted
    /// in `diag`.
    pub fn write(&self, staged: &Directory, renew: bool, diag: &mut Diagnostics) -> Result<Directory> {
        let prefix = staged.prefix();
        let persisted = if renew {
            BTreeMap::new()
        } else {
            self.load(prefix)?.unwrap_or_default()
        };
        let merged = Directory::from_persisted(prefix, persisted, staged, diag);

        let bytes = to_map_json(&merged, self.indent)?;
        let path = self.shard_path(prefix);
        write_atomic(&path, &bytes)?;
        info!(
            path = %path.display(),
            zip_codes = merged.len(),
            addresses = merged.address_count(),
            renew,
            "Shard written"
        );
        Ok(merged)
    }

    /// Render the persisted shard for `prefix` as an array-mode script
    ///
    /// The script goes below `out` and is wrapped in `out`'s callback.
    pub fn write_script(&self, prefix: &str, out: &ShardStore) -> Result<PathBuf> {
        let dir = self
            .load(prefix)?
            .map(|groups| Directory::from_groups(prefix, groups))
            .ok_or_else(|| Error::InvalidInput(format!("no shard for prefix {prefix}")))?;
        let script = to_array_script(&dir, &out.callback)?;
        let path = out.script_path(prefix);
        write_atomic(&path, script.as_bytes())?;
        debug!(path = %path.display(), zip_codes = dir.len(), "Script written");
        Ok(path)
    }

    /// Prefixes of every `*.json` shard present, sorted
    pub fn prefixes(&self) -> Result<Vec<String>> {
        let dir = self.json_dir();
        let mut prefixes = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == JSON_EXT) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    prefixes.push(stem.to_string());
                }
            }
        }
        prefixes.sort();
        Ok(prefixes)
    }
}

/// Write via `<path>.tmp` + rename; parent directories are created
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
