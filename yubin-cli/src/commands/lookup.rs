//! `lookup`: one zip code against the persisted shards
//!
//! Map-mode shards yield the full address group; array-mode scripts yield
//! `{zip: record}`. A missing shard is the same as a missing zip code.

use clap::ValueEnum;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;
use yubin_common::model::shard_prefix;
use yubin_common::serializer::{lookup_array, lookup_map, wrap_callback};
use yubin_common::{width, Error, Result, ShardStore};

/// Which shard form to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// `json/<prefix>.json`, map mode
    #[default]
    Json,
    /// `js/<prefix>.js`, array mode
    Js,
}

#[derive(Debug, Clone)]
pub struct LookupOptions {
    pub zip_code: String,
    /// Output root holding `json/` and `js/`
    pub root: PathBuf,
    pub format: Format,
    /// Function name the array-mode scripts were rendered with
    pub script_callback: String,
    /// Wrap the result as `callback(…)`
    pub callback: Option<String>,
}

/// Accept `1000001`, `100-0001` and full-width digits
pub fn normalize_zip(input: &str) -> Result<String> {
    let folded: String = width::fold(input.trim())
        .chars()
        .filter(|c| *c != '-')
        .collect();
    if folded.len() == 7 && folded.bytes().all(|b| b.is_ascii_digit()) {
        Ok(folded)
    } else {
        Err(Error::InvalidZipCode(input.to_string()))
    }
}

/// Rendered result, `None` when the zip code is not in the directory
pub fn run(opts: &LookupOptions) -> Result<Option<String>> {
    let zip_code = normalize_zip(&opts.zip_code)?;
    let store = ShardStore::new(&opts.root);
    let prefix = shard_prefix(&zip_code);

    let path = match opts.format {
        Format::Json => store.shard_path(prefix),
        Format::Js => store.script_path(prefix),
    };
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No shard for prefix");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let value = match opts.format {
        Format::Json => lookup_map(&bytes, &zip_code)?.map(serde_json::to_value),
        Format::Js => {
            let body = String::from_utf8(bytes)
                .map_err(|_| Error::InvalidInput(format!("{} is not UTF-8", path.display())))?;
            lookup_array(&body, &zip_code, &opts.script_callback)?.map(serde_json::to_value)
        }
    };
    let Some(value) = value.transpose()? else {
        return Ok(None);
    };

    let rendered = match &opts.callback {
        Some(callback) => wrap_callback(callback, &value)?,
        None => serde_json::to_string(&value)?,
    };
    Ok(Some(rendered))
}
