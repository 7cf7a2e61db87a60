//! `json2jsonp`: persisted map-mode shards → array-mode scripts

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;
use yubin_common::ShardStore;

#[derive(Debug, Clone)]
pub struct Json2JsonpOptions {
    /// Root holding `json/<prefix>.json`
    pub path: PathBuf,
    /// Root receiving `js/<prefix>.js`
    pub output: PathBuf,
    /// Function name each script calls
    pub callback: String,
}

/// Render every shard found; returns the scripts written
pub fn run(opts: &Json2JsonpOptions) -> Result<Vec<PathBuf>> {
    let source = ShardStore::new(&opts.path);
    let target = ShardStore::new(&opts.output).with_callback(opts.callback.as_str());

    let prefixes = source
        .prefixes()
        .with_context(|| format!("Failed to list shards in {}", source.json_dir().display()))?;

    let mut written = Vec::with_capacity(prefixes.len());
    for prefix in &prefixes {
        let path = source
            .write_script(prefix, &target)
            .with_context(|| format!("Failed to render shard {prefix}"))?;
        written.push(path);
    }

    info!(
        scripts = written.len(),
        output = %target.js_dir().display(),
        callback = target.callback(),
        "json2jsonp complete"
    );
    Ok(written)
}
