//! `csv2json`: registry CSV → persisted map-mode shards
//!
//! **Algorithm:**
//! 1. Discover CSV files under the listed paths
//! 2. Parse every row; rejected rows are logged and counted, never fatal
//! 3. Merge groups into in-memory shards keyed by 3-digit prefix
//! 4. Read-modify-write each shard (or overwrite with `renew`)
//! 5. Log the diagnostics summary
//!
//! The first fatal error (unreadable file, corrupt shard, write failure)
//! aborts the batch. Shards already written stay written.

use crate::csv_reader::read_rows;
use crate::discovery::discover;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use yubin_common::{Diagnostics, Directory, RecordParser, ShardStore, SupplementaryTable};

/// Inputs for one import batch
#[derive(Debug, Clone)]
pub struct Csv2JsonOptions {
    /// Files or directories to import
    pub paths: Vec<PathBuf>,
    /// Output root (`json/` is created below it)
    pub output: PathBuf,
    /// Discard persisted shard content instead of merging with it
    pub renew: bool,
    /// Pretty-print width for map-mode output
    pub indent: Option<usize>,
    /// Extra supplementary kana entries
    pub kana_table: Option<PathBuf>,
}

/// What a batch produced
#[derive(Debug, Clone)]
pub struct Csv2JsonReport {
    pub files: usize,
    pub shards: Vec<PathBuf>,
    pub diagnostics: Diagnostics,
}

pub fn run(opts: &Csv2JsonOptions) -> Result<Csv2JsonReport> {
    let table = match &opts.kana_table {
        Some(path) => SupplementaryTable::with_file(path)
            .with_context(|| format!("Failed to load kana table {}", path.display()))?,
        None => SupplementaryTable::default(),
    };
    let parser = RecordParser::new(table);
    let files = discover(&opts.paths)?;

    let mut diag = Diagnostics::default();
    let mut shards: BTreeMap<String, Directory> = BTreeMap::new();

    for file in &files {
        let rows = read_rows(file)?;
        info!(file = %file.display(), rows = rows.len(), "Importing");

        let mut file_diag = Diagnostics::default();
        for row in rows {
            let group = match parser.parse_fields(&row.fields, &mut file_diag) {
                Ok(group) => group,
                Err(e) => {
                    warn!(file = %file.display(), line = row.line, error = %e, "Row rejected");
                    continue;
                }
            };
            let prefix = group.prefix().to_string();
            let dir = shards
                .remove(&prefix)
                .unwrap_or_else(|| Directory::new(prefix.as_str()));
            shards.insert(prefix, dir.merge_counted(group, &mut file_diag));
        }

        debug!(
            file = %file.display(),
            rows_read = file_diag.rows_read,
            rows_rejected = file_diag.rows_rejected,
            "File imported"
        );
        diag.absorb(file_diag);
    }

    let store = ShardStore::new(&opts.output).with_indent(opts.indent);
    let mut written = Vec::with_capacity(shards.len());
    for dir in shards.values() {
        store
            .write(dir, opts.renew, &mut diag)
            .with_context(|| format!("Failed to write shard {}", dir.prefix()))?;
        written.push(store.shard_path(dir.prefix()));
    }

    diag.log_summary();
    info!(
        files = files.len(),
        shards = written.len(),
        output = %store.json_dir().display(),
        "csv2json complete"
    );

    Ok(Csv2JsonReport {
        files: files.len(),
        shards: written,
        diagnostics: diag,
    })
}
