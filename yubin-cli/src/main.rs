//! yubin - Japanese postal-code directory builder
//!
//! Subcommands:
//! - `csv2json` (`c2j`): import registry CSV into `json/<prefix>.json` shards
//! - `json2jsonp` (`j2j`): render shards as `js/<prefix>.js` scripts
//! - `lookup`: print one zip code from the shards

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use yubin_cli::commands::{self, Csv2JsonOptions, Format, Json2JsonpOptions, LookupOptions};
use yubin_cli::discovery::split_path_list;
use yubin_common::config::{
    resolve_indent, resolve_path, CompiledDefaults, TomlConfig, DATA_DIR_ENV, OUTPUT_DIR_ENV,
};

/// Command-line arguments for yubin
#[derive(Parser, Debug)]
#[command(name = "yubin")]
#[command(about = "Build and query the Japanese postal-code directory")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/yubin/config.toml)
    #[arg(long, global = true, env = "YUBIN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import registry CSV files into map-mode shards
    #[command(alias = "c2j")]
    Csv2json {
        /// Comma-separated CSV files or directories
        #[arg(short, long)]
        path: Option<String>,

        /// Output root; shards are written to <OUTPUT>/json
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace existing shards instead of merging into them
        #[arg(long)]
        renew: bool,

        /// Pretty-print shards with this many spaces
        #[arg(long)]
        indent: Option<usize>,
    },

    /// Render map-mode shards as array-mode scripts
    #[command(alias = "j2j")]
    Json2jsonp {
        /// Root holding json/<prefix>.json (defaults to the output root)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Output root; scripts are written to <OUTPUT>/js
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the entry for one zip code
    Lookup {
        /// Zip code, e.g. 1000001 or 100-0001
        zip_code: String,

        /// Shard form to read
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Wrap the result as CALLBACK(...)
        #[arg(long)]
        callback: Option<String>,

        /// Root holding json/ and js/ (defaults to the output root)
        #[arg(short, long)]
        root: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TomlConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging.level);

    info!("yubin v{}", env!("CARGO_PKG_VERSION"));

    let defaults = CompiledDefaults::default();
    let output_root = |cli_arg: Option<PathBuf>| {
        resolve_path(
            cli_arg.as_deref(),
            OUTPUT_DIR_ENV,
            config.output_dir.as_deref(),
            &defaults.output_dir,
        )
    };

    let script_callback = config
        .callback
        .clone()
        .unwrap_or_else(|| defaults.callback.clone());

    match cli.command {
        Command::Csv2json {
            path,
            output,
            renew,
            indent,
        } => {
            let paths = match path {
                Some(list) => split_path_list(&list),
                None => vec![resolve_path(
                    None,
                    DATA_DIR_ENV,
                    config.data_dir.as_deref(),
                    &defaults.data_dir,
                )],
            };
            let opts = Csv2JsonOptions {
                paths,
                output: output_root(output),
                renew,
                indent: resolve_indent(indent, config.json_indent)?,
                kana_table: config.kana_table.clone(),
            };
            let report = commands::csv2json::run(&opts).context("csv2json failed")?;
            info!(
                files = report.files,
                shards = report.shards.len(),
                "Import finished"
            );
        }
        Command::Json2jsonp { path, output } => {
            let opts = Json2JsonpOptions {
                path: output_root(path),
                output: output_root(output),
                callback: script_callback.clone(),
            };
            let scripts = commands::json2jsonp::run(&opts).context("json2jsonp failed")?;
            info!(scripts = scripts.len(), "Render finished");
        }
        Command::Lookup {
            zip_code,
            format,
            callback,
            root,
        } => {
            // Scripts carry the configured callback unless one is given
            let callback = match (callback, format) {
                (Some(name), _) => Some(name),
                (None, Format::Js) => Some(script_callback.clone()),
                (None, Format::Json) => None,
            };
            let opts = LookupOptions {
                zip_code,
                root: output_root(root),
                format,
                script_callback: script_callback.clone(),
                callback,
            };
            match commands::lookup::run(&opts).context("lookup failed")? {
                Some(rendered) => println!("{rendered}"),
                None => anyhow::bail!("Zip code {} not found", opts.zip_code),
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured level. Logs go to stderr so
/// lookup output stays clean on stdout.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
