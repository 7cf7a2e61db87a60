//! # Yubin Common Library
//!
//! Postal-code directory engine shared by the yubin tools:
//! - Registry row parsing with town-expression expansion
//! - Kana inference (supplementary table, per-shard dictionary)
//! - Merging address groups into 3-digit prefix shards
//! - Map-mode and array-mode serialization, lookup helpers
//! - Persisted shard store
//! - Configuration loading

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod kana;
mod merge;
pub mod model;
pub mod parser;
pub mod serializer;
pub mod store;
pub mod width;

pub use diagnostics::Diagnostics;
pub use error::{Error, Result};
pub use kana::{KanaDictionary, SupplementaryTable};
pub use model::{Address, AddressGroup, Directory, Prefecture};
pub use parser::{RawRow, RecordParser};
pub use store::ShardStore;
