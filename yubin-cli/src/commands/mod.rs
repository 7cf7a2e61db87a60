//! Subcommand implementations
//!
//! Each command takes fully resolved options; config and environment
//! resolution happens in the binary.

pub mod csv2json;
pub mod json2jsonp;
pub mod lookup;

pub use csv2json::{Csv2JsonOptions, Csv2JsonReport};
pub use json2jsonp::Json2JsonpOptions;
pub use lookup::{Format, LookupOptions};
