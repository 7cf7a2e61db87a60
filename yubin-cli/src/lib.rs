//! # yubin CLI library
//!
//! Batch front end for the postal-code directory:
//! - CSV discovery and tokenizing
//! - `csv2json`, `json2jsonp` and `lookup` commands

pub mod commands;
pub mod csv_reader;
pub mod discovery;
