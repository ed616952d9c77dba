//! Error type shared by the chart parsing core.
//!
//! Hot-path contract violations (span indices outside the sentence) panic
//! like slice indexing does. Everything detected while wiring a sentence up
//! (configuration, table bindings, incremental scheduling) is reported
//! through `ChartError` so callers and tests can observe it.

use crate::lookup::LookupProtocol;
use crate::span::Span;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("{tables} rule tables configured for {decode_graphs} decode graphs")]
    TableCountMismatch { tables: usize, decode_graphs: usize },

    #[error("decode graph {index} expects table '{expected}' but '{found}' was supplied")]
    TableNameMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("table '{table}' does not support {protocol} lookup")]
    UnsupportedProtocol {
        table: String,
        protocol: LookupProtocol,
    },

    #[error("table '{table}': extend called for {span} before its prefix was looked up")]
    Scheduling { table: String, span: Span },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid rule on line {line}: {message}")]
    InvalidRule { line: usize, message: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("bincode: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("toml: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("toml: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ChartError>;
