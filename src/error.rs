use miette::Diagnostic;
use thiserror::Error;

use crate::value::ValueKind;

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug, Error, Diagnostic)]
pub enum CodecError {
    #[error("schema error: {0}")]
    #[diagnostic(code("codec.schema"))]
    Schema(String),
    #[error("corrupt record: {0}")]
    #[diagnostic(code("codec.corruption"))]
    Corruption(String),
    #[error("array index {index} out of range for '{name}' (size {size})")]
    #[diagnostic(code("codec.index"))]
    Index {
        name: String,
        index: u32,
        size: usize,
    },
    #[error("member '{0}' is read-only")]
    #[diagnostic(code("codec.read_only"))]
    ReadOnly(String),
    #[error("value kind {} has no binary encoding", .0.keyword())]
    #[diagnostic(code("codec.unencodable"))]
    Unencodable(ValueKind),
    #[error("text encoding error: {0}")]
    #[diagnostic(code("codec.encoding"))]
    Encoding(String),
    #[error("resource limit exceeded: {0}")]
    #[diagnostic(code("codec.resource_limit"))]
    Limit(String),
    #[error("config parse error: {0}")]
    #[diagnostic(code("codec.config"))]
    Config(#[from] toml::de::Error),
    #[error("view serialization error: {0}")]
    #[diagnostic(code("codec.view"))]
    View(#[from] serde_json::Error),
    #[error("io error: {0}")]
    #[diagnostic(code("codec.io"))]
    Io(#[from] std::io::Error),
}
