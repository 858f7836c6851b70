/// Errors raised while rewriting a batch of schema documents.
/// Every variant is fatal to the batch; nothing here is retried.
use crate::rewrite::RuleError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("cannot list input directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot rewrite {path}: {source}")]
    Rule {
        path: PathBuf,
        source: RuleError,
    },
    #[error("cannot serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot resolve the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error("cannot emit progress line: {0}")]
    Progress(#[source] std::io::Error),
    #[error("invalid fix-up table: {0}")]
    FixupTable(#[source] serde_json::Error),
    #[error("fix-up for '{field}' has an invalid pattern: {source}")]
    FixupPattern {
        field: String,
        source: regex::Error,
    },
}
