use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid catalog: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Rejected(#[from] Rejection),
}

/// Reasons a catalog import is refused. The catalog is not installed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("empty EAN 1 on row(s): {}", join_rows(.0))]
    EmptyPrimaryCode(Vec<usize>),

    #[error("duplicate EAN 1 values: {}", .0.join(", "))]
    DuplicatePrimaryCodes(Vec<String>),

    #[error("code '{code}' maps to both EAN 1 '{first}' and EAN 1 '{second}'")]
    AliasConflict {
        code: String,
        first: String,
        second: String,
    },
}

/// A declined operation. Nothing was mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("session name cannot be empty")]
    EmptySessionName,

    #[error("session '{0}' already exists")]
    DuplicateSession(String),

    #[error("cannot delete the last remaining session")]
    LastSession,

    #[error("no session named '{0}'")]
    UnknownSession(String),

    #[error("nothing counted for EAN 1 '{0}'")]
    NothingToRemove(String),

    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(i64),

    #[error("no catalog loaded")]
    NoCatalog,
}

fn join_rows(rows: &[usize]) -> String {
    rows.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
