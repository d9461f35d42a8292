//! Store error taxonomy

use miette::Diagnostic;
use thiserror::Error;

/// Errors returned by the inventory store
///
/// Nothing is retried internally; every failure is handed back to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    #[diagnostic(code(invman::store::not_found))]
    NotFound { kind: &'static str, id: i64 },

    #[error("part {id} is neither in-house nor outsourced")]
    #[diagnostic(
        code(invman::store::indeterminate_variant),
        help("the stored row has no machine id and no company name. Give it one with `invman part edit --machine-id` or `--company`")
    )]
    IndeterminateVariant { id: i64 },

    #[error("{message}")]
    #[diagnostic(code(invman::store::policy_violation))]
    PolicyViolation { message: String },

    #[error("search text {fragment:?} contains a wildcard character")]
    #[diagnostic(
        code(invman::store::invalid_search),
        help("search text cannot contain '%' or '_'")
    )]
    InvalidSearchInput { fragment: String },

    #[error("database schema version {found} does not match expected version {expected}")]
    #[diagnostic(code(invman::store::schema_mismatch))]
    SchemaMismatch { found: i32, expected: i32 },

    #[error("storage error: {0}")]
    #[diagnostic(code(invman::store::storage))]
    Storage(#[from] rusqlite::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
