/// Errors surfaced to callers of the public scanning API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },
}

/// Failure to turn an identifier into a type. Always isolated to one
/// candidate; the scan logs it and moves on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("type not found: {0}")]
    NotFound(String),

    #[error("cannot derive a type identifier from {0}")]
    InvalidIdentifier(String),
}
