use std::fmt;

/// Machine-readable error codes for callers that branch on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    NotFound,
    HasActiveChildren,
    MalformedBatchInput,
    PermissionDenied,
    InvalidInput,
    StorageFailure,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::NotFound => "E2001",
            Self::HasActiveChildren => "E2002",
            Self::MalformedBatchInput => "E2003",
            Self::PermissionDenied => "E2004",
            Self::InvalidInput => "E2005",
            Self::StorageFailure => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Project not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::NotFound => "Entity not found",
            Self::HasActiveChildren => "Entity still has active children",
            Self::MalformedBatchInput => "Malformed batch import payload",
            Self::PermissionDenied => "Admin role required",
            Self::InvalidInput => "Invalid input value",
            Self::StorageFailure => "Storage operation failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `sk init` to initialize this directory."),
            Self::ConfigParseError => Some("Fix syntax in .sheetrack/config.toml and retry."),
            Self::NotFound => None,
            Self::HasActiveChildren => Some("Delete the items inside it first, then retry."),
            Self::MalformedBatchInput => Some(
                "Provide a JSON array of {\"title\", \"url\", \"platform\", \"platformId\"?} objects.",
            ),
            Self::PermissionDenied => {
                Some("Add the account email to [access].admin_emails and sign in again.")
            }
            Self::InvalidInput => None,
            Self::StorageFailure => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures surfaced by catalog, progress and notes operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The key references a missing (or soft-deleted, where that matters) entity.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// Soft-delete was blocked by the cascade guard.
    #[error("cannot delete {kind} '{id}': it has {count} active item(s) inside it")]
    HasActiveChildren {
        kind: &'static str,
        id: String,
        count: usize,
    },

    /// A batch import payload did not match the expected shape. Nothing was written.
    #[error("malformed batch input: {reason}")]
    MalformedBatchInput { reason: String },

    /// The acting user is not allowed to author catalog content.
    #[error("user '{uid}' is not an admin")]
    PermissionDenied { uid: String },

    /// A caller-supplied value failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// An underlying SQLite failure.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl CatalogError {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::HasActiveChildren { .. } => ErrorCode::HasActiveChildren,
            Self::MalformedBatchInput { .. } => ErrorCode::MalformedBatchInput,
            Self::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            Self::InvalidInput { .. } => ErrorCode::InvalidInput,
            Self::Storage(_) => ErrorCode::StorageFailure,
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// Result alias for core operations.
pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
