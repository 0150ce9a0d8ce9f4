use thiserror::Error;

use crate::metadata::RelationRole;

/// Charm metadata does not declare the relation the way a role needs it.
///
/// Raised from constructors only. Callers are expected to let these abort
/// startup rather than try to recover.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelationError {
    #[error("No relation named '{relation_name}' found")]
    NotFound { relation_name: String },

    #[error(
        "The '{relation_name}' relation has '{actual}' as interface rather than the expected '{expected}'"
    )]
    InterfaceMismatch {
        relation_name: String,
        expected: String,
        actual: String,
    },

    #[error("The '{relation_name}' relation has role '{actual}' rather than the expected '{expected}'")]
    RoleMismatch {
        relation_name: String,
        expected: RelationRole,
        actual: RelationRole,
    },
}

/// Failures reported by the host while touching relation data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The relation was torn down underneath us (the host answers with
    /// "permission denied" on its databags).
    #[error("relation {relation_id} is gone: {message}")]
    RelationGone { relation_id: u32, message: String },

    #[error("unknown relation {relation_id}")]
    UnknownRelation { relation_id: u32 },

    #[error("host operation failed: {0}")]
    Other(String),
}

/// Remote relation data that cannot be turned into a descriptor.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("missing key '{0}' in relation data")]
    MissingKey(&'static str),

    #[error("invalid ingesters: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid hostname '{hostname}': {reason}")]
    InvalidHostname { hostname: String, reason: String },

    #[error("invalid port '{0}'")]
    InvalidPort(String),
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("failed to encode relation data: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("failed to read metadata: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML metadata: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported metadata format '{0}' (expected .toml or .json)")]
    UnsupportedFormat(String),
}

#[derive(Error, Debug)]
pub enum ScrapeJobError {
    #[error("duplicate job name {0:?}; every job needs a unique `job_name`")]
    DuplicateJobName(Option<String>),

    #[error("invalid scrape job: {0}")]
    InvalidJob(String),

    #[error("invalid scrape job encoding: {0}")]
    Json(#[from] serde_json::Error),
}
