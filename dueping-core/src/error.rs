//! Error type shared by every stage of a run.

/// Anything that can stop a run (or startup) from completing.
#[derive(Debug, thiserror::Error)]
pub enum DueError {
    /// A required secret is not present in the environment.
    #[error("ENV variable {var} not set ({hint})")]
    MissingCredential {
        /// Environment variable name.
        var: &'static str,
        /// What the value is, for the operator.
        hint: &'static str,
    },

    /// The task database could not be queried or its body could not be decoded.
    #[error("task fetch failed: {0}")]
    Fetch(String),

    /// A returned page lacks a field every task needs.
    #[error("malformed task record {page}: missing {field}")]
    MalformedRecord {
        /// Page id, or its position in the result set when the id is absent.
        page: String,
        /// Dotted path of the missing property.
        field: &'static str,
    },

    /// A due value that does not parse under the shape its length selects.
    #[error("invalid due date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    /// Channel lookup or message send failed.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

pub type DueResult<T> = Result<T, DueError>;
