//! Task model: one row of the upstream task database, reduced to what the digest needs.

use serde::{Deserialize, Serialize};

use crate::error::DueResult;
use crate::time::{NormalizedDue, normalize};

/// Core task type.
///
/// `due` is kept exactly as the source returned it; see [`crate::time::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub due: String,
}

impl Task {
    pub fn new(name: impl Into<String>, due: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            due: due.into(),
        }
    }

    pub fn normalized_due(&self) -> DueResult<NormalizedDue> {
        normalize(&self.due)
    }
}
