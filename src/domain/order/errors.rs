use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ============================================================================
// Order Pipeline Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("failed to parse UUID for {field}: {value:?}")]
    InvalidIdentifier {
        field: &'static str,
        value: String,
        #[source]
        source: uuid::Error,
    },

    #[error("failed to convert {field} to numeric: {value}")]
    Encoding { field: &'static str, value: String },

    #[error("{operation}: {entity} {id} not found")]
    NotFound {
        operation: String,
        entity: &'static str,
        id: Uuid,
    },

    #[error("{operation}: {source}")]
    Transport {
        operation: String,
        #[source]
        source: BoxError,
    },

    #[error("{operation}: deadline of {deadline:?} exceeded")]
    Timeout {
        operation: &'static str,
        deadline: Duration,
    },
}

impl OrderError {
    pub fn transport(operation: impl Into<String>, source: impl Into<BoxError>) -> Self {
        OrderError::Transport {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::Validation(_) => "validation",
            OrderError::InvalidIdentifier { .. } => "invalid_identifier",
            OrderError::Encoding { .. } => "encoding",
            OrderError::NotFound { .. } => "not_found",
            OrderError::Transport { .. } => "transport",
            OrderError::Timeout { .. } => "timeout",
        }
    }
}

// ============================================================================
// Field-level validation failures
// ============================================================================

/// Field name to reason, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.0.insert(field.into(), reason.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, reason) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", field, reason)?;
            first = false;
        }
        Ok(())
    }
}
