use thiserror::Error;

/// Failures surfaced by the planner services and stores.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    pub fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        PlannerError::NotFound(format!("{what} {id}"))
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PlannerError::NotFound(_) => "not_found",
            PlannerError::InvalidAllocation(_) => "invalid_allocation",
            PlannerError::Validation(_) => "validation",
            PlannerError::PersistenceFailure(_) => "persistence_failure",
        }
    }
}

impl From<std::io::Error> for PlannerError {
    fn from(err: std::io::Error) -> Self {
        PlannerError::PersistenceFailure(err.to_string())
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::PersistenceFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_persistence_failure() {
        let err: PlannerError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.kind(), "persistence_failure");
        assert!(format!("{err}").contains("denied"));
    }

    #[test]
    fn not_found_names_the_record() {
        let err = PlannerError::not_found("debt", "abc");
        assert_eq!(format!("{err}"), "Not found: debt abc");
    }
}
