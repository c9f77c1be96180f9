use crate::types::DbId;

/// Classified failure returned by every [`ReelBackend`](crate::backend::ReelBackend)
/// operation.
///
/// Job-level failure (a reel in the `failed` stage) is *not* an error; it is
/// ordinary reel data. These variants describe requests that did not produce
/// a reel at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The requested transition is not legal for the reel's current stage.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Transport failure, expired session, or server-side outage.
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a missing reel.
    pub fn reel_not_found(id: DbId) -> Self {
        Self::NotFound { entity: "reel", id }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let reasons: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                format!("{field}: {}", reasons.join(", "))
            })
            .collect();
        fields.sort();
        Self::Validation(fields.join("; "))
    }
}
