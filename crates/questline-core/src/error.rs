//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A quest, node, challenge, zone or other record was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record that was looked up (`"challenge"`, `"quest"`, ...).
        entity: &'static str,
        /// The identifier that did not resolve.
        id: Uuid,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// The submitter already has a correct submission for this challenge.
    #[error("challenge {challenge_id} already completed by this submitter")]
    AlreadyCompleted {
        /// The challenge that was already completed.
        challenge_id: Uuid,
    },

    /// An external collaborator (judge, allocator, stat pool, generator) failed.
    #[error("{service} failed: {message}")]
    ExternalService {
        /// Name of the collaborator.
        service: &'static str,
        /// Failure detail reported by the collaborator.
        message: String,
    },

    /// Regenerating one recurring quest failed; the batch carries on.
    #[error("failed to regenerate quest {quest_id}: {reason}")]
    PartialCloneFailure {
        /// The template quest that could not be regenerated.
        quest_id: Uuid,
        /// Underlying failure.
        reason: String,
    },

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for [`DomainError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Shorthand for [`DomainError::ExternalService`].
    pub fn external(service: &'static str, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service,
            message: message.into(),
        }
    }
}
