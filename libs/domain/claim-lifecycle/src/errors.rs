// [libs/domain/claim-lifecycle/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("[LC_INVALID_TRANSITION] no such transition is defined for this claim status")]
    InvalidTransition,

    #[error("[LC_REQUIRED_FIELDS_MISSING] flight details and both consents must be present before submission")]
    RequiredFieldsMissing,

    #[error("[LC_CONSENT_MISSING] the claim group has not confirmed collective consent")]
    ConsentMissing,

    #[error("[LC_DUPLICATE_CLAIM] a non-draft claim already exists for this customer, flight number, and date")]
    DuplicateClaim,

    #[error("[LC_GUARD_FAILED] {0}")]
    GuardFailed(&'static str),

    #[error("[LC_FORBIDDEN] actor role is not permitted to perform this transition")]
    Forbidden,

    #[error("[LC_CONCURRENT_MODIFICATION] claim was modified concurrently; reload and retry")]
    ConcurrentModification,

    #[error("[LC_NOT_FOUND] claim not found")]
    NotFound,

    #[error("[LC_PERSISTENCE_FAULT] {0}")]
    Persistence(skyclaim_persistence::PersistenceError),
}

/// Traduce un fallo de la capa de persistencia al vocabulario de la
/// máquina de estados. `ClaimNotFound`/`VersionConflict`/`DuplicateClaim`
/// tienen un significado propio aquí; todo lo demás se envuelve sin
/// interpretación.
impl From<skyclaim_persistence::PersistenceError> for LifecycleError {
    fn from(e: skyclaim_persistence::PersistenceError) -> Self {
        use skyclaim_persistence::PersistenceError;
        match e {
            PersistenceError::ClaimNotFound => LifecycleError::NotFound,
            PersistenceError::VersionConflict => LifecycleError::ConcurrentModification,
            PersistenceError::InvalidState => LifecycleError::InvalidTransition,
            PersistenceError::DuplicateClaim => LifecycleError::DuplicateClaim,
            other => LifecycleError::Persistence(other),
        }
    }
}
