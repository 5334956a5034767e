// [libs/domain/claim-lifecycle/src/transitions.rs]
//! Tabla de transiciones válidas de la máquina de estados del reclamo.
//! Pura: no hace I/O, sólo decide si una transición está permitida dado
//! el estado observado y quién la solicita.

use crate::errors::LifecycleError;
use rust_decimal::Decimal;
use skyclaim_claim_models::ClaimStatus;

/// Rol del actor que solicita la transición, visto desde la máquina de
/// estados (distinto de `skyclaim_claim_models::Role`: aquí también
/// existe un actor `ScheduledTask` que nunca es un `Customer`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Customer,
    Admin,
    ScheduledTask,
}

/// Datos del reclamo relevantes para evaluar los guardas de transición,
/// sin acoplar este módulo al tipo `Claim` completo ni a I/O.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext {
    pub has_required_submission_fields: bool,
    pub group_consent_confirmed: bool,
    pub is_duplicate_non_draft: bool,
    pub compensation_amount: Option<Decimal>,
    pub rejection_reason_present: bool,
    pub reopen_reason_present: bool,
}

/// Decide si `(from, to)` bajo `actor` y `ctx` es una transición legal.
/// Devuelve `Ok(())` si sí; de lo contrario el `LifecycleError` específico
/// que explica por qué no.
pub fn validate_transition(
    from: ClaimStatus,
    to: ClaimStatus,
    actor: Actor,
    ctx: &TransitionContext,
) -> Result<(), LifecycleError> {
    use ClaimStatus::*;

    match (from, to) {
        (Draft, Submitted) => {
            if actor != Actor::Customer {
                return Err(LifecycleError::Forbidden);
            }
            if !ctx.has_required_submission_fields {
                return Err(LifecycleError::RequiredFieldsMissing);
            }
            if !ctx.group_consent_confirmed {
                return Err(LifecycleError::ConsentMissing);
            }
            if ctx.is_duplicate_non_draft {
                return Err(LifecycleError::DuplicateClaim);
            }
            Ok(())
        }
        (Draft, Discarded) => {
            if actor != Actor::ScheduledTask {
                return Err(LifecycleError::Forbidden);
            }
            Ok(())
        }
        (Submitted, UnderReview) => require_admin(actor),
        (UnderReview, Approved) => {
            require_admin(actor)?;
            match ctx.compensation_amount {
                Some(amount) if amount > Decimal::ZERO => Ok(()),
                _ => Err(LifecycleError::GuardFailed("compensation_amount must be set and positive")),
            }
        }
        (UnderReview, Rejected) => {
            require_admin(actor)?;
            if !ctx.rejection_reason_present {
                return Err(LifecycleError::GuardFailed("rejection_reason must be non-empty"));
            }
            Ok(())
        }
        (Approved, Paid) => require_admin(actor),
        (Approved, Rejected) => {
            require_admin(actor)?;
            if !ctx.rejection_reason_present {
                return Err(LifecycleError::GuardFailed("reversal requires a reason"));
            }
            Ok(())
        }
        (Rejected, UnderReview) => {
            require_admin(actor)?;
            if !ctx.reopen_reason_present {
                return Err(LifecycleError::GuardFailed("re-opening requires a reason"));
            }
            Ok(())
        }
        (Paid, Closed) => {
            if actor == Actor::Customer {
                return Err(LifecycleError::Forbidden);
            }
            Ok(())
        }
        _ => Err(LifecycleError::InvalidTransition),
    }
}

fn require_admin(actor: Actor) -> Result<(), LifecycleError> {
    if actor == Actor::Admin {
        Ok(())
    } else {
        Err(LifecycleError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TransitionContext {
        TransitionContext {
            has_required_submission_fields: true,
            group_consent_confirmed: true,
            is_duplicate_non_draft: false,
            compensation_amount: Some(Decimal::new(60000, 2)),
            rejection_reason_present: true,
            reopen_reason_present: true,
        }
    }

    #[test]
    fn draft_to_submitted_requires_customer_and_fields() {
        assert!(validate_transition(ClaimStatus::Draft, ClaimStatus::Submitted, Actor::Customer, &ctx()).is_ok());
        assert!(validate_transition(ClaimStatus::Draft, ClaimStatus::Submitted, Actor::Admin, &ctx()).is_err());

        let mut missing = ctx();
        missing.has_required_submission_fields = false;
        assert!(matches!(
            validate_transition(ClaimStatus::Draft, ClaimStatus::Submitted, Actor::Customer, &missing),
            Err(LifecycleError::RequiredFieldsMissing)
        ));
    }

    #[test]
    fn draft_to_submitted_rejects_duplicate() {
        let mut dup = ctx();
        dup.is_duplicate_non_draft = true;
        assert!(matches!(
            validate_transition(ClaimStatus::Draft, ClaimStatus::Submitted, Actor::Customer, &dup),
            Err(LifecycleError::DuplicateClaim)
        ));
    }

    #[test]
    fn draft_to_submitted_rejects_missing_group_consent() {
        let mut no_consent = ctx();
        no_consent.group_consent_confirmed = false;
        assert!(matches!(
            validate_transition(ClaimStatus::Draft, ClaimStatus::Submitted, Actor::Customer, &no_consent),
            Err(LifecycleError::ConsentMissing)
        ));
    }

    #[test]
    fn under_review_to_approved_requires_positive_amount() {
        let mut zero = ctx();
        zero.compensation_amount = Some(Decimal::ZERO);
        assert!(validate_transition(ClaimStatus::UnderReview, ClaimStatus::Approved, Actor::Admin, &zero).is_err());

        let mut none = ctx();
        none.compensation_amount = None;
        assert!(validate_transition(ClaimStatus::UnderReview, ClaimStatus::Approved, Actor::Admin, &none).is_err());

        assert!(validate_transition(ClaimStatus::UnderReview, ClaimStatus::Approved, Actor::Admin, &ctx()).is_ok());
    }

    #[test]
    fn same_state_transition_never_allowed() {
        assert!(matches!(
            validate_transition(ClaimStatus::Approved, ClaimStatus::Approved, Actor::Admin, &ctx()),
            Err(LifecycleError::InvalidTransition)
        ));
    }

    #[test]
    fn draft_discard_only_by_scheduled_task() {
        assert!(validate_transition(ClaimStatus::Draft, ClaimStatus::Discarded, Actor::ScheduledTask, &ctx()).is_ok());
        assert!(validate_transition(ClaimStatus::Draft, ClaimStatus::Discarded, Actor::Admin, &ctx()).is_err());
    }

    #[test]
    fn paid_to_closed_allows_admin_and_scheduled_task_not_customer() {
        assert!(validate_transition(ClaimStatus::Paid, ClaimStatus::Closed, Actor::Admin, &ctx()).is_ok());
        assert!(validate_transition(ClaimStatus::Paid, ClaimStatus::Closed, Actor::ScheduledTask, &ctx()).is_ok());
        assert!(validate_transition(ClaimStatus::Paid, ClaimStatus::Closed, Actor::Customer, &ctx()).is_err());
    }

    #[test]
    fn unlisted_pair_is_invalid() {
        assert!(matches!(
            validate_transition(ClaimStatus::Closed, ClaimStatus::Draft, Actor::Admin, &ctx()),
            Err(LifecycleError::InvalidTransition)
        ));
    }
}
