// [libs/domain/claim-models/src/lib.rs]
//! Vocabulario compartido del dominio de reclamos: ningún tipo de este
//! crate realiza I/O. Las relaciones entre entidades se modelan como ids
//! opacos (nunca referencias directas ni colecciones anidadas), para que
//! ningún lector las cruce sin pasar por un repositorio explícito.

pub mod customer;
pub mod claim;
pub mod claim_group;
pub mod document;
pub mod history;
pub mod token;
pub mod flight;
pub mod outbox;

pub use customer::{Customer, Role, Address};
pub use claim::{Claim, IncidentType, ClaimStatus};
pub use claim_group::ClaimGroup;
pub use document::{ClaimFile, DocumentType, ValidationStatus, FileAccessLog, FileAccessAction};
pub use history::{ClaimStatusHistory, ClaimNote};
pub use token::{RefreshToken, MagicLinkToken, PasswordResetToken};
pub use flight::{
    FlightFacts, FlightStatus, PassengerRegion, Regulation, ExtraordinaryCircumstance,
    EligibilityResult,
};
pub use outbox::{OutboxEvent, EventKind};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro interna para declarar un newtype de identificador opaco respaldado
/// por un UUID v4, evitando que los repositorios confundan un `ClaimId` con
/// un `CustomerId` aunque ambos sean, en memoria, el mismo ancho de bits.
macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

opaque_id!(CustomerId);
opaque_id!(ClaimId);
opaque_id!(ClaimGroupId);
opaque_id!(ClaimFileId);
opaque_id!(FileAccessLogId);
opaque_id!(ClaimStatusHistoryId);
opaque_id!(ClaimNoteId);
opaque_id!(RefreshTokenId);
opaque_id!(MagicLinkTokenId);
opaque_id!(PasswordResetTokenId);
opaque_id!(OutboxEventId);
