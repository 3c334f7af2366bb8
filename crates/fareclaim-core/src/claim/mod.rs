//! Claim submission: the per-receipt state machine, confirmation sources,
//! and batch orchestration.

mod confirmation;
mod orchestrator;
mod state;
mod submitter;

pub use confirmation::{Confirmation, ConfirmationSource, Decline, PortalKeywordVerifier};
pub use orchestrator::{run_claims, AttemptReport, BatchSummary};
pub use state::{ClaimAttempt, ClaimPhase, IllegalTransition};
pub use submitter::{ClaimKind, ClaimSubmitter, SubmitSettings};
