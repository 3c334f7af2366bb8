//! Claim attempt phases and the transitions between them.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::error::ClaimError;
use crate::models::receipt::ParsedReceipt;

/// Where a claim attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimPhase {
    Idle,
    AmountFilled,
    FileUploaded,
    AwaitingConfirmation,
    ReadyToSubmit,
    Submitted,
    /// Confirmed and the receipt file removed.
    Deleted,
    /// Submitted but the file was kept.
    Retained,
    /// Stopped by a failure before submission completed.
    Aborted,
}

impl ClaimPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, ClaimPhase::Deleted | ClaimPhase::Retained | ClaimPhase::Aborted)
    }

    /// The phase a successful step moves to, if there is exactly one.
    pub fn next(self) -> Option<ClaimPhase> {
        match self {
            ClaimPhase::Idle => Some(ClaimPhase::AmountFilled),
            ClaimPhase::AmountFilled => Some(ClaimPhase::FileUploaded),
            ClaimPhase::FileUploaded => Some(ClaimPhase::AwaitingConfirmation),
            ClaimPhase::AwaitingConfirmation => Some(ClaimPhase::ReadyToSubmit),
            ClaimPhase::ReadyToSubmit => Some(ClaimPhase::Submitted),
            _ => None,
        }
    }

    pub fn can_advance_to(self, to: ClaimPhase) -> bool {
        match (self, to) {
            (from, ClaimPhase::Aborted) => !from.is_terminal(),
            (ClaimPhase::Submitted, ClaimPhase::Deleted | ClaimPhase::Retained) => true,
            (from, to) => from.next() == Some(to),
        }
    }
}

impl fmt::Display for ClaimPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClaimPhase::Idle => "idle",
            ClaimPhase::AmountFilled => "amount filled",
            ClaimPhase::FileUploaded => "file uploaded",
            ClaimPhase::AwaitingConfirmation => "awaiting confirmation",
            ClaimPhase::ReadyToSubmit => "ready to submit",
            ClaimPhase::Submitted => "submitted",
            ClaimPhase::Deleted => "deleted",
            ClaimPhase::Retained => "retained",
            ClaimPhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("illegal claim transition from {from} to {to}")]
pub struct IllegalTransition {
    pub from: ClaimPhase,
    pub to: ClaimPhase,
}

/// One receipt's progress through the claims portal.
#[derive(Debug)]
pub struct ClaimAttempt<'r> {
    receipt: &'r ParsedReceipt,
    phase: ClaimPhase,
    deletion_confirmed: bool,
    held_for_dry_run: bool,
    failure: Option<ClaimError>,
}

impl<'r> ClaimAttempt<'r> {
    pub fn new(receipt: &'r ParsedReceipt) -> Self {
        Self {
            receipt,
            phase: ClaimPhase::Idle,
            deletion_confirmed: false,
            held_for_dry_run: false,
            failure: None,
        }
    }

    pub fn receipt(&self) -> &'r ParsedReceipt {
        self.receipt
    }

    pub fn phase(&self) -> ClaimPhase {
        self.phase
    }

    /// Whether a confirmation source affirmed the submission.
    pub fn deletion_confirmed(&self) -> bool {
        self.deletion_confirmed
    }

    /// Whether the attempt stopped at `ReadyToSubmit` because of dry-run mode.
    pub fn held_for_dry_run(&self) -> bool {
        self.held_for_dry_run
    }

    pub fn failure(&self) -> Option<&ClaimError> {
        self.failure.as_ref()
    }

    /// Whether the portal received the claim, whatever happened to the file.
    pub fn is_submitted(&self) -> bool {
        matches!(
            self.phase,
            ClaimPhase::Submitted | ClaimPhase::Deleted | ClaimPhase::Retained
        )
    }

    /// Whether no further step will run.
    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal() || self.held_for_dry_run
    }

    /// Move to `to`.
    ///
    /// `Deleted` is only reachable from `Submitted` after
    /// [`confirm_deletion`](Self::confirm_deletion).
    pub fn advance(&mut self, to: ClaimPhase) -> Result<(), IllegalTransition> {
        let illegal = IllegalTransition {
            from: self.phase,
            to,
        };
        if self.held_for_dry_run || !self.phase.can_advance_to(to) {
            return Err(illegal);
        }
        if to == ClaimPhase::Deleted && !self.deletion_confirmed {
            return Err(illegal);
        }
        self.phase = to;
        Ok(())
    }

    /// Record an affirmative confirmation. Only meaningful once submitted.
    pub fn confirm_deletion(&mut self) -> Result<(), IllegalTransition> {
        if self.phase != ClaimPhase::Submitted {
            return Err(IllegalTransition {
                from: self.phase,
                to: ClaimPhase::Deleted,
            });
        }
        self.deletion_confirmed = true;
        Ok(())
    }

    /// Stop at `ReadyToSubmit` without submitting.
    pub fn hold_for_dry_run(&mut self) -> Result<(), IllegalTransition> {
        if self.phase != ClaimPhase::ReadyToSubmit {
            return Err(IllegalTransition {
                from: self.phase,
                to: ClaimPhase::Submitted,
            });
        }
        self.held_for_dry_run = true;
        Ok(())
    }

    /// Abort with `error`. A terminal attempt keeps its phase and only
    /// records the failure.
    pub fn abort(&mut self, error: ClaimError) {
        if !self.phase.is_terminal() && !self.held_for_dry_run {
            self.phase = ClaimPhase::Aborted;
        }
        self.failure = Some(error);
    }

    /// Record a failure without changing phase.
    pub(crate) fn record_failure(&mut self, error: ClaimError) {
        self.failure = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::Amount;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn receipt() -> ParsedReceipt {
        ParsedReceipt::new("/r/ride.pdf", Amount::Resolved(Decimal::from(100)), None, None, None)
    }

    fn walk_to(attempt: &mut ClaimAttempt<'_>, phase: ClaimPhase) {
        while attempt.phase() != phase {
            let next = attempt.phase().next().unwrap();
            attempt.advance(next).unwrap();
        }
    }

    #[test]
    fn test_forward_path() {
        let receipt = receipt();
        let mut attempt = ClaimAttempt::new(&receipt);

        walk_to(&mut attempt, ClaimPhase::Submitted);
        assert!(attempt.is_submitted());
        assert!(!attempt.is_finished());

        attempt.advance(ClaimPhase::Retained).unwrap();
        assert!(attempt.is_finished());
        assert_eq!(attempt.phase(), ClaimPhase::Retained);
    }

    #[test]
    fn test_no_skipping_phases() {
        let receipt = receipt();
        let mut attempt = ClaimAttempt::new(&receipt);

        let err = attempt.advance(ClaimPhase::FileUploaded).unwrap_err();
        assert_eq!(
            err,
            IllegalTransition {
                from: ClaimPhase::Idle,
                to: ClaimPhase::FileUploaded
            }
        );
        assert_eq!(attempt.phase(), ClaimPhase::Idle);
    }

    #[test]
    fn test_deleted_requires_confirmation() {
        let receipt = receipt();
        let mut attempt = ClaimAttempt::new(&receipt);

        assert!(attempt.confirm_deletion().is_err());

        walk_to(&mut attempt, ClaimPhase::Submitted);
        assert!(attempt.advance(ClaimPhase::Deleted).is_err());

        attempt.confirm_deletion().unwrap();
        attempt.advance(ClaimPhase::Deleted).unwrap();
        assert_eq!(attempt.phase(), ClaimPhase::Deleted);
    }

    #[test]
    fn test_deleted_unreachable_before_submitted() {
        for phase in [
            ClaimPhase::Idle,
            ClaimPhase::AmountFilled,
            ClaimPhase::FileUploaded,
            ClaimPhase::AwaitingConfirmation,
            ClaimPhase::ReadyToSubmit,
        ] {
            assert!(!phase.can_advance_to(ClaimPhase::Deleted), "{}", phase);
        }
    }

    #[test]
    fn test_abort_from_any_open_phase() {
        let receipt = receipt();
        let mut attempt = ClaimAttempt::new(&receipt);
        walk_to(&mut attempt, ClaimPhase::FileUploaded);

        attempt.abort(ClaimError::FieldNotFound("#import-img".to_string()));

        assert_eq!(attempt.phase(), ClaimPhase::Aborted);
        assert!(attempt.failure().is_some());
        assert!(attempt.advance(ClaimPhase::AwaitingConfirmation).is_err());
        assert!(!ClaimPhase::Aborted.can_advance_to(ClaimPhase::Aborted));
    }

    #[test]
    fn test_dry_run_hold() {
        let receipt = receipt();
        let mut attempt = ClaimAttempt::new(&receipt);

        assert!(attempt.hold_for_dry_run().is_err());

        walk_to(&mut attempt, ClaimPhase::ReadyToSubmit);
        attempt.hold_for_dry_run().unwrap();

        assert!(attempt.is_finished());
        assert!(!attempt.is_submitted());
        assert!(attempt.advance(ClaimPhase::Submitted).is_err());
        assert_eq!(attempt.phase(), ClaimPhase::ReadyToSubmit);
    }

    #[test]
    fn test_phase_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ClaimPhase::AwaitingConfirmation).unwrap(),
            "\"awaiting_confirmation\""
        );
        assert_eq!(ClaimPhase::ReadyToSubmit.to_string(), "ready to submit");
    }
}
