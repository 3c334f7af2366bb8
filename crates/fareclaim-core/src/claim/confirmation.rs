//! Post-submit confirmation that gates deletion of the receipt file.

use std::time::Duration;

use tracing::{debug, warn};

use crate::agent::{FormAgent, Locator};
use crate::error::AgentError;
use crate::models::receipt::ParsedReceipt;

/// Answer from a [`ConfirmationSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The claim went through; the file may be deleted.
    Affirmed,
    /// The claim did not go through.
    Declined,
    /// No answer could be obtained.
    Absent,
}

impl Confirmation {
    pub fn is_affirmed(self) -> bool {
        self == Confirmation::Affirmed
    }
}

/// Decides whether a submitted claim actually succeeded.
///
/// Anything other than [`Confirmation::Affirmed`] keeps the receipt on disk.
pub trait ConfirmationSource {
    fn confirm(&mut self, receipt: &ParsedReceipt, agent: &mut dyn FormAgent) -> Confirmation;
}

/// Never affirms, so every submitted receipt is retained.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decline;

impl ConfirmationSource for Decline {
    fn confirm(&mut self, _receipt: &ParsedReceipt, _agent: &mut dyn FormAgent) -> Confirmation {
        Confirmation::Declined
    }
}

/// Affirms when the portal shows a success message after submission.
#[derive(Debug, Clone)]
pub struct PortalKeywordVerifier {
    success: Locator,
    timeout: Duration,
}

impl PortalKeywordVerifier {
    pub fn new(keyword: impl Into<String>, timeout: Duration) -> Self {
        Self {
            success: Locator::text(keyword),
            timeout,
        }
    }
}

impl ConfirmationSource for PortalKeywordVerifier {
    fn confirm(&mut self, receipt: &ParsedReceipt, agent: &mut dyn FormAgent) -> Confirmation {
        match agent.wait_present(&self.success, self.timeout) {
            Ok(()) => {
                debug!("Portal confirmed claim for {}", receipt.file_path().display());
                Confirmation::Affirmed
            }
            Err(AgentError::Timeout { .. }) | Err(AgentError::NotFound(_)) => {
                debug!("No success message for {}", receipt.file_path().display());
                Confirmation::Declined
            }
            Err(e) => {
                warn!(
                    "Could not check claim outcome for {}: {}",
                    receipt.file_path().display(),
                    e
                );
                Confirmation::Absent
            }
        }
    }
}

impl<F> ConfirmationSource for F
where
    F: FnMut(&ParsedReceipt) -> Confirmation,
{
    fn confirm(&mut self, receipt: &ParsedReceipt, _agent: &mut dyn FormAgent) -> Confirmation {
        self(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::ScriptedAgent;
    use crate::models::receipt::Amount;
    use pretty_assertions::assert_eq;

    fn receipt() -> ParsedReceipt {
        ParsedReceipt::new("/r/ride.pdf", Amount::Unresolved, None, None, None)
    }

    #[test]
    fn test_portal_keyword_affirms_when_present() {
        let mut agent = ScriptedAgent::new();
        let mut verifier = PortalKeywordVerifier::new("submitted successfully", Duration::from_secs(5));

        assert_eq!(verifier.confirm(&receipt(), &mut agent), Confirmation::Affirmed);
        assert!(agent.called("wait_present text 'submitted successfully'"));
    }

    #[test]
    fn test_portal_keyword_declines_on_timeout() {
        let mut agent = ScriptedAgent::new().fail_on(
            "wait_present text 'submitted successfully'",
            AgentError::Timeout {
                what: "success".to_string(),
                after: Duration::from_secs(5),
            },
        );
        let mut verifier = PortalKeywordVerifier::new("submitted successfully", Duration::from_secs(5));

        assert_eq!(verifier.confirm(&receipt(), &mut agent), Confirmation::Declined);
    }

    #[test]
    fn test_portal_keyword_absent_on_lost_session() {
        let mut agent = ScriptedAgent::new().fail_on(
            "wait_present text 'done'",
            AgentError::Session("browser closed".to_string()),
        );
        let mut verifier = PortalKeywordVerifier::new("done", Duration::from_secs(1));

        assert_eq!(verifier.confirm(&receipt(), &mut agent), Confirmation::Absent);
    }

    #[test]
    fn test_decline_and_closure_sources() {
        let mut agent = ScriptedAgent::new();
        assert_eq!(Decline.confirm(&receipt(), &mut agent), Confirmation::Declined);

        let mut always = |_: &ParsedReceipt| Confirmation::Affirmed;
        assert!(always.confirm(&receipt(), &mut agent).is_affirmed());
        assert!(agent.calls.is_empty());
    }
}
