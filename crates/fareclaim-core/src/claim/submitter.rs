//! Drives one receipt at a time through the claims portal form.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::agent::{FormAgent, Locator};
use crate::error::{AgentError, ClaimError, KeywordStage};
use crate::models::config::{FareclaimConfig, PortalConfig};
use crate::models::receipt::{format_claim_amount, ParsedReceipt};

use super::confirmation::ConfirmationSource;
use super::state::{ClaimAttempt, ClaimPhase};

/// Which portal flow a claim goes through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimKind {
    /// Claims portal page, no disambiguation step.
    Standard,
    /// Phone-linked claims page; the number is picked after upload processing.
    Mobile { phone_number: String },
}

impl ClaimKind {
    /// Mobile when a phone number is configured, standard otherwise.
    pub fn for_portal(portal: &PortalConfig) -> Self {
        match portal.phone_number.as_deref().map(str::trim) {
            Some(number) if !number.is_empty() => ClaimKind::Mobile {
                phone_number: number.to_string(),
            },
            _ => ClaimKind::Standard,
        }
    }
}

/// Portal controls and timing used by [`ClaimSubmitter`].
#[derive(Debug, Clone)]
pub struct SubmitSettings {
    pub claims_url: String,
    pub mobile_url: String,
    pub amount_field: Locator,
    pub upload_field: Locator,
    pub submit_button: Locator,
    /// Shown by the portal once the form can be submitted.
    pub submit_ready: Option<Locator>,
    pub processing_keyword: String,
    pub dry_run: bool,
    pub timeout: Duration,
    pub processing_timeout: Duration,
    pub settle: Duration,
}

impl SubmitSettings {
    fn url_for(&self, kind: &ClaimKind) -> &str {
        match kind {
            ClaimKind::Standard => &self.claims_url,
            ClaimKind::Mobile { .. } => &self.mobile_url,
        }
    }
}

impl From<&FareclaimConfig> for SubmitSettings {
    fn from(config: &FareclaimConfig) -> Self {
        let portal = &config.portal;
        let submission = &config.submission;
        Self {
            claims_url: portal.claims_url.clone(),
            mobile_url: portal.mobile_url.clone(),
            amount_field: Locator::id(&portal.amount_field),
            upload_field: Locator::id(&portal.upload_field),
            submit_button: Locator::id(&portal.submit_button),
            submit_ready: portal
                .submit_ready_keyword
                .as_deref()
                .filter(|keyword| !keyword.trim().is_empty())
                .map(Locator::text),
            processing_keyword: portal.processing_keyword.clone(),
            dry_run: submission.dry_run,
            timeout: submission.timeout(),
            processing_timeout: submission.processing_timeout(),
            settle: submission.settle(),
        }
    }
}

/// Runs the claim state machine against a [`FormAgent`].
pub struct ClaimSubmitter<'a, A> {
    agent: &'a mut A,
    settings: SubmitSettings,
}

impl<'a, A: FormAgent> ClaimSubmitter<'a, A> {
    pub fn new(agent: &'a mut A, settings: SubmitSettings) -> Self {
        Self { agent, settings }
    }

    pub fn settings(&self) -> &SubmitSettings {
        &self.settings
    }

    /// Take `receipt` as far through the portal as it will go.
    ///
    /// Failures never escape: the returned attempt is `Aborted` with the
    /// cause attached, and the receipt file is left in place.
    pub fn submit<'r>(
        &mut self,
        receipt: &'r ParsedReceipt,
        kind: &ClaimKind,
        confirmation: &mut dyn ConfirmationSource,
    ) -> ClaimAttempt<'r> {
        let mut attempt = ClaimAttempt::new(receipt);
        let path = receipt.file_path();

        let Some(amount) = receipt.amount().value() else {
            warn!("Not claiming {}: amount is {}", path.display(), receipt.amount());
            attempt.abort(ClaimError::UnclaimableAmount(path.to_path_buf()));
            return attempt;
        };

        info!("Claiming {} for {}", path.display(), format_claim_amount(amount));

        if let Err(e) = self.run(&mut attempt, amount, kind, confirmation) {
            warn!("Claim for {} aborted at {}: {}", path.display(), attempt.phase(), e);
            attempt.abort(e);
        }

        attempt
    }

    fn run(
        &mut self,
        attempt: &mut ClaimAttempt<'_>,
        amount: Decimal,
        kind: &ClaimKind,
        confirmation: &mut dyn ConfirmationSource,
    ) -> Result<(), ClaimError> {
        let receipt = attempt.receipt();

        while !attempt.is_finished() {
            let phase = attempt.phase();
            match phase {
                ClaimPhase::Idle => self.fill_amount(kind, amount)?,
                ClaimPhase::AmountFilled => self.upload_receipt(receipt.file_path())?,
                ClaimPhase::FileUploaded => self.await_processing()?,
                ClaimPhase::AwaitingConfirmation => self.select_claim_target(kind)?,
                ClaimPhase::ReadyToSubmit if self.settings.dry_run => {
                    info!("Dry run: holding {} before submit", receipt.file_path().display());
                    attempt.hold_for_dry_run()?;
                    continue;
                }
                ClaimPhase::ReadyToSubmit => self.click_submit()?,
                ClaimPhase::Submitted => {
                    self.dispose(attempt, confirmation)?;
                    continue;
                }
                ClaimPhase::Deleted | ClaimPhase::Retained | ClaimPhase::Aborted => break,
            }

            if let Some(next) = phase.next() {
                attempt.advance(next)?;
                debug!("{} -> {}", receipt.file_path().display(), next);
            }
        }

        Ok(())
    }

    fn fill_amount(&mut self, kind: &ClaimKind, amount: Decimal) -> Result<(), ClaimError> {
        let url = self.settings.url_for(kind).to_string();
        self.agent.navigate(&url)?;
        self.agent
            .wait_visible(&self.settings.amount_field, self.settings.timeout)?;
        self.agent
            .set_value(&self.settings.amount_field, &format_claim_amount(amount))?;
        Ok(())
    }

    fn upload_receipt(&mut self, path: &Path) -> Result<(), ClaimError> {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        self.agent.upload_file(&self.settings.upload_field, &path)?;
        Ok(())
    }

    /// The processing indicator has to show up and then go away again.
    fn await_processing(&mut self) -> Result<(), ClaimError> {
        let keyword = self.settings.processing_keyword.clone();
        let indicator = Locator::text(&keyword);
        let after = self.settings.processing_timeout;

        let stage_failed = |stage: KeywordStage| {
            let keyword = keyword.clone();
            move |err: AgentError| match err {
                AgentError::Timeout { .. } | AgentError::NotFound(_) => ClaimError::ProcessingTimeout {
                    keyword,
                    stage,
                    after,
                },
                other => ClaimError::from(other),
            }
        };

        self.agent
            .wait_present(&indicator, after)
            .map_err(stage_failed(KeywordStage::Appear))?;
        self.agent
            .wait_absent(&indicator, after)
            .map_err(stage_failed(KeywordStage::Disappear))?;
        Ok(())
    }

    fn select_claim_target(&mut self, kind: &ClaimKind) -> Result<(), ClaimError> {
        if let ClaimKind::Mobile { phone_number } = kind {
            let number = Locator::text(phone_number);
            self.agent.wait_present(&number, self.settings.timeout)?;
            self.agent.click(&number)?;
        }
        Ok(())
    }

    fn click_submit(&mut self) -> Result<(), ClaimError> {
        let submit = &self.settings.submit_button;
        self.agent.wait_present(submit, self.settings.timeout)?;
        self.agent.scroll_into_view(submit)?;
        self.agent.wait_clickable(submit, self.settings.timeout)?;
        if let Some(ready) = &self.settings.submit_ready {
            self.agent.wait_present(ready, self.settings.timeout)?;
        }
        self.agent.click(submit)?;
        if !self.settings.settle.is_zero() {
            thread::sleep(self.settings.settle);
        }
        Ok(())
    }

    /// Ask for confirmation and delete the receipt file only on an affirmative answer.
    fn dispose(
        &mut self,
        attempt: &mut ClaimAttempt<'_>,
        confirmation: &mut dyn ConfirmationSource,
    ) -> Result<(), ClaimError> {
        let receipt = attempt.receipt();
        let path = receipt.file_path();

        if !confirmation.confirm(receipt, &mut *self.agent).is_affirmed() {
            info!("Keeping {}", path.display());
            attempt.advance(ClaimPhase::Retained)?;
            return Ok(());
        }

        attempt.confirm_deletion()?;
        match fs::remove_file(path) {
            Ok(()) => {
                info!("Deleted {}", path.display());
                attempt.advance(ClaimPhase::Deleted)?;
            }
            Err(source) => {
                error!("Failed to delete {}: {}", path.display(), source);
                attempt.advance(ClaimPhase::Retained)?;
                attempt.record_failure(ClaimError::Deletion {
                    path: PathBuf::from(path),
                    source,
                });
            }
        }
        Ok(())
    }
}
