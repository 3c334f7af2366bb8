//! Configuration structures for scanning receipts and submitting claims.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the fareclaim pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FareclaimConfig {
    /// Directory scan configuration.
    pub scan: ScanConfig,

    /// Claims portal configuration.
    pub portal: PortalConfig,

    /// Submission behaviour.
    pub submission: SubmissionConfig,

    /// Browser automation configuration.
    pub browser: BrowserConfig,
}

/// Directory scan configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File extension accepted as a receipt (compared case-insensitively).
    pub extension: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extension: "pdf".to_string(),
        }
    }
}

/// Claims portal locations and control identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Page used for standard claims.
    pub claims_url: String,

    /// Page used for phone-linked claims.
    pub mobile_url: String,

    /// Id of the claim amount input.
    pub amount_field: String,

    /// Id of the receipt upload input.
    pub upload_field: String,

    /// Id of the submit button.
    pub submit_button: String,

    /// Text shown while the portal processes an upload.
    pub processing_keyword: String,

    /// Phone number to select for phone-linked claims.
    pub phone_number: Option<String>,

    /// Text that must be on the page before the submit button is clicked.
    pub submit_ready_keyword: Option<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            claims_url: String::new(),
            mobile_url: String::new(),
            amount_field: "claim-amount".to_string(),
            upload_field: "import-img".to_string(),
            submit_button: "submit-claim".to_string(),
            // Matches both "Processed" and "processed"
            processing_keyword: "rocessed".to_string(),
            phone_number: None,
            submit_ready_keyword: None,
        }
    }
}

/// How a submitted claim gets confirmed before its file is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationMode {
    /// Ask a human on the console.
    Prompt,
    /// Look for a success keyword on the portal.
    Portal,
    /// Never confirm; files are always retained.
    Decline,
}

/// Submission behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Stop before clicking submit.
    pub dry_run: bool,

    /// Bound for ordinary waits, in seconds.
    pub timeout_secs: u64,

    /// Bound for each half of the processing keyword cycle, in seconds.
    pub processing_timeout_secs: u64,

    /// Pause after clicking submit, in milliseconds.
    pub settle_millis: u64,

    /// Source of the post-submit confirmation.
    pub confirmation: ConfirmationMode,

    /// Text the portal shows after a successful claim (used by `Portal` mode).
    pub success_keyword: String,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            timeout_secs: 10,
            processing_timeout_secs: 30,
            settle_millis: 2000,
            confirmation: ConfirmationMode::Prompt,
            success_keyword: "submitted successfully".to_string(),
        }
    }
}

impl SubmissionConfig {
    /// Bound for ordinary waits.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Bound for each half of the processing keyword cycle.
    pub fn processing_timeout(&self) -> Duration {
        Duration::from_secs(self.processing_timeout_secs)
    }

    /// Pause after clicking submit.
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_millis)
    }
}

/// WebDriver connection and browser profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Base URL of a running WebDriver server (chromedriver, geckodriver).
    pub webdriver_url: String,

    /// Browser requested from the driver.
    pub browser_name: String,

    /// Browser user data directory holding an authenticated profile.
    pub profile_dir: Option<PathBuf>,

    /// Profile name inside `profile_dir`.
    pub profile_name: Option<String>,

    /// Run without a visible window.
    pub headless: bool,

    /// Interval between polls while waiting, in milliseconds.
    pub poll_millis: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            browser_name: "chrome".to_string(),
            profile_dir: None,
            profile_name: None,
            headless: false,
            poll_millis: 250,
        }
    }
}

impl FareclaimConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Portal page for the given claim kind.
    pub fn portal_url(&self, kind: &crate::claim::ClaimKind) -> &str {
        match kind {
            crate::claim::ClaimKind::Standard => &self.portal.claims_url,
            crate::claim::ClaimKind::Mobile { .. } => &self.portal.mobile_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::ClaimKind;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let json = r#"{ "portal": { "claims_url": "https://claims.example/fuel" } }"#;
        let config: FareclaimConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.portal.claims_url, "https://claims.example/fuel");
        assert_eq!(config.portal.amount_field, "claim-amount");
        assert_eq!(config.scan.extension, "pdf");
        assert_eq!(config.submission.processing_timeout_secs, 30);
        assert_eq!(config.submission.confirmation, ConfirmationMode::Prompt);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = FareclaimConfig::default();
        config.submission.dry_run = true;
        config.submission.confirmation = ConfirmationMode::Portal;
        config.save(&path).unwrap();

        let loaded = FareclaimConfig::from_file(&path).unwrap();
        assert!(loaded.submission.dry_run);
        assert_eq!(loaded.submission.confirmation, ConfirmationMode::Portal);
    }

    #[test]
    fn test_portal_url_by_kind() {
        let mut config = FareclaimConfig::default();
        config.portal.claims_url = "https://claims.example/fuel".to_string();
        config.portal.mobile_url = "https://claims.example/mobile".to_string();

        assert_eq!(config.portal_url(&ClaimKind::Standard), "https://claims.example/fuel");
        let mobile = ClaimKind::Mobile {
            phone_number: "9876543210".to_string(),
        };
        assert_eq!(config.portal_url(&mobile), "https://claims.example/mobile");
    }
}
