//! Browser automation abstraction used to fill in the claims portal.

#[cfg(feature = "webdriver")]
mod webdriver;

#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverAgent;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::AgentError;

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

/// How to find an element on the portal page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Element with this id attribute.
    Id(String),
    /// Any element whose own text contains this substring.
    Text(String),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Locator::Text(text.into())
    }

    /// Whether an element with the given id and text is matched.
    pub fn matches(&self, id: Option<&str>, text: &str) -> bool {
        match self {
            Locator::Id(wanted) => id == Some(wanted.as_str()),
            Locator::Text(needle) => text.contains(needle.as_str()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "#{}", id),
            Locator::Text(text) => write!(f, "text '{}'", text),
        }
    }
}

/// Capabilities the claim submitter needs from a browser driver.
///
/// Every wait blocks until its condition holds or the timeout expires, in
/// which case it fails with [`AgentError::Timeout`]. Actions on an element
/// that cannot be located fail with [`AgentError::NotFound`].
pub trait FormAgent {
    /// Load a page.
    fn navigate(&mut self, url: &str) -> Result<()>;

    /// Wait until the element exists and is displayed.
    fn wait_visible(&mut self, locator: &Locator, timeout: Duration) -> Result<()>;

    /// Replace the value of an input.
    fn set_value(&mut self, locator: &Locator, value: &str) -> Result<()>;

    /// Hand a local file to a file input.
    fn upload_file(&mut self, locator: &Locator, path: &Path) -> Result<()>;

    /// Wait until a matching element exists.
    fn wait_present(&mut self, locator: &Locator, timeout: Duration) -> Result<()>;

    /// Wait until no matching element is displayed.
    fn wait_absent(&mut self, locator: &Locator, timeout: Duration) -> Result<()>;

    fn click(&mut self, locator: &Locator) -> Result<()>;

    fn scroll_into_view(&mut self, locator: &Locator) -> Result<()>;

    /// Wait until the element can receive a click.
    fn wait_clickable(&mut self, locator: &Locator, timeout: Duration) -> Result<()> {
        self.wait_visible(locator, timeout)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted in-memory agent for exercising the claim flow.

    use super::*;
    use std::collections::HashMap;

    /// Records every call as a line of text and fails the calls it was told to.
    #[derive(Debug, Default)]
    pub struct ScriptedAgent {
        pub calls: Vec<String>,
        failures: HashMap<String, AgentError>,
    }

    impl ScriptedAgent {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make the call rendered as `call` fail with `error`.
        pub fn fail_on(mut self, call: &str, error: AgentError) -> Self {
            self.failures.insert(call.to_string(), error);
            self
        }

        pub fn called(&self, call: &str) -> bool {
            self.calls.iter().any(|c| c == call)
        }

        fn record(&mut self, call: String) -> Result<()> {
            let outcome = self.failures.get(&call).cloned();
            self.calls.push(call);
            match outcome {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }

    impl FormAgent for ScriptedAgent {
        fn navigate(&mut self, url: &str) -> Result<()> {
            self.record(format!("navigate {}", url))
        }

        fn wait_visible(&mut self, locator: &Locator, _timeout: Duration) -> Result<()> {
            self.record(format!("wait_visible {}", locator))
        }

        fn set_value(&mut self, locator: &Locator, value: &str) -> Result<()> {
            self.record(format!("set_value {} = {}", locator, value))
        }

        fn upload_file(&mut self, locator: &Locator, path: &Path) -> Result<()> {
            self.record(format!("upload_file {} <- {}", locator, path.display()))
        }

        fn wait_present(&mut self, locator: &Locator, _timeout: Duration) -> Result<()> {
            self.record(format!("wait_present {}", locator))
        }

        fn wait_absent(&mut self, locator: &Locator, _timeout: Duration) -> Result<()> {
            self.record(format!("wait_absent {}", locator))
        }

        fn click(&mut self, locator: &Locator) -> Result<()> {
            self.record(format!("click {}", locator))
        }

        fn scroll_into_view(&mut self, locator: &Locator) -> Result<()> {
            self.record(format!("scroll_into_view {}", locator))
        }

        fn wait_clickable(&mut self, locator: &Locator, _timeout: Duration) -> Result<()> {
            self.record(format!("wait_clickable {}", locator))
        }
    }
}
