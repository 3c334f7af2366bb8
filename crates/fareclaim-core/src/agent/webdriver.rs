//! [`FormAgent`] backed by a W3C WebDriver server (chromedriver, geckodriver).

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use reqwest::Method;
use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::{debug, info, trace, warn};

use super::{FormAgent, Locator, Result};
use crate::error::AgentError;
use crate::models::config::BrowserConfig;

/// Key under which WebDriver returns element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const SCROLL_SCRIPT: &str = "arguments[0].scrollIntoView({block: 'center'});";

/// A live WebDriver session.
///
/// The session is deleted (closing the browser) when the agent is dropped.
pub struct WebDriverAgent {
    client: Client,
    base_url: String,
    session_id: String,
    poll_interval: Duration,
}

impl WebDriverAgent {
    /// Open a browser session on the configured WebDriver server.
    pub fn connect(config: &BrowserConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AgentError::Transport(e.to_string()))?;
        let base_url = config.webdriver_url.trim_end_matches('/').to_string();

        let value = send(
            &client,
            Method::POST,
            &format!("{}/session", base_url),
            Some(&session_capabilities(config)),
        )
        .map_err(|e| AgentError::Session(format!("could not start {}: {}", config.browser_name, e)))?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::Session("driver did not return a session id".to_string()))?
            .to_string();

        info!("Started {} session {}", config.browser_name, session_id);

        Ok(Self {
            client,
            base_url,
            session_id,
            poll_interval: Duration::from_millis(config.poll_millis.max(10)),
        })
    }

    fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}/session/{}/{}", self.base_url, self.session_id, path);
        send(&self.client, method, &url, body.as_ref())
    }

    /// Look up the first matching element, `None` if there is none.
    fn find(&self, locator: &Locator) -> Result<Option<String>> {
        let body = json!({ "using": "xpath", "value": xpath_for(locator) });
        match self.command(Method::POST, "element", Some(body)) {
            Ok(value) => element_id(&value).map(Some),
            Err(AgentError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn require(&self, locator: &Locator) -> Result<String> {
        self.find(locator)?
            .ok_or_else(|| AgentError::NotFound(locator.to_string()))
    }

    /// Element state query; a stale or vanished element reads as `false`.
    fn element_flag(&self, element: &str, property: &str) -> Result<bool> {
        match self.command(Method::GET, &format!("element/{}/{}", element, property), None) {
            Ok(value) => Ok(value.as_bool().unwrap_or(false)),
            Err(AgentError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn is_displayed(&self, locator: &Locator) -> Result<bool> {
        match self.find(locator)? {
            Some(element) => self.element_flag(&element, "displayed"),
            None => Ok(false),
        }
    }

    fn poll(
        &self,
        locator: &Locator,
        condition: &str,
        timeout: Duration,
        mut check: impl FnMut(&Self) -> Result<bool>,
    ) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if check(self)? {
                trace!("{} is {}", locator, condition);
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(AgentError::Timeout {
                    what: format!("{} to be {}", locator, condition),
                    after: timeout,
                });
            }
            thread::sleep(self.poll_interval);
        }
    }
}

impl FormAgent for WebDriverAgent {
    fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.command(Method::POST, "url", Some(json!({ "url": url })))?;
        Ok(())
    }

    fn wait_visible(&mut self, locator: &Locator, timeout: Duration) -> Result<()> {
        self.poll(locator, "visible", timeout, |agent| agent.is_displayed(locator))
    }

    fn set_value(&mut self, locator: &Locator, value: &str) -> Result<()> {
        let element = self.require(locator)?;
        self.command(Method::POST, &format!("element/{}/clear", element), Some(json!({})))?;
        self.command(
            Method::POST,
            &format!("element/{}/value", element),
            Some(json!({ "text": value })),
        )?;
        Ok(())
    }

    fn upload_file(&mut self, locator: &Locator, path: &Path) -> Result<()> {
        let element = self.require(locator)?;
        self.command(
            Method::POST,
            &format!("element/{}/value", element),
            Some(json!({ "text": path.display().to_string() })),
        )?;
        Ok(())
    }

    fn wait_present(&mut self, locator: &Locator, timeout: Duration) -> Result<()> {
        self.poll(locator, "present", timeout, |agent| Ok(agent.find(locator)?.is_some()))
    }

    fn wait_absent(&mut self, locator: &Locator, timeout: Duration) -> Result<()> {
        self.poll(locator, "gone", timeout, |agent| Ok(!agent.is_displayed(locator)?))
    }

    fn click(&mut self, locator: &Locator) -> Result<()> {
        let element = self.require(locator)?;
        self.command(Method::POST, &format!("element/{}/click", element), Some(json!({})))?;
        Ok(())
    }

    fn scroll_into_view(&mut self, locator: &Locator) -> Result<()> {
        let element = self.require(locator)?;
        self.command(
            Method::POST,
            "execute/sync",
            Some(json!({ "script": SCROLL_SCRIPT, "args": [{ ELEMENT_KEY: element }] })),
        )?;
        Ok(())
    }

    fn wait_clickable(&mut self, locator: &Locator, timeout: Duration) -> Result<()> {
        self.poll(locator, "clickable", timeout, |agent| {
            Ok(match agent.find(locator)? {
                Some(element) => {
                    agent.element_flag(&element, "displayed")?
                        && agent.element_flag(&element, "enabled")?
                }
                None => false,
            })
        })
    }
}

impl Drop for WebDriverAgent {
    fn drop(&mut self) {
        let url = format!("{}/session/{}", self.base_url, self.session_id);
        match send(&self.client, Method::DELETE, &url, None) {
            Ok(_) => debug!("Closed session {}", self.session_id),
            Err(e) => warn!("Failed to close session {}: {}", self.session_id, e),
        }
    }
}

fn send(client: &Client, method: Method, url: &str, body: Option<&Value>) -> Result<Value> {
    trace!("{} {}", method, url);

    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = request
        .send()
        .map_err(|e| AgentError::Transport(e.to_string()))?;
    let status = response.status();
    let payload: Value = response
        .json()
        .map_err(|e| AgentError::Protocol(format!("invalid response body ({}): {}", status, e)))?;

    let value = payload.get("value").cloned().unwrap_or(Value::Null);
    if status.is_success() {
        Ok(value)
    } else {
        Err(driver_error(&value))
    }
}

/// Map a WebDriver error payload onto an [`AgentError`].
fn driver_error(value: &Value) -> AgentError {
    let code = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match code {
        "no such element" | "stale element reference" => AgentError::NotFound(message),
        "invalid session id" | "session not created" => AgentError::Session(message),
        _ => AgentError::Protocol(format!("{}: {}", code, message)),
    }
}

fn element_id(value: &Value) -> Result<String> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AgentError::Protocol(format!("not an element reference: {}", value)))
}

fn xpath_for(locator: &Locator) -> String {
    match locator {
        Locator::Id(id) => format!("//*[@id={}]", xpath_literal(id)),
        Locator::Text(text) => format!("//*[contains(text(), {})]", xpath_literal(text)),
    }
}

/// Quote `text` as an XPath 1.0 string literal.
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{}'", text);
    }
    if !text.contains('"') {
        return format!("\"{}\"", text);
    }

    // Both quote kinds: splice the single quotes in with concat()
    let parts: Vec<String> = text.split('\'').map(|part| format!("'{}'", part)).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

fn session_capabilities(config: &BrowserConfig) -> Value {
    let mut always_match = json!({ "browserName": config.browser_name });

    match config.browser_name.as_str() {
        "firefox" => {
            let mut args = Vec::new();
            if config.headless {
                args.push("-headless".to_string());
            }
            if let Some(dir) = &config.profile_dir {
                args.push("-profile".to_string());
                args.push(dir.display().to_string());
            }
            always_match["moz:firefoxOptions"] = json!({ "args": args });
        }
        _ => {
            let mut args = vec!["--disable-extensions".to_string()];
            if let Some(dir) = &config.profile_dir {
                args.push(format!("--user-data-dir={}", dir.display()));
            }
            if let Some(name) = &config.profile_name {
                args.push(format!("--profile-directory={}", name));
            }
            if config.headless {
                args.push("--headless=new".to_string());
            }
            always_match["goog:chromeOptions"] = json!({ "args": args });
        }
    }

    json!({ "capabilities": { "alwaysMatch": always_match } })
}
