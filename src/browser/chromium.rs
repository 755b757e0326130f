//! Chrome DevTools Protocol backend built on chromiumoxide
//!
//! Every session is a separate browser process with its own user-data
//! directory, so concurrent jobs never share cookies, cache, or a renderer.

use super::{with_timeout, BrowserError, BrowserLauncher, BrowserSession, NavigationWait};
use crate::config::{BrowserConfig, Config};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig, HeadlessMode};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use url::Url;

/// Environment variable naming a Chrome/Chromium binary
const CHROMIUM_PATH_ENV: &str = "CHROMIUM_PATH";

/// How often `wait_for_selector` re-queries the DOM
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Launches one headless Chromium process per crawl job
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    settings: BrowserConfig,
    user_agent: String,
}

impl ChromiumLauncher {
    pub fn new(config: &Config) -> Self {
        Self {
            settings: config.browser.clone(),
            user_agent: config.user_agent.browser_user_agent.clone(),
        }
    }

    /// Picks the browser binary: config, then `CHROMIUM_PATH`, then auto-detection
    fn executable(&self) -> Option<PathBuf> {
        self.settings.chrome_executable.clone().or_else(|| {
            std::env::var_os(CHROMIUM_PATH_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
    }

    fn user_data_dir() -> PathBuf {
        let n = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("fathom_chrome_{}_{}", std::process::id(), n))
    }

    fn build_config(&self, user_data_dir: PathBuf) -> Result<CdpBrowserConfig, BrowserError> {
        let mut builder = CdpBrowserConfig::builder()
            .request_timeout(self.settings.navigation_timeout())
            .window_size(self.settings.window_width, self.settings.window_height)
            .user_data_dir(user_data_dir);

        builder = if self.settings.headless {
            builder.headless_mode(HeadlessMode::default())
        } else {
            builder.with_head()
        };

        if let Some(path) = self.executable() {
            builder = builder.chrome_executable(path);
        }

        builder
            .arg(format!("--user-agent={}", self.user_agent))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--disable-notifications")
            .arg("--disable-popup-blocking")
            .arg("--mute-audio")
            .build()
            .map_err(BrowserError::Launch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let user_data_dir = Self::user_data_dir();
        std::fs::create_dir_all(&user_data_dir).map_err(|e| {
            BrowserError::Launch(format!(
                "cannot create profile directory {}: {}",
                user_data_dir.display(),
                e
            ))
        })?;

        let config = self.build_config(user_data_dir.clone())?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    // Unknown CDP events fail to deserialize; they are noise
                    trace!("Browser handler event error: {}", e);
                }
            }
            debug!("Browser handler task completed");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let mut session = ChromiumSession {
                    browser: Some(browser),
                    page: None,
                    handler: Some(handler),
                    user_data_dir,
                };
                let _ = session.close().await;
                return Err(BrowserError::Launch(format!("cannot open page: {}", e)));
            }
        };

        info!("Launched browser (profile {})", user_data_dir.display());
        Ok(Box::new(ChromiumSession {
            browser: Some(browser),
            page: Some(page),
            handler: Some(handler),
            user_data_dir,
        }))
    }
}

/// One browser process and its single working tab
pub struct ChromiumSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    user_data_dir: PathBuf,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page, BrowserError> {
        self.page.as_ref().ok_or(BrowserError::Closed)
    }
}

/// Script that selects an option by value and fires the events frameworks listen to
fn select_script(selector: &str, value: &str) -> Result<String, BrowserError> {
    let selector =
        serde_json::to_string(selector).map_err(|e| BrowserError::Script(e.to_string()))?;
    let value = serde_json::to_string(value).map_err(|e| BrowserError::Script(e.to_string()))?;

    Ok(format!(
        r#"(() => {{
    const el = document.querySelector({selector});
    if (!el || !el.options) return false;
    const found = Array.from(el.options).some(o => o.value === {value});
    if (!found) return false;
    el.value = {value};
    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
    el.dispatchEvent(new Event('change', {{ bubbles: true }}));
    return true;
}})()"#
    ))
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(
        &mut self,
        url: &Url,
        wait: NavigationWait,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let page = self.page()?;
        let target = url.as_str();
        let failed = |message: String| BrowserError::Navigation {
            url: target.to_string(),
            message,
        };

        match wait {
            NavigationWait::ContentLoaded => {
                with_timeout("navigation (content-loaded)", timeout, async {
                    page.goto(target).await.map_err(|e| failed(e.to_string()))?;
                    page.wait_for_navigation()
                        .await
                        .map_err(|e| failed(e.to_string()))?;
                    Ok(())
                })
                .await
            }
            NavigationWait::Committed => {
                with_timeout("navigation (committed)", timeout, async {
                    let response = page
                        .execute(NavigateParams::new(target))
                        .await
                        .map_err(|e| failed(e.to_string()))?;
                    match response.result.error_text.clone() {
                        Some(error) => Err(failed(error)),
                        None => Ok(()),
                    }
                })
                .await
            }
        }
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let page = self.page()?;
        with_timeout(&format!("wait for '{}'", selector), timeout, async {
            loop {
                if page.find_element(selector).await.is_ok() {
                    return Ok(());
                }
                tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
            }
        })
        .await
    }

    async fn title(&mut self) -> Result<Option<String>, BrowserError> {
        self.page()?
            .get_title()
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        self.page()?
            .content()
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn current_url(&mut self) -> Result<Option<String>, BrowserError> {
        self.page()?
            .url()
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn select_option(&mut self, selector: &str, value: &str) -> Result<(), BrowserError> {
        let script = select_script(selector, value)?;
        let selected = self
            .page()?
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?
            .into_value::<bool>()
            .map_err(|e| BrowserError::Script(e.to_string()))?;

        if selected {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound(format!(
                "{} (option '{}')",
                selector, value
            )))
        }
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.page = None;

        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser cleanly: {}", e);
            }
            if let Err(e) = browser.wait().await {
                warn!("Failed to wait for browser exit: {}", e);
            }
        }

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        if self.user_data_dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.user_data_dir) {
                debug!(
                    "Could not remove profile directory {}: {}",
                    self.user_data_dir.display(),
                    e
                );
            }
        }

        Ok(())
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}
