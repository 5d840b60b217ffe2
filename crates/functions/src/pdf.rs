use async_trait::async_trait;
use certify_common::{CertifyError, CertifyResult, LaunchProfile};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

// A4 in inches; `landscape` rotates it at print time.
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;

/// Launches render sessions that turn HTML into PDF bytes.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    async fn open(&self) -> CertifyResult<Box<dyn RenderSession>>;
}

/// One live renderer instance. Must be closed by the caller.
#[async_trait]
pub trait RenderSession: Send {
    async fn print_pdf(&mut self, html: &str) -> CertifyResult<Vec<u8>>;

    async fn close(self: Box<Self>) -> CertifyResult<()>;
}

/// Prints `html` in a fresh session and closes the session on every path.
///
/// A failed close is logged and never replaces the print result. When
/// `debug_output` is set the printed bytes are also written there.
pub async fn print_certificate(
    engine: &dyn RenderEngine,
    html: &str,
    debug_output: Option<&Path>,
) -> CertifyResult<Vec<u8>> {
    let mut session = engine.open().await?;
    let printed = session.print_pdf(html).await;
    if let Err(err) = session.close().await {
        warn!(error = %err, "failed to close render session");
    }
    let pdf = printed?;

    if let Some(path) = debug_output {
        tokio::fs::write(path, &pdf).await.map_err(|err| {
            CertifyError::render(format!("write {} failed: {}", path.display(), err))
        })?;
        debug!(path = %path.display(), bytes = pdf.len(), "wrote local certificate copy");
    }
    Ok(pdf)
}

pub fn print_params() -> PrintToPdfParams {
    PrintToPdfParams {
        landscape: Some(true),
        print_background: Some(true),
        prefer_css_page_size: Some(true),
        paper_width: Some(A4_WIDTH_IN),
        paper_height: Some(A4_HEIGHT_IN),
        page_ranges: Some("1".to_string()),
        ..Default::default()
    }
}

/// Command line flags passed to Chromium for a launch profile.
pub fn launch_args(profile: &LaunchProfile) -> Vec<String> {
    let mut args = profile.sandbox_args.clone();
    if profile.ignore_https_errors {
        args.push("--ignore-certificate-errors".to_string());
    }
    args
}

pub struct ChromiumEngine {
    profile: LaunchProfile,
    executable: Option<PathBuf>,
}

impl ChromiumEngine {
    pub fn new(profile: LaunchProfile, executable: Option<PathBuf>) -> Self {
        Self {
            profile,
            executable,
        }
    }

    fn browser_config(&self) -> CertifyResult<BrowserConfig> {
        let mut builder = BrowserConfig::builder().args(launch_args(&self.profile));
        if !self.profile.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(CertifyError::render)
    }
}

#[async_trait]
impl RenderEngine for ChromiumEngine {
    async fn open(&self) -> CertifyResult<Box<dyn RenderSession>> {
        let config = self.browser_config()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| CertifyError::render(format!("browser launch failed: {}", err)))?;

        // The CDP connection only makes progress while its handler is polled.
        let events = tokio::spawn(async move { while handler.next().await.is_some() {} });
        debug!("render session opened");

        Ok(Box::new(ChromiumSession {
            browser: Some(browser),
            events,
        }))
    }
}

/// `browser` is `None` once the session has been closed.
struct ChromiumSession {
    browser: Option<Browser>,
    events: JoinHandle<()>,
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn print_pdf(&mut self, html: &str) -> CertifyResult<Vec<u8>> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| CertifyError::render("render session already closed"))?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|err| CertifyError::render(format!("new page failed: {}", err)))?;
        page.set_content(html)
            .await
            .map_err(|err| CertifyError::render(format!("set content failed: {}", err)))?;
        page.pdf(print_params())
            .await
            .map_err(|err| CertifyError::render(format!("print to pdf failed: {}", err)))
    }

    async fn close(self: Box<Self>) -> CertifyResult<()> {
        let mut session = self;
        let Some(mut browser) = session.browser.take() else {
            return Ok(());
        };
        let closed = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|err| CertifyError::render(format!("browser close failed: {}", err)));
        // Reap the child process even when the close command itself failed.
        if let Err(err) = browser.wait().await {
            warn!(error = %err, "failed to wait for browser exit");
        }
        session.events.abort();
        debug!("render session closed");
        closed
    }
}

// Covers sessions dropped mid-print, e.g. when the request future is cancelled.
impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.events.abort();
        let Some(mut browser) = self.browser.take() else {
            return;
        };
        warn!("render session dropped before close, killing browser");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Some(Err(err)) = browser.kill().await {
                        warn!(error = %err, "failed to kill browser");
                    }
                });
            }
            // Without a runtime the browser's own drop is the last resort.
            Err(_) => drop(browser),
        }
    }
}
