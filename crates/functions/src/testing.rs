//! In-memory collaborators for handler and workflow tests.

use crate::pdf::{RenderEngine, RenderSession};
use crate::render::TemplateAssets;
use crate::state::AppState;
use crate::storage::{ArtifactLocator, ArtifactStore};
use crate::store::CertificateStore;
use async_trait::async_trait;
use certify_common::{CertificateRecord, CertifyError, CertifyResult};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

pub const PUBLIC_BASE_URL: &str = "https://certificates-ignite-2022.s3.amazonaws.com";

pub fn bundled_assets() -> TemplateAssets {
    TemplateAssets::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../templates"))
}

#[derive(Clone, Default)]
pub struct MemoryCertificateStore {
    inner: Arc<RwLock<HashMap<String, CertificateRecord>>>,
    unavailable: bool,
}

impl MemoryCertificateStore {
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn get(&self, id: &str) -> Option<CertificateRecord> {
        self.inner.read().await.get(id).cloned()
    }

    fn check(&self) -> CertifyResult<()> {
        if self.unavailable {
            return Err(CertifyError::Database(sea_orm::DbErr::Conn(
                sea_orm::RuntimeErr::Internal("connection refused".to_string()),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CertificateStore for MemoryCertificateStore {
    async fn find(&self, id: &str) -> CertifyResult<Option<CertificateRecord>> {
        self.check()?;
        Ok(self.get(id).await)
    }

    async fn insert_if_absent(&self, record: &CertificateRecord) -> CertifyResult<bool> {
        self.check()?;
        match self.inner.write().await.entry(record.id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(true)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

impl StoredObject {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Clone, Default)]
pub struct MemoryArtifactStore {
    inner: Arc<RwLock<HashMap<String, StoredObject>>>,
    puts: Arc<AtomicUsize>,
    failing: bool,
}

impl MemoryArtifactStore {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.inner.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn put_public(&self, key: &str, body: Vec<u8>, content_type: &str) -> CertifyResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(CertifyError::storage("AccessDenied"));
        }
        self.inner.write().await.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}

#[derive(Default)]
struct SessionCounters {
    opened: AtomicUsize,
    closed: AtomicUsize,
    released: AtomicUsize,
}

/// Renders by echoing the HTML behind a PDF header, so tests can read back
/// what was filled into the template.
#[derive(Clone, Default)]
pub struct FakeRenderEngine {
    counters: Arc<SessionCounters>,
    fail_open: bool,
    fail_print: bool,
    hang_print: bool,
    fail_close: bool,
}

impl FakeRenderEngine {
    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    pub fn failing_print() -> Self {
        Self {
            fail_print: true,
            ..Self::default()
        }
    }

    /// Printing never completes, for cancellation tests.
    pub fn hanging_print() -> Self {
        Self {
            hang_print: true,
            ..Self::default()
        }
    }

    pub fn failing_close() -> Self {
        Self {
            fail_close: true,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    /// Sessions dropped, whether or not they were closed first.
    pub fn released(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderEngine for FakeRenderEngine {
    async fn open(&self) -> CertifyResult<Box<dyn RenderSession>> {
        if self.fail_open {
            return Err(CertifyError::render("browser launch failed"));
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            counters: self.counters.clone(),
            fail_print: self.fail_print,
            hang_print: self.hang_print,
            fail_close: self.fail_close,
        }))
    }
}

struct FakeSession {
    counters: Arc<SessionCounters>,
    fail_print: bool,
    hang_print: bool,
    fail_close: bool,
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn print_pdf(&mut self, html: &str) -> CertifyResult<Vec<u8>> {
        if self.fail_print {
            return Err(CertifyError::render("print to pdf failed"));
        }
        if self.hang_print {
            std::future::pending::<()>().await;
        }
        let mut pdf = b"%PDF-1.4\n".to_vec();
        pdf.extend_from_slice(html.as_bytes());
        Ok(pdf)
    }

    async fn close(self: Box<Self>) -> CertifyResult<()> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(CertifyError::render("browser close failed"));
        }
        Ok(())
    }
}

pub struct Harness {
    pub records: MemoryCertificateStore,
    pub artifacts: MemoryArtifactStore,
    pub renderer: FakeRenderEngine,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(
            MemoryCertificateStore::default(),
            MemoryArtifactStore::default(),
            FakeRenderEngine::default(),
        )
    }

    pub fn with(
        records: MemoryCertificateStore,
        artifacts: MemoryArtifactStore,
        renderer: FakeRenderEngine,
    ) -> Self {
        Self {
            records,
            artifacts,
            renderer,
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            records: Arc::new(self.records.clone()),
            artifacts: Arc::new(self.artifacts.clone()),
            renderer: Arc::new(self.renderer.clone()),
            assets: bundled_assets(),
            locator: ArtifactLocator::new(PUBLIC_BASE_URL, "pdf"),
            debug_output: None,
        }
    }
}
