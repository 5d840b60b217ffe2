use crate::pdf::RenderEngine;
use crate::render::TemplateAssets;
use crate::storage::{ArtifactLocator, ArtifactStore};
use crate::store::CertificateStore;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn CertificateStore>,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub renderer: Arc<dyn RenderEngine>,
    pub assets: TemplateAssets,
    pub locator: ArtifactLocator,
    /// Local copy of every printed PDF; only set in the offline profile.
    pub debug_output: Option<PathBuf>,
}
