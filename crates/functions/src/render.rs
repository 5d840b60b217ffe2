use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use certify_common::models::IssueCertificate;
use certify_common::{CertifyError, CertifyResult};
use chrono::{DateTime, TimeZone};
use handlebars::Handlebars;
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;

pub const TEMPLATE_FILE: &str = "certificate.hbs";
pub const MEDAL_FILE: &str = "seal.png";

/// Values substituted into the certificate template.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateFill {
    pub id: String,
    pub name: String,
    pub grade: String,
    pub date: String,
    /// Base64 PNG, embedded as a data URI by the template.
    pub medal: String,
}

impl CertificateFill {
    pub fn new<Tz>(request: &IssueCertificate, issued_at: &DateTime<Tz>, medal: String) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            id: request.id.clone(),
            name: request.name.clone(),
            grade: request.grade.clone(),
            date: format_issue_date(issued_at),
            medal,
        }
    }
}

/// `DD/MM/YYYY` in the timezone of `at`.
pub fn format_issue_date<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("%d/%m/%Y").to_string()
}

/// Template and medal image read from disk on every invocation.
#[derive(Debug, Clone)]
pub struct TemplateAssets {
    dir: PathBuf,
}

impl TemplateAssets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn load_medal(&self) -> CertifyResult<String> {
        let bytes = tokio::fs::read(self.dir.join(MEDAL_FILE)).await?;
        Ok(STANDARD.encode(bytes))
    }

    pub async fn render(&self, fill: &CertificateFill) -> CertifyResult<String> {
        let source = tokio::fs::read_to_string(self.dir.join(TEMPLATE_FILE)).await?;
        render_template(&source, fill)
    }
}

pub fn render_template(source: &str, fill: &CertificateFill) -> CertifyResult<String> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
        .render_template(source, fill)
        .map_err(|err| CertifyError::template(err.to_string()))
}
