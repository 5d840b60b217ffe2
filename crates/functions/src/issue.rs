//! Certificate issuance workflow.
//!
//! Steps run strictly in order: record lookup, conditional insert, template
//! fill, PDF conversion, upload. The stored record is never updated, while the
//! artifact is re-rendered from the current request and overwritten on every
//! call.

use crate::pdf;
use crate::render::CertificateFill;
use crate::state::AppState;
use crate::storage::{ArtifactStore, PDF_CONTENT_TYPE};
use crate::store::CertificateStore;
use certify_common::models::IssueCertificate;
use certify_common::{CertificateRecord, CertifyResult};
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCertificate {
    pub url: String,
    pub record_created: bool,
}

pub async fn issue_certificate<Tz>(
    state: &AppState,
    request: &IssueCertificate,
    now: DateTime<Tz>,
) -> CertifyResult<IssuedCertificate>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let record_created =
        ensure_record(state.records.as_ref(), request, now.timestamp_millis()).await?;

    let medal = state.assets.load_medal().await?;
    let fill = CertificateFill::new(request, &now, medal);
    let html = state.assets.render(&fill).await?;

    let pdf = pdf::print_certificate(
        state.renderer.as_ref(),
        &html,
        state.debug_output.as_deref(),
    )
    .await?;

    let key = state.locator.key(&request.id);
    state
        .artifacts
        .put_public(&key, pdf, PDF_CONTENT_TYPE)
        .await?;

    info!(id = %request.id, key = %key, record_created, "certificate issued");
    Ok(IssuedCertificate {
        url: state.locator.url(&request.id),
        record_created,
    })
}

async fn ensure_record(
    store: &dyn CertificateStore,
    request: &IssueCertificate,
    created_at: i64,
) -> CertifyResult<bool> {
    if store.find(&request.id).await?.is_some() {
        debug!(id = %request.id, "certificate record already exists");
        return Ok(false);
    }

    let record = CertificateRecord {
        id: request.id.clone(),
        name: request.name.clone(),
        grade: request.grade.clone(),
        created_at,
    };
    let created = store.insert_if_absent(&record).await?;
    if !created {
        debug!(id = %request.id, "record created concurrently by another issuance");
    }
    Ok(created)
}
