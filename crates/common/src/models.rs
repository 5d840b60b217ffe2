use crate::entities::certificates;
use crate::error::{CertifyError, Result};
use serde::{Deserialize, Serialize};

/// One issued certificate as persisted in the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub id: String,
    pub name: String,
    pub grade: String,
    /// Milliseconds since the Unix epoch, set on first issuance only.
    pub created_at: i64,
}

impl From<certificates::Model> for CertificateRecord {
    fn from(model: certificates::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            grade: model.grade,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueCertificate {
    pub id: String,
    pub name: String,
    pub grade: String,
}

impl IssueCertificate {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("id", &self.id), ("name", &self.name), ("grade", &self.grade)] {
            if value.trim().is_empty() {
                return Err(CertifyError::bad_request(format!("{field} is required")));
            }
        }
        if self.id.contains('/') {
            return Err(CertifyError::bad_request("id must not contain '/'"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueResponse {
    pub message: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
