//! 证书服务统一错误类型定义
//!
//! 全项目共享一个错误类型。签发流程内部区分模板渲染、PDF 转换、上传三个阶段，
//! 对外统一折叠为一个通用的 400 响应。

use thiserror::Error;

/// 签发接口失败时对外返回的通用消息
pub const ISSUE_FAILED_MESSAGE: &str = "error generating certificate";

/// 服务端内部错误对外返回的通用消息
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// 证书服务统一错误类型
#[derive(Error, Debug)]
pub enum CertifyError {
    /// 请求参数错误 (400)
    #[error("bad request: {0}")]
    BadRequest(String),

    /// 模板填充错误 (400，签发阶段 render)
    #[error("template error: {0}")]
    Template(String),

    /// 浏览器启动或 PDF 转换错误 (400，签发阶段 convert)
    #[error("render engine error: {0}")]
    Render(String),

    /// 对象存储上传错误 (400，签发阶段 upload)
    #[error("object storage error: {0}")]
    Storage(String),

    /// 模板或图片资源读取错误 (400，签发阶段 render)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 数据库错误 (500)
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl CertifyError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// 签发流程中出错的阶段，用于日志与指标
    pub fn stage(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "request",
            Self::Template(_) | Self::Io(_) => "render",
            Self::Render(_) => "convert",
            Self::Storage(_) => "upload",
            Self::Database(_) => "store",
        }
    }

    /// 判断是否为签发阶段错误（渲染、转换、上传），对外统一为 400
    pub fn is_issue_failure(&self) -> bool {
        matches!(
            self,
            Self::Template(_) | Self::Render(_) | Self::Storage(_) | Self::Io(_)
        )
    }

    /// 判断是否为客户端错误（4xx）
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::BadRequest(_)) || self.is_issue_failure()
    }

    pub fn http_status_code(&self) -> u16 {
        if self.is_client_error() { 400 } else { 500 }
    }

    /// 对外暴露的消息，签发阶段与服务端错误不泄露内部细节
    pub fn public_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            _ if self.is_issue_failure() => ISSUE_FAILED_MESSAGE.to_string(),
            _ => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    #[cfg(feature = "functions")]
    pub fn axum_status_code(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::from_u16(self.http_status_code())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub type Result<T> = std::result::Result<T, CertifyError>;

// ============ Axum HTTP 响应支持 ============

#[cfg(feature = "functions")]
mod axum_impl {
    use super::*;
    use axum::{
        Json,
        response::{IntoResponse, Response},
    };
    use serde_json::json;

    impl IntoResponse for CertifyError {
        fn into_response(self) -> Response {
            let status = self.axum_status_code();
            let stage = self.stage();

            match &self {
                // 客户端错误 - info 级别
                CertifyError::BadRequest(reason) => {
                    tracing::info!(status = status.as_u16(), reason = %reason, "Bad request");
                }
                // 外部渲染/存储失败 - warn 级别
                CertifyError::Template(msg) => {
                    tracing::warn!(status = status.as_u16(), stage, template_error = %msg, "Certificate template rendering failed");
                }
                CertifyError::Io(io_err) => {
                    tracing::warn!(status = status.as_u16(), stage, io_error = %io_err, "Certificate asset could not be read");
                }
                CertifyError::Render(msg) => {
                    tracing::warn!(status = status.as_u16(), stage, render_error = %msg, "PDF conversion failed");
                }
                CertifyError::Storage(msg) => {
                    tracing::warn!(status = status.as_u16(), stage, storage_error = %msg, "Certificate upload failed");
                }
                // 服务端错误 - error 级别
                CertifyError::Database(db_err) => {
                    tracing::error!(status = status.as_u16(), stage, error = %db_err, "Record store operation failed");
                }
            }

            let body = Json(json!({"message": self.public_message()}));
            (status, body).into_response()
        }
    }
}
