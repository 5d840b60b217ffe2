pub mod config;
pub mod entities;
pub mod error;
pub mod models;

// ============ 重新导出常用类型 ============

// 错误处理
pub use error::{CertifyError, Result as CertifyResult};

// 配置相关
pub use config::{AppConfig, LaunchProfile};

// 数据模型
pub use models::CertificateRecord;

// 兼容性别名（Result 是更常用的名称）
pub use error::Result;
