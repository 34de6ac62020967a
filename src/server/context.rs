//! 共享上下文与错误类型
//!
//! 收拢所有 handler 共享的依赖（配置、生成客户端、托管客户端、会话与
//! 部署注册表），并提供统一的应用错误类型，由 axum 自动转换为带稳定
//! error code 的 JSON 响应。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::generate::{GenerateError, GenerationClient};
use crate::publish::{DeploymentRecord, HostingApi};
use crate::server::protocol::ErrorBody;
use crate::session::SessionStore;

/// 已完成部署的注册表（deployment id → 最终 DeploymentRecord）。
/// 随进程生命周期累积,不做淘汰,重启即清空。
pub type SharedDeployments = Arc<RwLock<HashMap<String, DeploymentRecord>>>;

/// Handler 上下文 — 所有路由共享
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub generator: Arc<GenerationClient>,
    pub hosting: Arc<dyn HostingApi>,
    pub sessions: Arc<SessionStore>,
    pub deployments: SharedDeployments,
}

/// 统一应用错误类型
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidWorkflow(String),

    #[error("AI generation failed: {0}")]
    Generation(String),

    #[error("Artifact '{0}' not found")]
    ArtifactNotFound(String),

    #[error("Deployment '{0}' not found")]
    DeploymentNotFound(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// 协议 error code（稳定，前端据此分支）
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidWorkflow(_) => "invalid_workflow",
            AppError::Generation(_) => "generation_failed",
            AppError::ArtifactNotFound(_) => "artifact_not_found",
            AppError::DeploymentNotFound(_) => "deployment_not_found",
            AppError::Archive(_) => "archive_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidWorkflow(_) => StatusCode::BAD_REQUEST,
            AppError::ArtifactNotFound(_) | AppError::DeploymentNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::Generation(_) => StatusCode::BAD_GATEWAY,
            AppError::Archive(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<GenerateError> for AppError {
    fn from(e: GenerateError) -> Self {
        AppError::Generation(e.to_string())
    }
}

impl From<crate::workflow::WorkflowError> for AppError {
    fn from(e: crate::workflow::WorkflowError) -> Self {
        AppError::InvalidWorkflow(e.to_string())
    }
}

impl From<crate::archive::ArchiveError> for AppError {
    fn from(e: crate::archive::ArchiveError) -> Self {
        AppError::Archive(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(AppError::InvalidWorkflow("x".into()).code(), "invalid_workflow");
        assert_eq!(AppError::Generation("x".into()).code(), "generation_failed");
        assert_eq!(AppError::ArtifactNotFound("x".into()).code(), "artifact_not_found");
    }
}
