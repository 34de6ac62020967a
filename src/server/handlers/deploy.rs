//! 部署相关 handler

use axum::extract::{Path, State};
use axum::Json;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::project::project_slug;
use crate::publish::{publish, HostingTarget, TokioSleeper};
use crate::server::context::{AppContext, AppError};
use crate::server::protocol::{DeployRequest, DeployResponse, ProjectFile};

/// POST /deploy — 提交项目树并轮询到终态
///
/// 阻塞调用方最长 5 分钟（30 次 × 10 秒）。请求被客户端放弃时 handler
/// future 被 drop，轮询随之停止，已提交的部署继续在服务端构建。
pub async fn deploy(
    State(ctx): State<AppContext>,
    Json(req): Json<DeployRequest>,
) -> Result<Json<DeployResponse>, AppError> {
    if req.files.is_empty() {
        return Err(AppError::InvalidWorkflow(
            "No project files to deploy".to_string(),
        ));
    }

    let target = HostingTarget {
        project_name: project_slug(&req.project_name),
    };
    let tree = ProjectFile::into_tree(req.files);

    let record = publish(
        ctx.hosting.as_ref(),
        &tree,
        &target,
        &TokioSleeper,
        CancellationToken::new(),
    )
    .await;

    info!(deployment_id = %record.id, status = ?record.status, "publish attempt finished");

    ctx.deployments
        .write()
        .await
        .insert(record.id.clone(), record.clone());

    Ok(Json(record))
}

/// GET /deployments/{id} — 查询一次部署的记录
pub async fn get_deployment(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<DeployResponse>, AppError> {
    ctx.deployments
        .read()
        .await
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(AppError::DeploymentNotFound(id))
}
