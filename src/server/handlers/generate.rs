//! 生成与迭代修改相关的 handler

use axum::extract::State;
use axum::Json;
use tracing::{info, warn};

use crate::generate::{
    app_component_prompt, modify_component_prompt, node_component_prompt,
    preview_component_prompt,
};
use crate::normalize::{normalize, Mode};
use crate::preview;
use crate::project::{assemble, node_component_name, project_slug};
use crate::server::context::{AppContext, AppError};
use crate::server::protocol::{
    GenerateAppRequest, GenerateAppResponse, GenerateUiRequest, GenerateUiResponse,
    ModifyUiRequest, ModifyUiResponse, ProjectFile,
};

/// POST /generate-ui — 生成单个预览组件
pub async fn generate_ui(
    State(ctx): State<AppContext>,
    Json(req): Json<GenerateUiRequest>,
) -> Result<Json<GenerateUiResponse>, AppError> {
    let workflow = req.workflow;
    if workflow.nodes.is_empty() {
        return Err(AppError::InvalidWorkflow("Workflow has no nodes".to_string()));
    }

    let webhook_url = workflow.webhook_url(&ctx.config.webhook.base_url);
    let prompt = preview_component_prompt(&workflow, &webhook_url);
    let raw = ctx.generator.complete(&prompt).await?;

    let snippet = preview::for_preview(&raw, &workflow);
    if snippet.code.is_empty() {
        // 软失败：返回空 code，前端渲染"无可预览内容"而不是崩溃
        warn!(raw_len = raw.len(), "normalization produced empty preview component");
    }

    let analysis = workflow.analyze();
    let artifact_id = ctx
        .sessions
        .create(workflow, snippet.code.clone())
        .await;

    info!(%artifact_id, code_len = snippet.code.len(), "preview component generated");

    Ok(Json(GenerateUiResponse {
        artifact_id,
        code: snippet.code.clone(),
        snippet,
        analysis,
    }))
}

/// POST /modify-ui — 对已有 artifact 追加一轮修改
///
/// 同一 artifact 的并发修改请求通过会话锁串行化；锁覆盖整个
/// 生成→规范化→记录回合。
pub async fn modify_ui(
    State(ctx): State<AppContext>,
    Json(req): Json<ModifyUiRequest>,
) -> Result<Json<ModifyUiResponse>, AppError> {
    let session = ctx
        .sessions
        .get(&req.artifact_id)
        .await
        .ok_or_else(|| AppError::ArtifactNotFound(req.artifact_id.clone()))?;

    let mut session = session.lock().await;

    let current = session
        .latest()
        .ok_or_else(|| AppError::Internal("session has an empty revision log".to_string()))?
        .component
        .clone();
    let prompt = modify_component_prompt(&session.workflow, &current, &req.instruction);
    let raw = ctx.generator.complete(&prompt).await?;

    let snippet = preview::for_preview(&raw, &session.workflow);
    let revision = session.push(req.instruction, snippet.code.clone());

    info!(artifact_id = %session.id, revision, "modification round applied");

    Ok(Json(ModifyUiResponse {
        artifact_id: session.id.clone(),
        revision,
        code: snippet.code.clone(),
        snippet,
    }))
}

/// POST /generate-app — 生成完整多文件项目
pub async fn generate_app(
    State(ctx): State<AppContext>,
    Json(req): Json<GenerateAppRequest>,
) -> Result<Json<GenerateAppResponse>, AppError> {
    let workflow = req.workflow;
    // 字段级校验，发生在任何生成调用之前
    workflow.validate_for_app()?;

    let webhook_url = workflow.webhook_url(&ctx.config.webhook.base_url);

    // 主组件
    let raw = ctx
        .generator
        .complete(&app_component_prompt(&workflow, &webhook_url))
        .await?;
    let main_component = normalize(&raw, Mode::Package);

    // 每个节点类型一个组件文件
    let mut node_components = Vec::new();
    for node_type in workflow.unique_node_types() {
        let component_name = node_component_name(node_type);
        let nodes: Vec<_> = workflow
            .nodes
            .iter()
            .filter(|n| n.node_type == node_type)
            .collect();
        let raw = ctx
            .generator
            .complete(&node_component_prompt(&component_name, node_type, &nodes))
            .await?;
        node_components.push((component_name, normalize(&raw, Mode::Package)));
    }

    let tree = assemble(&workflow, &main_component, &node_components);
    let project_name = project_slug(workflow.name.as_deref().unwrap_or_default());

    info!(%project_name, files = tree.len(), "project tree assembled");

    Ok(Json(GenerateAppResponse {
        project_name,
        files: ProjectFile::from_tree(&tree),
    }))
}
