//! REST 协议 DTO
//!
//! 前端与本服务之间的请求/响应结构。文件列表统一使用有序的
//! `ProjectFile` 数组而不是 JSON 对象，保证 ProjectTree 的插入顺序在
//! 往返中不丢失。

use serde::{Deserialize, Serialize};

use crate::preview::EvaluableSnippet;
use crate::project::ProjectTree;
use crate::publish::DeploymentRecord;
use crate::workflow::{WorkflowAnalysis, WorkflowSpec};

/// 协议版本
pub const PROTOCOL_VERSION: u32 = 1;

/// 统一错误响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// 一个项目文件（相对路径 + 文本内容）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFile {
    pub path: String,
    pub content: String,
}

impl ProjectFile {
    /// 请求里的文件列表 → ProjectTree（保持顺序，后出现的同名路径覆盖）
    pub fn into_tree(files: Vec<ProjectFile>) -> ProjectTree {
        let mut tree = ProjectTree::new();
        for f in files {
            tree.insert(f.path, f.content);
        }
        tree
    }

    pub fn from_tree(tree: &ProjectTree) -> Vec<ProjectFile> {
        tree.iter()
            .map(|(path, content)| ProjectFile {
                path: path.to_string(),
                content: content.to_string(),
            })
            .collect()
    }
}

// ---- /generate-ui ----------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateUiRequest {
    pub workflow: WorkflowSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateUiResponse {
    /// 会话 id，后续 /modify-ui 使用
    pub artifact_id: String,
    /// 规范化后的预览组件源码；为空表示"无可预览内容"（软失败）
    pub code: String,
    pub snippet: EvaluableSnippet,
    pub analysis: WorkflowAnalysis,
}

// ---- /modify-ui ------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ModifyUiRequest {
    pub artifact_id: String,
    pub instruction: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModifyUiResponse {
    pub artifact_id: String,
    /// 本轮修改在日志中的序号
    pub revision: usize,
    pub code: String,
    pub snippet: EvaluableSnippet,
}

// ---- /generate-app ---------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateAppRequest {
    pub workflow: WorkflowSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateAppResponse {
    pub project_name: String,
    pub files: Vec<ProjectFile>,
}

// ---- /download -------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadRequest {
    pub project_name: String,
    pub files: Vec<ProjectFile>,
}

// ---- /deploy ---------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DeployRequest {
    pub project_name: String,
    pub files: Vec<ProjectFile>,
}

pub type DeployResponse = DeploymentRecord;
