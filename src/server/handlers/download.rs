//! 项目打包下载 handler

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::Json;
use bytes::Bytes;
use tracing::info;

use crate::archive::{archive_filename, pack};
use crate::project::project_slug;
use crate::server::context::{AppContext, AppError};
use crate::server::protocol::{DownloadRequest, ProjectFile};

/// POST /download — 把项目树打包成 tar.gz 返回
///
/// 打包失败是原子的：任何条目序列化出错整体失败，不会返回半个归档。
pub async fn download(
    State(_ctx): State<AppContext>,
    Json(req): Json<DownloadRequest>,
) -> Result<(HeaderMap, Bytes), AppError> {
    if req.files.is_empty() {
        return Err(AppError::InvalidWorkflow(
            "No project files to download".to_string(),
        ));
    }

    let slug = project_slug(&req.project_name);
    let tree = ProjectFile::into_tree(req.files);
    let archive = pack(&tree)?;

    info!(project = %slug, bytes = archive.len(), "project archive packed");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/gzip"),
    );
    let disposition = format!("attachment; filename=\"{}\"", archive_filename(&slug));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| AppError::Internal(e.to_string()))?,
    );

    Ok((headers, Bytes::from(archive)))
}
