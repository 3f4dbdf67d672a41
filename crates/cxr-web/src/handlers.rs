//! HTTP处理器

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use cxr_core::{Case, CxrError, Result};
use cxr_storage::{CaseStore, ReportStore};
use cxr_workflow::ReportPipeline;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::upload::{validate_image, UploadPolicy};

/// 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReportPipeline>,
    pub report_store: Arc<ReportStore>,
    pub case_store: Arc<CaseStore>,
    pub upload: UploadPolicy,
}

/// HTTP错误包装，把统一错误映射到状态码
pub struct ApiError(CxrError);

impl From<CxrError> for ApiError {
    fn from(error: CxrError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CxrError::InvalidInput(_) | CxrError::Schema(_) => StatusCode::BAD_REQUEST,
            CxrError::InvalidStateTransition { .. } => StatusCode::BAD_REQUEST,
            CxrError::NotFound(_) => StatusCode::NOT_FOUND,
            CxrError::Upstream { .. } | CxrError::Network { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": true,
            "message": self.0.to_string(),
            "status": status.as_u16()
        }));
        (status, body).into_response()
    }
}

/// API根路径处理器
pub async fn api_root() -> impl IntoResponse {
    Json(json!({
        "service": "CXR Report API",
        "version": "1.0.0",
        "status": "running",
        "endpoints": {
            "health": "/health",
            "process_image": "/process_image",
            "extract_features": "/extract_features",
            "generate_from_predictions": "/generate_from_predictions",
            "reports": "/reports/recent",
            "cases": "/cases"
        }
    }))
}

/// 健康检查处理器
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": "1.0.0"
    }))
}

/// 列表查询参数
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

/// 预测输入请求体
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// 来源标签，缺省用固定名
    pub data_name: Option<String>,
    /// 原始预测数组
    pub predictions: serde_json::Value,
}

/// 审核请求体
#[derive(Debug, Deserialize)]
pub struct VerificationRequest {
    pub status: String,
    pub reason: Option<String>,
    pub verified_by: Option<String>,
}

/// 读取multipart中的file字段
async fn read_image_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CxrError::InvalidInput(format!("multipart解析失败: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload.jpg").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| CxrError::InvalidInput(format!("读取上传内容失败: {}", e)))?;
            return Ok((filename, bytes.to_vec()));
        }
    }
    Err(CxrError::InvalidInput("缺少file字段".to_string()))
}

/// 影像上传处理器：完整流水线并持久化病例
pub async fn process_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> std::result::Result<Response, ApiError> {
    let (filename, content) = read_image_field(&mut multipart).await?;
    info!("Received image: {} ({} bytes)", filename, content.len());

    validate_image(&filename, &content, &state.upload)?;

    let outcome = state.pipeline.run_for_image(&content, &filename, true).await?;
    Ok(Json(outcome).into_response())
}

/// 特征提取处理器：只返回特征向量，不生成报告
pub async fn extract_features(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> std::result::Result<Response, ApiError> {
    let (filename, content) = read_image_field(&mut multipart).await?;
    validate_image(&filename, &content, &state.upload)?;

    let features = state.pipeline.extract_features(&content, &filename).await?;
    let dimensions = features.len();
    Ok(Json(json!({
        "features": features,
        "dimensions": dimensions
    }))
    .into_response())
}

/// 预测输入处理器：跳过推理阶段直接生成报告
pub async fn generate_from_predictions(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> std::result::Result<Response, ApiError> {
    let data_name = request.data_name.as_deref().unwrap_or("predictions.json");
    let outcome = state
        .pipeline
        .run_for_predictions(&request.predictions.to_string(), data_name)
        .await?;
    Ok(Json(outcome).into_response())
}

/// 最近报告查询处理器
pub async fn recent_reports(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> std::result::Result<Response, ApiError> {
    let limit = params.limit.unwrap_or(10);
    let reports = state.report_store.get_recent(limit).await?;
    let total = reports.len();
    Ok(Json(json!({
        "reports": reports,
        "total": total
    }))
    .into_response())
}

/// 病例列表处理器
pub async fn list_cases(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> std::result::Result<Response, ApiError> {
    let limit = params.limit.unwrap_or(10);
    let cases = state.case_store.list_recent(limit).await?;
    let total = cases.len();
    Ok(Json(json!({
        "cases": cases,
        "total": total
    }))
    .into_response())
}

/// 单病例查询处理器
pub async fn get_case(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> std::result::Result<Json<Case>, ApiError> {
    let case = state.case_store.get(&case_id).await?;
    Ok(Json(case))
}

/// 审核状态更新处理器
pub async fn set_verification(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Json(request): Json<VerificationRequest>,
) -> std::result::Result<Response, ApiError> {
    let ok = state
        .case_store
        .set_verification(
            &case_id,
            &request.status,
            request.reason.as_deref(),
            request.verified_by.as_deref(),
        )
        .await?;

    if ok {
        Ok(Json(json!({
            "success": true,
            "case_id": case_id,
            "status": request.status
        }))
        .into_response())
    } else {
        Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "审核状态更新被拒绝：病例不存在、状态无法识别、转换不合法或flagged缺少原因"
            })),
        )
            .into_response())
    }
}
