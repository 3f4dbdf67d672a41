//! CXR报告服务主程序

mod config;

use clap::Parser;
use cxr_core::{CxrError, Result};
use cxr_integration::{InferenceClient, InferenceConfig, LlmClient, LlmConfig};
use cxr_report::{load_mapping, LlmParams, MappingSource};
use cxr_storage::{CaseStore, ReportStore};
use cxr_web::{AppState, UploadPolicy, WebServer};
use cxr_workflow::ReportPipeline;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// CXR报告服务命令行参数
#[derive(Parser, Debug)]
#[command(name = "cxr-server")]
#[command(about = "AI 辅助胸部X光报告生成服务")]
struct Args {
    /// 监听主机，覆盖配置文件
    #[arg(long)]
    host: Option<String>,

    /// 监听端口，覆盖配置文件
    #[arg(short, long)]
    port: Option<u16>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(args.log_level.as_str())
        .init();

    info!("启动CXR报告服务...");

    let mut app_config = config::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        app_config.server.host = host;
    }
    if let Some(port) = args.port {
        app_config.server.port = port;
    }

    info!("CXR报告服务配置:");
    info!("  监听地址: {}:{}", app_config.server.host, app_config.server.port);
    info!("  推理服务: {}", app_config.inference.base_url);
    info!("  LLM模型: {}", app_config.llm.model);
    info!("  报告目录: {}", app_config.storage.reports_dir);
    info!("  病例目录: {}", app_config.storage.cases_dir);

    // 加载分区映射表，不可用时回退内置默认
    let loaded = load_mapping(app_config.report.mapping_file.as_deref().map(Path::new)).await;
    if loaded.source == MappingSource::BuiltinDefault {
        warn!("分区映射使用内置默认配置");
    }

    let inference = InferenceClient::new(InferenceConfig {
        base_url: app_config.inference.base_url.clone(),
        features_endpoint: app_config.inference.features_endpoint.clone(),
        linear_probe_endpoint: app_config.inference.linear_probe_endpoint.clone(),
        username: app_config.inference.username.clone(),
        password: app_config.inference.password.clone(),
        timeout_secs: app_config.inference.timeout_secs,
    })?;

    let llm = LlmClient::new(LlmConfig {
        endpoint: app_config.llm.endpoint.clone(),
        api_key: app_config.llm.api_key.clone(),
        timeout_secs: app_config.llm.timeout_secs,
    })?;

    let llm_params = LlmParams {
        model: app_config.llm.model.clone(),
        temperature: app_config.llm.temperature,
        top_p: app_config.llm.top_p,
        max_tokens: app_config.llm.max_tokens,
    };

    let report_store = Arc::new(ReportStore::new(&app_config.storage.reports_dir));
    let case_store = Arc::new(CaseStore::new(&app_config.storage.cases_dir));

    let pipeline = Arc::new(ReportPipeline::new(
        loaded.mapping,
        llm_params,
        inference,
        llm,
        report_store.clone(),
        case_store.clone(),
    ));

    let state = AppState {
        pipeline,
        report_store,
        case_store,
        upload: UploadPolicy {
            max_image_size_mb: app_config.upload.max_image_size_mb,
            allowed_extensions: app_config.upload.allowed_extensions.clone(),
        },
    };

    let addr: SocketAddr = format!(
        "{}:{}",
        app_config.server.host, app_config.server.port
    )
    .parse()
    .map_err(|e| CxrError::Config(format!("监听地址无效: {}", e)))?;

    let server = WebServer::new(addr, state);

    if let Err(e) = server.run().await {
        error!("服务器启动失败: {}", e);
        return Err(e);
    }

    Ok(())
}
