//! Web服务器

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use cxr_core::Result;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::handlers::{
    api_root, extract_features, generate_from_predictions, get_case, health, list_cases,
    process_image, recent_reports, set_verification, AppState,
};

pub struct WebServer {
    addr: SocketAddr,
    app: Router,
}

impl WebServer {
    pub fn new(addr: SocketAddr, state: AppState) -> Self {
        let app = Self::create_app(state);
        Self { addr, app }
    }

    fn create_app(state: AppState) -> Router {
        // multipart编码有额外开销，限额在配置之上留一兆余量
        let body_limit = (state.upload.max_image_size_mb as usize + 1) * 1024 * 1024;

        Router::new()
            // 根路径
            .route("/", get(api_root))

            // 健康检查
            .route("/health", get(health))

            // 流水线入口
            .route("/process_image", post(process_image))
            .route("/extract_features", post(extract_features))
            .route("/generate_from_predictions", post(generate_from_predictions))

            // 报告与病例查询
            .route("/reports/recent", get(recent_reports))
            .route("/cases", get(list_cases))
            .route("/cases/:case_id", get(get_case))
            .route("/cases/:case_id/verification", put(set_verification))

            .with_state(state)
            .layer(DefaultBodyLimit::max(body_limit))

            // 全局中间件
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(
                        CorsLayer::new()
                            .allow_origin(Any)
                            .allow_methods(Any)
                            .allow_headers(Any),
                    ),
            )
    }

    pub async fn run(self) -> Result<()> {
        info!("Starting web server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, self.app).await?;

        Ok(())
    }
}
