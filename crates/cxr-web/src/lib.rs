//! # CXR Web模块
//!
//! 对外HTTP接口：影像上传与预测输入两个流水线入口、报告与病例的
//! 查询、审核状态更新，以及流水线启动前的上传校验。

pub mod handlers;
pub mod server;
pub mod upload;

pub use handlers::AppState;
pub use server::WebServer;
pub use upload::UploadPolicy;
