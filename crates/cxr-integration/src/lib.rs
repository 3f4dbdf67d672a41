//! # CXR集成模块
//!
//! 提供与外部服务的集成功能，包括：
//! - 推理服务客户端：影像特征提取与线性探针预测
//! - LLM补全网关：报告草稿的自然语言生成
//!
//! 所有出站调用都带有限超时，失败只尝试一次，由流水线层决定后续处理。

pub mod inference;
pub mod llm;

pub use inference::{InferenceClient, InferenceConfig};
pub use llm::{LlmClient, LlmConfig};

/// 截取响应正文前若干字符作为错误上下文
pub(crate) fn snippet(body: &str) -> String {
    const MAX_LEN: usize = 200;
    let trimmed = body.trim();
    if trimmed.len() <= MAX_LEN {
        trimmed.to_string()
    } else {
        let mut end = MAX_LEN;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &trimmed[..end])
    }
}
