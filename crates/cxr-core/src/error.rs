//! 错误定义模块

use thiserror::Error;

/// 上游服务阶段标识
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStage {
    /// 特征提取服务
    FeatureExtraction,
    /// 线性探针预测服务
    LinearProbe,
    /// LLM补全服务
    Completion,
}

impl std::fmt::Display for UpstreamStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UpstreamStage::FeatureExtraction => "feature_extraction",
            UpstreamStage::LinearProbe => "linear_probe",
            UpstreamStage::Completion => "completion",
        };
        write!(f, "{}", name)
    }
}

/// CXR系统统一错误类型
#[derive(Error, Debug)]
pub enum CxrError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("输入验证错误: {0}")]
    InvalidInput(String),

    #[error("数据结构错误: {0}")]
    Schema(String),

    #[error("上游服务错误 [{stage}] 状态码 {status}: {snippet}")]
    Upstream {
        stage: UpstreamStage,
        status: u16,
        snippet: String,
    },

    #[error("网络错误 [{stage}]: {message}")]
    Network {
        stage: UpstreamStage,
        message: String,
    },

    #[error("持久化错误: {0}")]
    Persistence(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("无效状态转换: 从 {from} 到 {to}")]
    InvalidStateTransition { from: String, to: String },
}

/// CXR系统统一结果类型
pub type Result<T> = std::result::Result<T, CxrError>;
