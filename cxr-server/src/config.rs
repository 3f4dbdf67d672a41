//! 配置管理
//!
//! 进程启动时构造一次完整配置，按值传入各组件，不保留全局可变状态。
//! 来源为可选的TOML文件叠加 `CXR_` 前缀的环境变量，未提供的字段
//! 使用默认值。

use ::config::{Config, Environment, File};
use cxr_core::{CxrError, Result};
use serde::Deserialize;

/// 系统完整配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerSettings,
    /// 推理服务配置
    pub inference: InferenceSettings,
    /// LLM服务配置
    pub llm: LlmSettings,
    /// 存储配置
    pub storage: StorageSettings,
    /// 报告配置
    pub report: ReportSettings,
    /// 上传配置
    pub upload: UploadSettings,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// 监听主机
    pub host: String,
    /// 监听端口
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7890,
        }
    }
}

/// 推理服务配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    /// 服务基础URL
    pub base_url: String,
    /// 特征提取端点路径
    pub features_endpoint: String,
    /// 线性探针端点路径
    pub linear_probe_endpoint: String,
    /// HTTP基本认证用户名
    pub username: String,
    /// HTTP基本认证密码
    pub password: String,
    /// 单次请求超时秒数
    pub timeout_secs: u64,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            features_endpoint: "/cxr_features".to_string(),
            linear_probe_endpoint: "/cxr_linear_probe".to_string(),
            username: String::new(),
            password: String::new(),
            timeout_secs: 60,
        }
    }
}

/// LLM服务配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// 服务基础URL
    pub endpoint: String,
    /// API密钥
    pub api_key: String,
    /// 模型名
    pub model: String,
    /// 采样温度
    pub temperature: f32,
    /// 核采样阈值
    pub top_p: f32,
    /// 输出token上限
    pub max_tokens: u32,
    /// 单次请求超时秒数
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.15,
            top_p: 0.15,
            max_tokens: 1000,
            timeout_secs: 60,
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// 报告目录
    pub reports_dir: String,
    /// 病例目录
    pub cases_dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            reports_dir: "./data/reports".to_string(),
            cases_dir: "./data/cases".to_string(),
        }
    }
}

/// 报告配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ReportSettings {
    /// 分区映射文件路径，缺省用内置默认映射
    pub mapping_file: Option<String>,
}

/// 上传配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// 允许的最大影像大小（MB）
    pub max_image_size_mb: u64,
    /// 允许的扩展名
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_image_size_mb: 10,
            allowed_extensions: vec![
                ".jpg".to_string(),
                ".jpeg".to_string(),
                ".png".to_string(),
            ],
        }
    }
}

/// 加载配置
pub fn load(path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::with_name(path));
    }

    let settings = builder
        .add_source(Environment::with_prefix("CXR").separator("__"))
        .build()
        .map_err(|e| CxrError::Config(format!("配置加载失败: {}", e)))?;

    settings
        .try_deserialize()
        .map_err(|e| CxrError::Config(format!("配置解析失败: {}", e)))
}
