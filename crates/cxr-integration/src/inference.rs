//! 推理服务客户端
//!
//! 封装两个外部黑盒端点：影像特征提取与线性探针预测。
//! 两次调用严格串行且数据相关，失败不做内部重试。

use cxr_core::{CxrError, Result, UpstreamStage};
use std::time::Duration;
use tracing::{debug, info};

use crate::snippet;

/// 推理服务配置
#[derive(Debug, Clone)]
pub struct InferenceConfig {
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

/// 推理服务客户端
pub struct InferenceClient {
    client: reqwest::Client,
    config: InferenceConfig,
}

impl InferenceClient {
    /// 创建客户端，带有限超时
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CxrError::Config(format!("推理客户端构建失败: {}", e)))?;

        Ok(Self { client, config })
    }

    /// 提取影像特征向量
    ///
    /// 以multipart表单上传影像字节，返回浮点特征数组。
    pub async fn extract_features(&self, image: &[u8], filename: &str) -> Result<Vec<f64>> {
        let url = format!("{}{}", self.config.base_url, self.config.features_endpoint);
        debug!("Extracting features from image ({} bytes)", image.len());

        let part = reqwest::multipart::Part::bytes(image.to_vec())
            .file_name(filename.to_string())
            .mime_str("image/jpeg")
            .map_err(|e| CxrError::InvalidInput(format!("影像内容类型无效: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .multipart(form)
            .send()
            .await
            .map_err(|e| CxrError::Network {
                stage: UpstreamStage::FeatureExtraction,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CxrError::Upstream {
                stage: UpstreamStage::FeatureExtraction,
                status,
                snippet: snippet(&body),
            });
        }

        let features: Vec<f64> = response.json().await.map_err(|e| CxrError::Upstream {
            stage: UpstreamStage::FeatureExtraction,
            status: 200,
            snippet: format!("响应不是浮点数组: {}", e),
        })?;

        info!("Features extracted successfully: {} dimensions", features.len());
        Ok(features)
    }

    /// 从特征向量获取预测
    ///
    /// 以JSON提交特征向量，返回原始预测数组（由加载器做结构校验）。
    pub async fn get_predictions(&self, features: &[f64]) -> Result<serde_json::Value> {
        let url = format!(
            "{}{}",
            self.config.base_url, self.config.linear_probe_endpoint
        );
        debug!("Getting predictions for {} features", features.len());

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&features)
            .send()
            .await
            .map_err(|e| CxrError::Network {
                stage: UpstreamStage::LinearProbe,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CxrError::Upstream {
                stage: UpstreamStage::LinearProbe,
                status,
                snippet: snippet(&body),
            });
        }

        let predictions: serde_json::Value =
            response.json().await.map_err(|e| CxrError::Upstream {
                stage: UpstreamStage::LinearProbe,
                status: 200,
                snippet: format!("响应不是合法JSON: {}", e),
            })?;

        info!(
            "Predictions received: {} items",
            predictions.as_array().map(Vec::len).unwrap_or(0)
        );
        Ok(predictions)
    }
}
