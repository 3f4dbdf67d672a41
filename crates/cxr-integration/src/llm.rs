//! LLM补全网关
//!
//! 把完整的提示词载荷发送到外部chat-completions端点，
//! 取第一个choice的文本返回。单次尝试，不重试不流式。

use cxr_core::{CxrError, Result, UpstreamStage};
use cxr_report::ChatPrompt;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::snippet;

/// LLM服务配置
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// 服务基础URL，不含路径
    pub endpoint: String,
    /// Bearer认证密钥
    pub api_key: String,
    /// 单次请求超时秒数
    pub timeout_secs: u64,
}

/// LLM补全客户端
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
    url_chat: String,
}

/// chat-completions响应的最小解码结构
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

impl LlmClient {
    /// 创建客户端，校验端点并设置有限超时
    pub fn new(config: LlmConfig) -> Result<Self> {
        let endpoint = config.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(CxrError::Config(format!(
                "LLM端点必须是http(s) URL: {}",
                config.endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CxrError::Config(format!("LLM客户端构建失败: {}", e)))?;

        let url_chat = format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'));

        Ok(Self {
            client,
            config,
            url_chat,
        })
    }

    /// 发送补全请求并返回第一个choice的文本
    pub async fn complete(&self, prompt: &ChatPrompt) -> Result<String> {
        debug!(
            model = %prompt.model,
            "POST {}",
            self.url_chat
        );

        let response = self
            .client
            .post(&self.url_chat)
            .bearer_auth(&self.config.api_key)
            .json(prompt)
            .send()
            .await
            .map_err(|e| CxrError::Network {
                stage: UpstreamStage::Completion,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CxrError::Upstream {
                stage: UpstreamStage::Completion,
                status,
                snippet: snippet(&body),
            });
        }

        let decoded: ChatCompletionResponse =
            response.json().await.map_err(|e| CxrError::Upstream {
                stage: UpstreamStage::Completion,
                status: 200,
                snippet: format!("响应解码失败，期望choices[0].message.content: {}", e),
            })?;

        let content = decoded
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| CxrError::Upstream {
                stage: UpstreamStage::Completion,
                status: 200,
                snippet: "响应缺少choices".to_string(),
            })?;

        info!("Chat completion received: {} characters", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_validation() {
        let bad = LlmClient::new(LlmConfig {
            endpoint: "ftp://example.com".to_string(),
            api_key: "k".to_string(),
            timeout_secs: 30,
        });
        assert!(matches!(bad, Err(CxrError::Config(_))));

        let good = LlmClient::new(LlmConfig {
            endpoint: "https://api.openai.com/".to_string(),
            api_key: "k".to_string(),
            timeout_secs: 30,
        });
        assert!(good.is_ok());
        assert_eq!(
            good.unwrap().url_chat,
            "https://api.openai.com/v1/chat/completions"
        );
    }
}
