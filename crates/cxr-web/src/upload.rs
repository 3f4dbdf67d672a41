//! 上传校验
//!
//! 在流水线启动前拒绝空文件、超限文件与不支持的扩展名

use cxr_core::{CxrError, Result};

/// 上传策略
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// 允许的最大影像大小（MB）
    pub max_image_size_mb: u64,
    /// 允许的扩展名，含点号，小写
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadPolicy {
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

/// 校验上传影像
///
/// 所有失败都在任何网络调用之前以输入验证错误返回。
pub fn validate_image(filename: &str, content: &[u8], policy: &UploadPolicy) -> Result<()> {
    if content.is_empty() {
        return Err(CxrError::InvalidInput("上传文件为空".to_string()));
    }

    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();
    if !policy.allowed_extensions.contains(&extension) {
        return Err(CxrError::InvalidInput(format!(
            "不支持的影像格式，允许: {}",
            policy.allowed_extensions.join(", ")
        )));
    }

    let max_bytes = policy.max_image_size_mb * 1024 * 1024;
    if content.len() as u64 > max_bytes {
        return Err(CxrError::InvalidInput(format!(
            "影像过大，最大允许{}MB",
            policy.max_image_size_mb
        )));
    }

    // 小于这个字节数不可能是有效影像
    if content.len() < 100 {
        return Err(CxrError::InvalidInput(
            "文件内容过小，不是有效影像".to_string(),
        ));
    }

    Ok(())
}
