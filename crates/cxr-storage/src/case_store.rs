//! 病例存储
//!
//! 以生成的唯一标识为键，持久化一张已处理影像的完整流水线产出：
//! 影像元数据、特征向量、原始预测、报告正文与审核状态。

use crate::verification::VerificationStateMachine;
use chrono::Utc;
use cxr_core::utils::{generate_case_id, sha256_hex};
use cxr_core::{
    Case, CaseReport, CaseSummary, CxrError, ImageRef, Result, Verification, VerificationStatus,
};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// 病例记录文件名
const CASE_FILE: &str = "case.json";

/// 病例存储管理器
pub struct CaseStore {
    base_dir: PathBuf,
    machine: VerificationStateMachine,
    write_lock: Mutex<()>,
}

impl CaseStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            machine: VerificationStateMachine::new(),
            write_lock: Mutex::new(()),
        }
    }

    fn case_file(&self, case_id: &str) -> PathBuf {
        self.base_dir.join(case_id).join(CASE_FILE)
    }

    /// 创建病例
    ///
    /// 生成全局唯一标识（碰撞视为不可达，不做处理），计算影像内容
    /// 哈希，把影像复制到病例目录下，写出完整JSON记录。
    pub async fn create(
        &self,
        image: &[u8],
        image_name: &str,
        features: &[f64],
        predictions: &serde_json::Value,
        report_content: &str,
    ) -> Result<String> {
        let case_id = generate_case_id();
        let case_dir = self.base_dir.join(&case_id);
        tokio::fs::create_dir_all(&case_dir).await.map_err(|e| {
            CxrError::Persistence(format!("无法创建病例目录 {}: {}", case_dir.display(), e))
        })?;

        let image_path = case_dir.join(image_name);
        tokio::fs::write(&image_path, image).await.map_err(|e| {
            CxrError::Persistence(format!("影像写入失败 {}: {}", image_path.display(), e))
        })?;

        let case = Case {
            case_id: case_id.clone(),
            timestamp: Utc::now().to_rfc3339(),
            image: ImageRef {
                name: image_name.to_string(),
                path: format!("{}/{}", case_id, image_name),
                hash: sha256_hex(image),
            },
            features: features.to_vec(),
            predictions: predictions.clone(),
            report: CaseReport {
                content: report_content.to_string(),
            },
            verification: None,
        };

        self.write_case(&case).await?;
        info!("Case {} created for image {}", case_id, image_name);
        Ok(case_id)
    }

    async fn write_case(&self, case: &Case) -> Result<()> {
        let path = self.case_file(&case.case_id);
        let payload = serde_json::to_string_pretty(case)?;
        tokio::fs::write(&path, payload).await.map_err(|e| {
            CxrError::Persistence(format!("病例写入失败 {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    /// 按标识读取病例
    pub async fn get(&self, case_id: &str) -> Result<Case> {
        let path = self.case_file(case_id);
        if !path.exists() {
            return Err(CxrError::NotFound(format!("病例不存在: {}", case_id)));
        }
        let text = tokio::fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// 按时间倒序返回最多limit条病例摘要
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<CaseSummary>> {
        let mut entries = match tokio::fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(_) => return Ok(Vec::new()),
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let case_path = entry.path().join(CASE_FILE);
            let Ok(text) = tokio::fs::read_to_string(&case_path).await else {
                continue;
            };
            match serde_json::from_str::<Case>(&text) {
                Ok(case) => summaries.push(CaseSummary {
                    case_id: case.case_id,
                    timestamp: case.timestamp,
                    image_name: case.image.name,
                }),
                Err(e) => {
                    warn!("Skipping unreadable case record {}: {}", case_path.display(), e);
                }
            }
        }

        // RFC 3339统一时区下字典序即时间序
        summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        summaries.truncate(limit);
        Ok(summaries)
    }

    /// 更新审核状态
    ///
    /// 以下情况返回 `Ok(false)` 而不是错误：病例不存在、状态文本无法
    /// 识别、状态机不允许该转换、flagged缺少原因。每次转换整体覆盖
    /// verification字段，脱离flagged时原因被清除。
    pub async fn set_verification(
        &self,
        case_id: &str,
        status: &str,
        reason: Option<&str>,
        verified_by: Option<&str>,
    ) -> Result<bool> {
        let Some(target) = VerificationStatus::parse(status) else {
            warn!("Rejecting unknown verification status {:?} for case {}", status, case_id);
            return Ok(false);
        };

        let has_reason = reason.map(str::trim).is_some_and(|r| !r.is_empty());
        if target == VerificationStatus::Flagged && !has_reason {
            warn!("Rejecting flagged status without reason for case {}", case_id);
            return Ok(false);
        }

        let _guard = self.write_lock.lock().await;

        let mut case = match self.get(case_id).await {
            Ok(case) => case,
            Err(CxrError::NotFound(_)) => {
                warn!("Verification update for unknown case {}", case_id);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let current = case
            .verification
            .as_ref()
            .map(|v| v.status)
            .unwrap_or(VerificationStatus::Pending);
        if !self.machine.can_transition(&current, &target) {
            warn!(
                "Rejecting verification transition {} -> {} for case {}",
                current, target, case_id
            );
            return Ok(false);
        }

        case.verification = Some(Verification {
            status: target,
            timestamp: Utc::now().to_rfc3339(),
            verified_by: verified_by.map(str::to_string),
            reason: if target == VerificationStatus::Flagged {
                reason.map(str::to_string)
            } else {
                None
            },
        });
        self.write_case(&case).await?;

        info!("Case {} verification set to {}", case_id, target);
        Ok(true)
    }
}
