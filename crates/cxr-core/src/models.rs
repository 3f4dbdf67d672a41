//! 核心数据模型定义

use serde::{Deserialize, Serialize};

/// 风险等级
///
/// 上游预测模型对每个临床特征给出的有序分类。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Middle,
    High,
}

impl RiskLevel {
    /// 从文本解析风险等级，容忍 "low risk" 之类的后缀写法
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "low" | "low risk" => Some(RiskLevel::Low),
            "middle" | "middle risk" | "mid" => Some(RiskLevel::Middle),
            "high" | "high risk" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            RiskLevel::Low => "low",
            RiskLevel::Middle => "middle",
            RiskLevel::High => "high",
        };
        write!(f, "{}", text)
    }
}

/// 单条预测记录
///
/// 一次预测响应中对应一个临床特征的行。仅在单次流水线运行内存活，
/// 不单独持久化（病例记录会保留原始预测数组）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// 特征编号，在一次报告中唯一
    pub uid: u32,
    /// 特征名称
    pub item: String,
    /// 模型原始得分（可缺省）
    pub value: Option<f64>,
    /// 风险等级
    pub risk: RiskLevel,
    /// 自由分类标签（可缺省）
    pub category: Option<String>,
}

/// 持久化的报告记录
///
/// `created_at` 与 `created_at_str` 表示同一时刻；写入后不可变，
/// 修正以新报告的形式保存。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub data_name: String,
    pub report_content: String,
    pub created_at: i64,
    pub created_at_str: String,
}

/// 病例中的影像元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub name: String,
    /// 相对于病例存储根目录的路径
    pub path: String,
    /// 存储字节的SHA-256十六进制摘要
    pub hash: String,
}

/// 病例中的报告正文
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    pub content: String,
}

/// 审核状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// 隐式初始状态，病例记录中缺少verification字段即为待审核
    Pending,
    Verified,
    Flagged,
}

impl VerificationStatus {
    /// 解析状态文本，无法识别的值返回None
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(VerificationStatus::Pending),
            "verified" => Some(VerificationStatus::Verified),
            "flagged" => Some(VerificationStatus::Flagged),
            _ => None,
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Flagged => "flagged",
        };
        write!(f, "{}", text)
    }
}

/// 审核记录
///
/// 每次状态转换整体覆盖，不保留历史轨迹。`reason` 仅在flagged状态下存在。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    pub status: VerificationStatus,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// 病例记录
///
/// 一张已处理影像的完整流水线产出。`case_id` 创建时生成，永不复用，
/// 是唯一检索键。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub case_id: String,
    /// ISO 8601 创建时间
    pub timestamp: String,
    pub image: ImageRef,
    pub features: Vec<f64>,
    pub predictions: serde_json::Value,
    pub report: CaseReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,
}

/// 病例列表摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSummary {
    pub case_id: String,
    pub timestamp: String,
    pub image_name: String,
}
