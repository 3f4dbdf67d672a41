//! 预测数据加载
//!
//! 把JSON编码的预测数组解析为校验过的表结构

use cxr_core::{CxrError, PredictionRecord, Result, RiskLevel};
use serde_json::Value;

/// 必需列，缺失任何一列判定为结构错误
const REQUIRED_COLUMNS: [&str; 3] = ["uid", "item", "risk"];

/// 校验过的预测表
///
/// 纯内存结构，无隐藏可变状态：同一输入两次加载得到结构相同的表。
#[derive(Debug, Clone)]
pub struct PredictionTable {
    records: Vec<PredictionRecord>,
}

impl PredictionTable {
    /// 从JSON文本加载预测表
    ///
    /// 空输入或非法JSON报输入验证错误；解析成功后逐行做显式的
    /// 列存在性检查，必需列缺失报结构错误。不做任何网络或磁盘IO。
    pub fn from_json(json_text: &str) -> Result<Self> {
        if json_text.trim().is_empty() {
            return Err(CxrError::InvalidInput("预测数据为空".to_string()));
        }

        let value: Value = serde_json::from_str(json_text)
            .map_err(|e| CxrError::InvalidInput(format!("预测数据不是合法JSON: {}", e)))?;

        let rows = value
            .as_array()
            .ok_or_else(|| CxrError::InvalidInput("预测数据必须是JSON数组".to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let obj = row.as_object().ok_or_else(|| {
                CxrError::Schema(format!("第{}行不是JSON对象", index))
            })?;

            for column in REQUIRED_COLUMNS {
                if !obj.contains_key(column) {
                    return Err(CxrError::Schema(format!(
                        "第{}行缺少必需列: {}",
                        index, column
                    )));
                }
            }

            let uid = obj["uid"]
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| CxrError::Schema(format!("第{}行uid不是非负整数", index)))?;

            let item = obj["item"]
                .as_str()
                .ok_or_else(|| CxrError::Schema(format!("第{}行item不是字符串", index)))?
                .to_string();

            let risk_text = obj["risk"]
                .as_str()
                .ok_or_else(|| CxrError::Schema(format!("第{}行risk不是字符串", index)))?;
            let risk = RiskLevel::parse(risk_text).ok_or_else(|| {
                CxrError::Schema(format!("第{}行风险等级无法识别: {}", index, risk_text))
            })?;

            let value = obj.get("value").and_then(Value::as_f64);
            let category = obj
                .get("category")
                .and_then(Value::as_str)
                .map(str::to_string);

            records.push(PredictionRecord {
                uid,
                item,
                value,
                risk,
                category,
            });
        }

        Ok(Self { records })
    }

    /// 从已构造的记录建表，供输入适配器使用
    pub(crate) fn from_records(records: Vec<PredictionRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"[
            {"uid": 1, "item": "Atelectasis", "value": 0.12, "risk": "low", "category": "Lung"},
            {"uid": 14, "item": "Cardiomegaly", "value": 0.88, "risk": "high"},
            {"uid": 7, "item": "Pleural effusion", "risk": "middle"}
        ]"#
    }

    #[test]
    fn test_load_valid_predictions() {
        let table = PredictionTable::from_json(sample_json()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.records()[0].uid, 1);
        assert_eq!(table.records()[1].risk, RiskLevel::High);
        assert_eq!(table.records()[2].value, None);
        assert_eq!(table.records()[0].category.as_deref(), Some("Lung"));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            PredictionTable::from_json(""),
            Err(CxrError::InvalidInput(_))
        ));
        assert!(matches!(
            PredictionTable::from_json("   \n"),
            Err(CxrError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            PredictionTable::from_json("{not json"),
            Err(CxrError::InvalidInput(_))
        ));
        assert!(matches!(
            PredictionTable::from_json(r#"{"uid": 1}"#),
            Err(CxrError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_column_rejected() {
        let json = r#"[{"uid": 1, "item": "Nodule"}]"#;
        match PredictionTable::from_json(json) {
            Err(CxrError::Schema(msg)) => assert!(msg.contains("risk")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_risk_rejected() {
        let json = r#"[{"uid": 1, "item": "Nodule", "risk": "severe"}]"#;
        assert!(matches!(
            PredictionTable::from_json(json),
            Err(CxrError::Schema(_))
        ));
    }

    #[test]
    fn test_loader_is_idempotent() {
        // 同一输入两次加载，结构完全一致
        let a = PredictionTable::from_json(sample_json()).unwrap();
        let b = PredictionTable::from_json(sample_json()).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.records().iter().zip(b.records()) {
            assert_eq!(x.uid, y.uid);
            assert_eq!(x.item, y.item);
            assert_eq!(x.risk, y.risk);
            assert_eq!(x.value, y.value);
            assert_eq!(x.category, y.category);
        }
    }
}
