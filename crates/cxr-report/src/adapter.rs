//! 旧版CSV输入适配器
//!
//! 早期部署上传的是只含预测值的结果CSV，特征名存放在单独的描述CSV里，
//! 按行号对齐。适配器把两份表合并成标准预测表，后续流程与JSON输入
//! 完全一致，不构成第二条流水线。

use crate::loader::PredictionTable;
use cxr_core::{CxrError, PredictionRecord, Result, RiskLevel};
use tracing::warn;

/// 合并结果CSV与描述CSV
///
/// 结果表取 `Result` 列作为风险等级，描述表取 `name` 列作为特征名，
/// 第i行描述对应第i行结果，1起始的行号即特征编号。
pub fn from_csv_with_descriptions(
    results_csv: &str,
    description_csv: &str,
) -> Result<PredictionTable> {
    let results = parse_column(results_csv, "Result")?;
    let names = parse_column(description_csv, "name")?;

    if results.len() != names.len() {
        warn!(
            "CSV row count mismatch: {} results vs {} descriptions, joining the common prefix",
            results.len(),
            names.len()
        );
    }

    let records = names
        .into_iter()
        .zip(results)
        .enumerate()
        .map(|(index, (item, risk_text))| {
            let risk = RiskLevel::parse(&risk_text).ok_or_else(|| {
                CxrError::InvalidInput(format!(
                    "第{}行风险等级无法识别: {}",
                    index + 1,
                    risk_text
                ))
            })?;
            Ok(PredictionRecord {
                uid: (index + 1) as u32,
                item,
                value: None,
                risk,
                category: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PredictionTable::from_records(records))
}

/// 从CSV文本中抽取指定列
fn parse_column(csv_text: &str, column: &str) -> Result<Vec<String>> {
    let mut lines = csv_text.lines().filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| CxrError::InvalidInput("CSV内容为空".to_string()))?;
    let column_index = header
        .split(',')
        .position(|cell| cell.trim() == column)
        .ok_or_else(|| CxrError::InvalidInput(format!("CSV缺少列: {}", column)))?;

    lines
        .map(|line| {
            line.split(',')
                .nth(column_index)
                .map(|cell| cell.trim().to_string())
                .ok_or_else(|| {
                    CxrError::InvalidInput(format!("CSV行缺少第{}列: {}", column_index, line))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_by_row_number() {
        let results = "Result\nlow risk\nhigh risk\nmiddle risk\n";
        let descriptions = "name\nAtelectasis\nCardiomegaly\nPleural effusion\n";

        let table = from_csv_with_descriptions(results, descriptions).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.records()[0].uid, 1);
        assert_eq!(table.records()[1].item, "Cardiomegaly");
        assert_eq!(table.records()[1].risk, RiskLevel::High);
        assert_eq!(table.records()[2].uid, 3);
    }

    #[test]
    fn test_extra_columns_tolerated() {
        let results = "index,Result,score\n0,low,0.1\n1,high,0.9\n";
        let descriptions = "name,group\nNodule,Lung\nFracture,Bone\n";

        let table = from_csv_with_descriptions(results, descriptions).unwrap();
        assert_eq!(table.records()[0].item, "Nodule");
        assert_eq!(table.records()[1].risk, RiskLevel::High);
    }

    #[test]
    fn test_missing_column_rejected() {
        let results = "score\n0.4\n";
        let descriptions = "name\nNodule\n";
        assert!(matches!(
            from_csv_with_descriptions(results, descriptions),
            Err(CxrError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unknown_risk_rejected() {
        let results = "Result\nsevere\n";
        let descriptions = "name\nNodule\n";
        assert!(matches!(
            from_csv_with_descriptions(results, descriptions),
            Err(CxrError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_csv_rejected() {
        assert!(matches!(
            from_csv_with_descriptions("", "name\nNodule\n"),
            Err(CxrError::InvalidInput(_))
        ));
    }
}
