//! 分区行筛选与排序

use crate::loader::PredictionTable;
use cxr_core::PredictionRecord;
use std::collections::HashMap;

/// 按特征编号列表筛选并排序预测行
///
/// 把编号列表视为全序：输出只包含编号在列表中的行，顺序严格跟随
/// 列表中的排位，而不是输入顺序或数值顺序。表中缺席的编号直接
/// 跳过；输入中的重复编号按稳定排序保留原相对顺序。对任何
/// 合法表都是全函数，不会失败。
pub fn filter_and_sort<'a>(
    table: &'a PredictionTable,
    feature_ids: &[u32],
) -> Vec<&'a PredictionRecord> {
    let mut rank: HashMap<u32, usize> = HashMap::with_capacity(feature_ids.len());
    for (position, id) in feature_ids.iter().enumerate() {
        // 列表内重复编号时首次出现的排位生效
        rank.entry(*id).or_insert(position);
    }

    let mut rows: Vec<&PredictionRecord> = table
        .records()
        .iter()
        .filter(|record| rank.contains_key(&record.uid))
        .collect();
    rows.sort_by_key(|record| rank[&record.uid]);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(u32, &str, &str)]) -> PredictionTable {
        let json = serde_json::to_string(
            &rows
                .iter()
                .map(|(uid, item, risk)| {
                    serde_json::json!({"uid": uid, "item": item, "risk": risk})
                })
                .collect::<Vec<_>>(),
        )
        .unwrap();
        PredictionTable::from_json(&json).unwrap()
    }

    #[test]
    fn test_order_follows_feature_list() {
        // 输入顺序与列表顺序无关，输出严格按列表排位
        let t = table(&[(3, "C", "low"), (1, "A", "low"), (2, "B", "low")]);
        let rows = filter_and_sort(&t, &[1, 2, 3]);
        let uids: Vec<u32> = rows.iter().map(|r| r.uid).collect();
        assert_eq!(uids, vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_ids_skipped() {
        let t = table(&[(3, "C", "low"), (1, "A", "low")]);
        let rows = filter_and_sort(&t, &[1, 2, 3]);
        let uids: Vec<u32> = rows.iter().map(|r| r.uid).collect();
        assert_eq!(uids, vec![1, 3]);
    }

    #[test]
    fn test_unmapped_rows_excluded() {
        let t = table(&[(9999, "Unknown", "high"), (1, "A", "low")]);
        let rows = filter_and_sort(&t, &[1, 2]);
        let uids: Vec<u32> = rows.iter().map(|r| r.uid).collect();
        assert_eq!(uids, vec![1]);
    }

    #[test]
    fn test_duplicate_uids_keep_input_order() {
        let t = table(&[(2, "B1", "low"), (1, "A", "low"), (2, "B2", "high")]);
        let rows = filter_and_sort(&t, &[1, 2]);
        let items: Vec<&str> = rows.iter().map(|r| r.item.as_str()).collect();
        assert_eq!(items, vec!["A", "B1", "B2"]);
    }

    #[test]
    fn test_empty_list_yields_empty() {
        let t = table(&[(1, "A", "low")]);
        assert!(filter_and_sort(&t, &[]).is_empty());
    }
}
