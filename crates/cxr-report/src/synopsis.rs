//! 报告纲要生成
//!
//! 把预测表按映射表逐分区渲染为确定性的纯文本

use crate::loader::PredictionTable;
use crate::mapping::SectionMapping;
use crate::section::filter_and_sort;
use std::fmt::Write;

/// 生成分区纲要文本
///
/// 每个分区输出 `"{name}:\n"` 头部，随后每行一条 `"{item}  {risk}"`，
/// 以空行结束。没有匹配行的分区仍输出头部加空行，不跳过。
/// 输出与locale无关。
pub fn build_synopsis(table: &PredictionTable, mapping: &SectionMapping) -> String {
    let mut output = String::new();
    for section in mapping.sections() {
        let _ = writeln!(output, "{}:", section.name);
        for record in filter_and_sort(table, &section.feature_ids) {
            let _ = writeln!(output, "{}  {}", record.item, record.risk);
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Section;

    fn mapping(sections: &[(&str, &[u32])]) -> SectionMapping {
        SectionMapping::new(
            sections
                .iter()
                .map(|(name, ids)| Section {
                    name: name.to_string(),
                    feature_ids: ids.to_vec(),
                })
                .collect(),
        )
    }

    fn table(json: &str) -> PredictionTable {
        PredictionTable::from_json(json).unwrap()
    }

    #[test]
    fn test_sections_render_in_declared_order() {
        let t = table(
            r#"[
                {"uid": 1, "item": "Nodule", "risk": "high"},
                {"uid": 14, "item": "Cardiomegaly", "risk": "middle"}
            ]"#,
        );
        let m = mapping(&[("Lung", &[1]), ("Cardiac silhouette", &[14])]);

        let synopsis = build_synopsis(&t, &m);
        assert_eq!(
            synopsis,
            "Lung:\nNodule  high\n\nCardiac silhouette:\nCardiomegaly  middle\n\n"
        );
    }

    #[test]
    fn test_empty_section_renders_header_only() {
        // 映射里的编号在输入中全部缺席，分区仍保留头部和空行
        let t = table(r#"[{"uid": 1, "item": "Nodule", "risk": "low"}]"#);
        let m = mapping(&[("Lung", &[1]), ("Bone", &[20, 27])]);

        let synopsis = build_synopsis(&t, &m);
        assert!(synopsis.contains("Bone:\n\n"));
    }

    #[test]
    fn test_rows_follow_mapping_order() {
        let t = table(
            r#"[
                {"uid": 2, "item": "Consolidation", "risk": "low"},
                {"uid": 8, "item": "Mass", "risk": "low"}
            ]"#,
        );
        let m = mapping(&[("Lung", &[8, 2])]);

        let synopsis = build_synopsis(&t, &m);
        let mass = synopsis.find("Mass").unwrap();
        let consolidation = synopsis.find("Consolidation").unwrap();
        assert!(mass < consolidation);
    }

    #[test]
    fn test_unmapped_uid_absent_from_output() {
        let t = table(
            r#"[
                {"uid": 9999, "item": "Mystery", "risk": "high"},
                {"uid": 1, "item": "Nodule", "risk": "low"}
            ]"#,
        );
        let m = mapping(&[("Lung", &[1])]);

        let synopsis = build_synopsis(&t, &m);
        assert!(!synopsis.contains("Mystery"));
        assert!(synopsis.contains("Nodule"));
    }
}
