//! 特征分区映射表
//!
//! 把报告分区名映射到有序的特征编号列表，分区的声明顺序即报告输出顺序

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// 单个报告分区
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// 分区名称
    pub name: String,
    /// 有序特征编号列表，顺序决定成员资格与显示次序
    pub feature_ids: Vec<u32>,
}

/// 分区映射表
///
/// 分区按插入顺序保存；同一特征编号出现在两个分区时各自独立渲染，
/// 不做去重校验。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionMapping {
    sections: Vec<Section>,
}

/// 映射表来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingSource {
    /// 从配置文件加载
    File,
    /// 配置不可用时的内置回退
    BuiltinDefault,
}

/// 加载结果，携带映射表与来源标记供调用方断言
#[derive(Debug, Clone)]
pub struct LoadedMapping {
    pub mapping: SectionMapping,
    pub source: MappingSource,
}

impl SectionMapping {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// 内置默认映射表，六个分区
    pub fn builtin_default() -> Self {
        let section = |name: &str, ids: &[u32]| Section {
            name: name.to_string(),
            feature_ids: ids.to_vec(),
        };
        Self {
            sections: vec![
                section("Lung", &[8, 2, 3, 9, 10, 1, 5, 6]),
                section("Mediastinum", &[15, 28, 13, 17, 72, 73]),
                section("Bone", &[20, 116, 27, 42, 18, 19, 24, 23]),
                section("Cardiac silhouette", &[14]),
                section("Diagnosis", &[7, 12, 16]),
                section(
                    "Catheter and Implant",
                    &[44, 43, 41, 34, 35, 40, 36, 32, 33, 37, 38, 39],
                ),
            ],
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }
}

/// 从JSON文件加载映射表
///
/// 文件格式为分区数组：`[{"name": "...", "feature_ids": [...]}, ...]`。
/// 文件缺失或无法解析时退回内置默认映射，退回事实通过返回值的
/// `source` 字段暴露给调用方，同时记录warn日志。
pub async fn load_mapping(path: Option<&Path>) -> LoadedMapping {
    let Some(path) = path else {
        return LoadedMapping {
            mapping: SectionMapping::builtin_default(),
            source: MappingSource::BuiltinDefault,
        };
    };

    match tokio::fs::read_to_string(path).await {
        Ok(text) => match serde_json::from_str::<Vec<Section>>(&text) {
            Ok(sections) => {
                info!("Section mapping loaded from {}", path.display());
                LoadedMapping {
                    mapping: SectionMapping::new(sections),
                    source: MappingSource::File,
                }
            }
            Err(e) => {
                warn!(
                    "Section mapping file {} unparsable ({}), falling back to builtin default",
                    path.display(),
                    e
                );
                LoadedMapping {
                    mapping: SectionMapping::builtin_default(),
                    source: MappingSource::BuiltinDefault,
                }
            }
        },
        Err(e) => {
            warn!(
                "Section mapping file {} unavailable ({}), falling back to builtin default",
                path.display(),
                e
            );
            LoadedMapping {
                mapping: SectionMapping::builtin_default(),
                source: MappingSource::BuiltinDefault,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_default_sections() {
        let mapping = SectionMapping::builtin_default();
        let names: Vec<&str> = mapping.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Lung",
                "Mediastinum",
                "Bone",
                "Cardiac silhouette",
                "Diagnosis",
                "Catheter and Implant"
            ]
        );
        // 声明顺序必须原样保留
        assert_eq!(mapping.sections()[0].feature_ids, vec![8, 2, 3, 9, 10, 1, 5, 6]);
    }

    #[tokio::test]
    async fn test_load_mapping_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Lung", "feature_ids": [3, 1, 2]}}]"#
        )
        .unwrap();

        let loaded = load_mapping(Some(file.path())).await;
        assert_eq!(loaded.source, MappingSource::File);
        assert_eq!(loaded.mapping.sections().len(), 1);
        assert_eq!(loaded.mapping.sections()[0].feature_ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_load_mapping_missing_file_falls_back() {
        let loaded = load_mapping(Some(Path::new("/nonexistent/mapping.json"))).await;
        assert_eq!(loaded.source, MappingSource::BuiltinDefault);
        assert_eq!(loaded.mapping.sections().len(), 6);
    }

    #[tokio::test]
    async fn test_load_mapping_unparsable_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json at all").unwrap();

        let loaded = load_mapping(Some(file.path())).await;
        assert_eq!(loaded.source, MappingSource::BuiltinDefault);
    }
}
