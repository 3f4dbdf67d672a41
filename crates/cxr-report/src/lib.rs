//! # CXR报告模块
//!
//! 报告生成流水线的确定性部分，包括：
//! - 特征分区映射表：分区名到有序特征编号列表的静态配置
//! - 预测数据加载：JSON预测数组到校验表结构的解析
//! - 分区筛选排序：按映射顺序抽取并排列预测行
//! - 纲要生成：逐分区渲染的纯文本报告概要
//! - 提示词构造：嵌入纲要的固定LLM指令模板
//! - 旧版CSV适配器：描述表拼接的历史输入格式

pub mod adapter;
pub mod loader;
pub mod mapping;
pub mod prompt;
pub mod section;
pub mod synopsis;

// 重新导出主要类型
pub use adapter::from_csv_with_descriptions;
pub use loader::PredictionTable;
pub use mapping::{load_mapping, LoadedMapping, MappingSource, Section, SectionMapping};
pub use prompt::{build_prompt, ChatMessage, ChatPrompt, LlmParams};
pub use section::filter_and_sort;
pub use synopsis::build_synopsis;
