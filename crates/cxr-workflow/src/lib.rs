//! # CXR工作流模块
//!
//! 报告生成流水线的协调层：把推理客户端、确定性报告组件、LLM网关
//! 与两个存储串成一次严格顺序的运行，并把失败折叠为结构化结果。

pub mod pipeline;

pub use pipeline::{PipelineOutcome, ReportPipeline};
