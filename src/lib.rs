//! # CXR Report Assistant
//!
//! 顶层封装crate，重新导出常用子模块，供演示程序与下游集成使用。
//! 服务本体见 `cxr-server`。

pub use cxr_report as report;
pub use cxr_storage as storage;
