//! # CXR存储模块
//!
//! 负责报告与病例的文件持久化，以及病例审核状态的生命周期管理。
//! 两个存储各自独占自己的目录，其他组件不直接读写持久化文件。

pub mod case_store;
pub mod report_store;
pub mod verification;

pub use case_store::CaseStore;
pub use report_store::ReportStore;
pub use verification::VerificationStateMachine;
