//! 审核状态机
//!
//! 管理病例审核状态的合法转换

use cxr_core::{CxrError, Result, VerificationStatus};
use std::collections::HashSet;

/// 审核状态机
///
/// pending是隐式初始状态；flagged可以改判或重新标记；
/// 任何操作都不提供回到pending的路径。
#[derive(Debug)]
pub struct VerificationStateMachine {
    transitions: HashSet<(VerificationStatus, VerificationStatus)>,
}

impl VerificationStateMachine {
    /// 创建新的状态机实例
    pub fn new() -> Self {
        let mut transitions = HashSet::new();

        // 定义状态转换规则
        transitions.insert((VerificationStatus::Pending, VerificationStatus::Verified));
        transitions.insert((VerificationStatus::Pending, VerificationStatus::Flagged));
        transitions.insert((VerificationStatus::Flagged, VerificationStatus::Verified));
        // 允许重新标记，覆盖原因
        transitions.insert((VerificationStatus::Flagged, VerificationStatus::Flagged));

        Self { transitions }
    }

    /// 检查状态转换是否有效
    pub fn can_transition(&self, from: &VerificationStatus, to: &VerificationStatus) -> bool {
        self.transitions.contains(&(*from, *to))
    }

    /// 执行状态转换
    pub fn transition(
        &self,
        from: &VerificationStatus,
        to: &VerificationStatus,
    ) -> Result<VerificationStatus> {
        if self.transitions.contains(&(*from, *to)) {
            Ok(*to)
        } else {
            Err(CxrError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }
}

impl Default for VerificationStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
