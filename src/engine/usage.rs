// ==========================================
// 施工算量清单编译器 - 行占用登记
// ==========================================
// 职责: 记录每个原始行被哪个专业认领
// 红线: 一次写入;同专业重复认领幂等;冲突认领被拒绝
// 说明: 每次运行独立持有,不跨批次共享
// ==========================================

use crate::domain::types::Discipline;

/// 认领结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// 首次认领成功
    Claimed,
    /// 已被同一专业认领（幂等）
    AlreadyOwned,
    /// 已被其他专业认领,本次拒绝
    Conflict(Discipline),
}

impl ClaimOutcome {
    pub fn is_owned(&self) -> bool {
        matches!(self, ClaimOutcome::Claimed | ClaimOutcome::AlreadyOwned)
    }
}

// ==========================================
// UsedRowTracker - 行占用登记表
// ==========================================
#[derive(Debug, Clone)]
pub struct UsedRowTracker {
    owners: Vec<Option<Discipline>>,
}

impl UsedRowTracker {
    /// 为 n 行批次创建空登记表
    pub fn new(row_count: usize) -> Self {
        Self {
            owners: vec![None; row_count],
        }
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// 认领第 position 行
    ///
    /// # 返回
    /// - Claimed / AlreadyOwned: 该行归属 discipline
    /// - Conflict(owner): 已归属其他专业,登记表不变
    /// - None: 位置越界
    pub fn claim(&mut self, position: usize, discipline: Discipline) -> Option<ClaimOutcome> {
        let slot = self.owners.get_mut(position)?;
        Some(match slot {
            None => {
                *slot = Some(discipline);
                ClaimOutcome::Claimed
            }
            Some(owner) if *owner == discipline => ClaimOutcome::AlreadyOwned,
            Some(owner) => ClaimOutcome::Conflict(*owner),
        })
    }

    /// 查询认领者（只读）
    pub fn claimant(&self, position: usize) -> Option<Discipline> {
        self.owners.get(position).copied().flatten()
    }

    pub fn is_claimed(&self, position: usize) -> bool {
        self.claimant(position).is_some()
    }

    /// 未被任何专业认领的行位置（升序）
    pub fn unused_positions(&self) -> Vec<usize> {
        self.owners
            .iter()
            .enumerate()
            .filter(|(_, owner)| owner.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// 某专业认领的行数
    pub fn count_for(&self, discipline: Discipline) -> usize {
        self.owners
            .iter()
            .filter(|owner| **owner == Some(discipline))
            .count()
    }
}
