// ==========================================
// 施工算量清单编译器 - 分组对象
// ==========================================
// 职责: 分组键 / 分组 / 汇总行规格
// 红线: 同一分组内所有成员共享同一公式形态
// ==========================================

use crate::domain::takeoff::{ClassifiedItem, FormulaShape};
use crate::domain::types::{Column, Discipline};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 无 `@` 标签时的哨兵值
pub const NO_AT: &str = "NO_AT";

// ==========================================
// GroupKey - 分组键
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupKey {
    /// 尺寸键（构件编码 + 四舍五入后的尺寸）
    Dimension(String),
    /// `@ Label` 文本键（已规范化,缺失为 NO_AT）
    AtLabel(String),
    /// 高度 + 嵌岩段 组合键
    HeightRockSocket(String),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Dimension(k) => write!(f, "DIM[{}]", k),
            GroupKey::AtLabel(k) => write!(f, "AT[{}]", k),
            GroupKey::HeightRockSocket(k) => write!(f, "HRS[{}]", k),
        }
    }
}

// ==========================================
// GroupKind - 分组类别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupKind {
    /// 多成员分组,拥有自己的汇总行
    Keyed,
    /// 子目内全部单成员分组合并而成的块
    MergedSingletons,
}

// ==========================================
// Segment - 分组内的连续成员段
// ==========================================
// 普通分组只有一段;组合构件（楼梯）按分部切成多段,
// 段与段之间插入分部标题行,汇总公式因此覆盖多个不相邻区间
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// 分部名;None 表示不输出分部标题行
    pub label: Option<&'static str>,
    /// 成员下标区间 [start, end)
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// ==========================================
// SumRowSpec - 汇总行规格
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SumRowSpec {
    /// 需要汇总的派生列（升序）
    pub columns: Vec<Column>,
    /// 汇总覆盖的成员段
    pub segments: Vec<Segment>,
    /// 汇总行是否按松方系数换算体积
    pub swell: bool,
}

// ==========================================
// Group - 显示分组
// ==========================================
#[derive(Debug, Clone)]
pub struct Group {
    pub subsection: &'static str,
    pub key: GroupKey,
    pub kind: GroupKind,
    pub shape: FormulaShape,
    /// 已按段排序的成员
    pub members: Vec<ClassifiedItem>,
    pub sum_spec: SumRowSpec,
}

impl Group {
    /// 汇总行描述文字
    pub fn sum_label(&self) -> String {
        match (&self.kind, &self.key) {
            (GroupKind::Keyed, GroupKey::AtLabel(label)) if label != NO_AT => {
                let display = self
                    .members
                    .iter()
                    .find_map(|m| m.parsed.at_label.clone())
                    .unwrap_or_else(|| label.clone());
                format!("Total {} @ {}", self.subsection, display)
            }
            (GroupKind::Keyed, _) => format!("Subtotal {}", self.subsection),
            (GroupKind::MergedSingletons, _) => format!("Total {}", self.subsection),
        }
    }
}

// ==========================================
// SubsectionBlock - 子目块
// ==========================================
#[derive(Debug, Clone)]
pub struct SubsectionBlock {
    pub discipline: Discipline,
    pub subsection: &'static str,
    pub groups: Vec<Group>,
}

impl SubsectionBlock {
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }
}

/// 某专业分组后的全部子目块（按子目声明顺序）
#[derive(Debug, Clone)]
pub struct DisciplineBlocks {
    pub discipline: Discipline,
    pub blocks: Vec<SubsectionBlock>,
}

impl DisciplineBlocks {
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.groups.is_empty())
    }
}
