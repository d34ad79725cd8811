// ==========================================
// 施工算量清单编译器 - 专业规则表
// ==========================================
// 职责: 各专业的有序规则表 (include, exclude?, 单位过滤, 构件类型)
// 红线: 表内顺序即优先级,更具体的规则必须排在通用规则之前
// 红线: 同一子目下的构件类型必须共享公式形态
// ==========================================

pub mod civil;
pub mod demolition;
pub mod excavation;
pub mod foundation;
pub mod rock_excavation;
pub mod soe;
pub mod superstructure;
pub mod waterproofing;

use crate::domain::takeoff::{DimensionLayout, FormulaShape, GroupingStrategy, ItemType};
use crate::domain::types::{Discipline, Unit};

// ==========================================
// Rule - 单条分类规则
// ==========================================
#[derive(Debug)]
pub struct Rule {
    pub item: &'static ItemType,
    /// 命中条件（不区分大小写,在规范化文本上匹配）
    pub include: &'static str,
    /// 排除条件
    pub exclude: Option<&'static str>,
    /// 允许的单位;空表示不限。缺失单位的行总是放行
    pub units: &'static [Unit],
}

impl Rule {
    pub fn accepts_unit(&self, unit: Unit) -> bool {
        self.units.is_empty() || unit.is_none() || self.units.contains(&unit)
    }
}

// ==========================================
// MirrorRule - 非占用镜像映射
// ==========================================
// 源专业构件编码 → 镜像构件类型
#[derive(Debug)]
pub struct MirrorRule {
    pub source_code: &'static str,
    pub item: &'static ItemType,
}

#[derive(Debug)]
pub struct MirrorSpec {
    /// 被镜像的专业（只读查看其已认领的行）
    pub source: Discipline,
    pub rules: &'static [MirrorRule],
}

impl MirrorSpec {
    pub fn target_for(&self, source_code: &str) -> Option<&'static ItemType> {
        self.rules
            .iter()
            .find(|r| r.source_code == source_code)
            .map(|r| r.item)
    }
}

// ==========================================
// DisciplineProfile - 专业配置
// ==========================================
#[derive(Debug)]
pub struct DisciplineProfile {
    pub discipline: Discipline,
    /// 专业范围: 行必须命中才会进入规则表
    pub scope: Option<&'static str>,
    /// 专业排除: 命中则整个专业跳过该行
    pub scope_exclude: Option<&'static str>,
    /// 子目输出顺序
    pub subsections: &'static [&'static str],
    pub rules: &'static [Rule],
    /// category 提示的别名（小写,仅字母数字）
    pub category_aliases: &'static [&'static str],
    /// 组合构件分部的输出顺序
    pub parts: &'static [&'static str],
    pub mirror: Option<MirrorSpec>,
}

impl DisciplineProfile {
    /// 子目在输出中的位置;未声明的子目排最后
    pub fn subsection_rank(&self, subsection: &str) -> usize {
        self.subsections
            .iter()
            .position(|s| *s == subsection)
            .unwrap_or(self.subsections.len())
    }

    /// 分部在分组内的位置;无分部或未声明的分部排最后
    pub fn part_rank(&self, part: Option<&str>) -> usize {
        part.and_then(|p| self.parts.iter().position(|x| *x == p))
            .unwrap_or(self.parts.len())
    }

    /// 本专业全部构件类型（规则表 + 镜像）,按编码去重
    pub fn item_types(&self) -> Vec<&'static ItemType> {
        let mut items: Vec<&'static ItemType> = Vec::new();
        let mirrored = self.mirror.iter().flat_map(|m| m.rules.iter().map(|r| r.item));
        for item in self.rules.iter().map(|r| r.item).chain(mirrored) {
            if !items.iter().any(|known| known.code == item.code) {
                items.push(item);
            }
        }
        items
    }
}

/// 全部专业配置,按工作簿分段顺序
pub fn all_profiles() -> [&'static DisciplineProfile; 8] {
    [
        &demolition::PROFILE,
        &excavation::PROFILE,
        &rock_excavation::PROFILE,
        &soe::PROFILE,
        &foundation::PROFILE,
        &waterproofing::PROFILE,
        &superstructure::PROFILE,
        &civil::PROFILE,
    ]
}

pub fn profile_for(discipline: Discipline) -> &'static DisciplineProfile {
    match discipline {
        Discipline::Demolition => &demolition::PROFILE,
        Discipline::Excavation => &excavation::PROFILE,
        Discipline::RockExcavation => &rock_excavation::PROFILE,
        Discipline::Soe => &soe::PROFILE,
        Discipline::Foundation => &foundation::PROFILE,
        Discipline::Waterproofing => &waterproofing::PROFILE,
        Discipline::Superstructure => &superstructure::PROFILE,
        Discipline::Civil => &civil::PROFILE,
    }
}

/// 规范化 category 文本: 小写,仅保留字母数字
pub fn normalize_category(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// 根据 category 提示找到对应专业（无法识别时返回 None）
pub fn discipline_for_category(category: &str) -> Option<Discipline> {
    let key = normalize_category(category);
    if key.is_empty() {
        return None;
    }
    all_profiles()
        .into_iter()
        .find(|p| p.category_aliases.contains(&key.as_str()))
        .map(|p| p.discipline)
}

// ==========================================
// 构件类型构造
// ==========================================

pub(crate) const fn item(
    code: &'static str,
    label: &'static str,
    discipline: Discipline,
    subsection: &'static str,
    shape: FormulaShape,
    layout: DimensionLayout,
    grouping: GroupingStrategy,
) -> ItemType {
    ItemType {
        code,
        label,
        discipline,
        subsection,
        shape,
        layout,
        grouping,
        part: None,
    }
}

/// 组合构件的分部类型
#[allow(clippy::too_many_arguments)]
pub(crate) const fn part_item(
    code: &'static str,
    label: &'static str,
    discipline: Discipline,
    subsection: &'static str,
    shape: FormulaShape,
    layout: DimensionLayout,
    grouping: GroupingStrategy,
    part: &'static str,
) -> ItemType {
    ItemType {
        code,
        label,
        discipline,
        subsection,
        shape,
        layout,
        grouping,
        part: Some(part),
    }
}
