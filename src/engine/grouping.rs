// ==========================================
// 施工算量清单编译器 - 分组与汇总规划
// ==========================================
// 职责: 分组键推导 / 子目内分组 / 单成员分组合并 / 汇总行规格
// 红线: 分组顺序 = 首次出现顺序;合并块排最后;成员保持输入顺序
// 红线: 同组成员公式形态必须一致,否则视为内部不变量被破坏
// ==========================================

use crate::domain::group::{
    DisciplineBlocks, Group, GroupKey, GroupKind, Segment, SubsectionBlock, SumRowSpec, NO_AT,
};
use crate::domain::takeoff::{ClassifiedItem, GroupingStrategy, ItemType, ParsedDimensions};
use crate::domain::types::Column;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::rules::DisciplineProfile;
use std::collections::BTreeMap;
use tracing::debug;

// ==========================================
// 分组键推导
// ==========================================

/// 按构件类型的分组策略推导分组键
///
/// # 参数
/// - item: 构件类型
/// - parsed: 已按布局解析的尺寸
/// - decimals: 尺寸保留小数位
pub fn derive_group_key(item: &ItemType, parsed: &ParsedDimensions, decimals: u32) -> GroupKey {
    match item.grouping {
        GroupingStrategy::Dimension => {
            let mut parts = vec![item.code.to_string()];
            let dims = [
                ("L", parsed.length),
                ("W", parsed.width),
                ("H", parsed.effective_height()),
                ("D", parsed.diameter),
                ("T", parsed.thickness),
                ("WT", parsed.weight),
            ];
            for (tag, value) in dims {
                if let Some(v) = value {
                    parts.push(format!("{}={}", tag, round_fixed(v, decimals)));
                }
            }
            if let Some(section) = &parsed.section {
                parts.push(format!("SEC={}", section));
            }
            GroupKey::Dimension(parts.join("|"))
        }
        GroupingStrategy::AtLabel => GroupKey::AtLabel(
            parsed
                .at_label
                .as_deref()
                .map(normalize_label)
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| NO_AT.to_string()),
        ),
        GroupingStrategy::HeightRockSocket => GroupKey::HeightRockSocket(format!(
            "H={}|RS={}",
            parsed
                .height
                .map(|v| round_fixed(v, decimals))
                .unwrap_or_else(|| "-".to_string()),
            parsed
                .rock_socket
                .map(|v| round_fixed(v, decimals))
                .unwrap_or_else(|| "-".to_string()),
        )),
    }
}

fn round_fixed(value: f64, decimals: u32) -> String {
    let rounded = format!("{:.*}", decimals as usize, value);
    // -0.00 与 0.00 视为同一键
    if rounded.starts_with('-') && rounded.trim_start_matches(['-', '0', '.']).is_empty() {
        rounded.trim_start_matches('-').to_string()
    } else {
        rounded
    }
}

/// 标签规范化: 小写,折叠空白
fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ==========================================
// Grouper - 分组器
// ==========================================
pub struct Grouper;

impl Grouper {
    /// 将某专业的已分类构件组织为子目块
    ///
    /// # 参数
    /// - profile: 专业配置（子目与分部顺序）
    /// - items: 该专业全部构件（认领 + 镜像）
    ///
    /// # 返回
    /// - 按子目声明顺序排列的子目块;空子目不输出
    pub fn group(
        profile: &DisciplineProfile,
        items: Vec<ClassifiedItem>,
    ) -> EngineResult<DisciplineBlocks> {
        // 子目 → 成员（保持输入顺序）
        let mut by_subsection: BTreeMap<(usize, &'static str), Vec<ClassifiedItem>> =
            BTreeMap::new();
        for item in items {
            let rank = profile.subsection_rank(item.subsection());
            by_subsection
                .entry((rank, item.subsection()))
                .or_default()
                .push(item);
        }

        let mut blocks = Vec::with_capacity(by_subsection.len());
        for ((_, subsection), mut members) in by_subsection {
            members.sort_by_key(|m| (m.row_position, m.mirrored));
            let groups = Self::group_subsection(profile, subsection, members)?;
            debug!(
                discipline = %profile.discipline,
                subsection,
                groups = groups.len(),
                "子目分组完成"
            );
            blocks.push(SubsectionBlock {
                discipline: profile.discipline,
                subsection,
                groups,
            });
        }

        Ok(DisciplineBlocks {
            discipline: profile.discipline,
            blocks,
        })
    }

    fn group_subsection(
        profile: &DisciplineProfile,
        subsection: &'static str,
        members: Vec<ClassifiedItem>,
    ) -> EngineResult<Vec<Group>> {
        // 首次出现顺序
        let mut order: Vec<GroupKey> = Vec::new();
        let mut buckets: BTreeMap<GroupKey, Vec<ClassifiedItem>> = BTreeMap::new();
        for member in members {
            let key = member.group_key.clone();
            if !buckets.contains_key(&key) {
                order.push(key.clone());
            }
            buckets.entry(key).or_default().push(member);
        }

        let mut groups = Vec::new();
        let mut singletons: Vec<ClassifiedItem> = Vec::new();
        let mut merged_key: Option<GroupKey> = None;

        for key in order {
            let Some(bucket) = buckets.remove(&key) else {
                continue;
            };
            if bucket.len() > 1 {
                groups.push(Self::build_group(
                    profile,
                    subsection,
                    key,
                    GroupKind::Keyed,
                    bucket,
                )?);
            } else {
                if merged_key.is_none() {
                    merged_key = Some(key);
                }
                singletons.extend(bucket);
            }
        }

        if let Some(key) = merged_key {
            singletons.sort_by_key(|m| m.row_position);
            groups.push(Self::build_group(
                profile,
                subsection,
                key,
                GroupKind::MergedSingletons,
                singletons,
            )?);
        }

        Ok(groups)
    }

    fn build_group(
        profile: &DisciplineProfile,
        subsection: &'static str,
        key: GroupKey,
        kind: GroupKind,
        mut members: Vec<ClassifiedItem>,
    ) -> EngineResult<Group> {
        let shape = members
            .first()
            .map(|m| m.shape())
            .ok_or_else(|| EngineError::InvariantViolation(format!("子目 {} 出现空分组", subsection)))?;

        if let Some(odd) = members.iter().find(|m| m.shape() != shape) {
            return Err(EngineError::InvariantViolation(format!(
                "分组 {} 内公式形态不一致: {} ({:?} vs {:?})",
                key,
                odd.item_type.code,
                odd.shape(),
                shape
            )));
        }

        // 组合构件按分部排序（稳定排序,分部内保持输入顺序）
        let has_parts = members.iter().any(|m| m.item_type.part.is_some());
        if has_parts {
            members.sort_by_key(|m| profile.part_rank(m.item_type.part));
        }
        let segments = Self::segments(&members, has_parts);

        let mut columns: Vec<Column> = members
            .iter()
            .flat_map(|m| m.derived_columns())
            .collect();
        columns.sort();
        columns.dedup();

        Ok(Group {
            subsection,
            key,
            kind,
            shape,
            sum_spec: SumRowSpec {
                columns,
                segments,
                swell: shape.is_swell(),
            },
            members,
        })
    }

    /// 切分成员段: 无分部时整组一段;有分部时每个分部一段并带标题
    fn segments(members: &[ClassifiedItem], has_parts: bool) -> Vec<Segment> {
        if !has_parts {
            return vec![Segment {
                label: None,
                start: 0,
                end: members.len(),
            }];
        }

        let mut segments: Vec<Segment> = Vec::new();
        for (i, member) in members.iter().enumerate() {
            let part = member.item_type.part;
            match segments.last_mut() {
                Some(last) if last.label == part => last.end = i + 1,
                _ => segments.push(Segment {
                    label: part,
                    start: i,
                    end: i + 1,
                }),
            }
        }
        segments
    }
}
