// ==========================================
// 施工算量清单编译器 - 构件分类器
// ==========================================
// 职责: 按专业规则表把原始行分类为构件并认领
// 红线: 一行最多被一个专业认领;已被其它专业认领的行直接跳过
// 红线: Peek 模式只读,绝不修改占用表
// 说明: 规则正则在首次使用时统一编译,匹配前先规范化描述文本
// ==========================================

use crate::config::EstimateConfig;
use crate::domain::takeoff::{ClassifiedItem, ItemType, RawRow};
use crate::domain::types::Discipline;
use crate::engine::dimension::DimensionParser;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::grouping::derive_group_key;
use crate::engine::rules::{all_profiles, discipline_for_category, DisciplineProfile, Rule};
use crate::engine::usage::{ClaimOutcome, UsedRowTracker};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, info};

// ==========================================
// 编译后的规则表
// ==========================================

struct CompiledRule {
    include: Regex,
    exclude: Option<Regex>,
}

struct CompiledProfile {
    scope: Option<Regex>,
    scope_exclude: Option<Regex>,
    /// 与 DisciplineProfile::rules 一一对应
    rules: Vec<CompiledRule>,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).expect("Invalid regex")
}

static COMPILED: Lazy<BTreeMap<Discipline, CompiledProfile>> = Lazy::new(|| {
    all_profiles()
        .into_iter()
        .map(|profile| {
            let compiled = CompiledProfile {
                scope: profile.scope.map(compile),
                scope_exclude: profile.scope_exclude.map(compile),
                rules: profile
                    .rules
                    .iter()
                    .map(|rule| CompiledRule {
                        include: compile(rule.include),
                        exclude: rule.exclude.map(compile),
                    })
                    .collect(),
            };
            (profile.discipline, compiled)
        })
        .collect()
});

// ==========================================
// ClassifyMode - 分类模式
// ==========================================
pub enum ClassifyMode<'a> {
    /// 认领模式: 命中即写入占用表
    Claim(&'a mut UsedRowTracker),
    /// 只读模式: 仅查看 owner 已认领的行,不改变占用
    Peek {
        tracker: &'a UsedRowTracker,
        owner: Discipline,
    },
}

// ==========================================
// ItemClassifier - 构件分类器
// ==========================================
#[derive(Debug, Clone)]
pub struct ItemClassifier {
    parser: DimensionParser,
    respect_category: bool,
    group_key_decimals: u32,
}

impl ItemClassifier {
    pub fn new(config: &EstimateConfig) -> Self {
        Self {
            parser: DimensionParser::from_config(config),
            respect_category: config.respect_category,
            group_key_decimals: config.group_key_decimals,
        }
    }

    pub fn parser(&self) -> &DimensionParser {
        &self.parser
    }

    /// 在专业规则表中查找第一条命中的规则
    ///
    /// # 返回
    /// - Some(rule): 命中的规则（表内顺序优先）
    /// - None: 专业范围不符或无规则命中
    pub fn match_rule(
        &self,
        profile: &'static DisciplineProfile,
        row: &RawRow,
    ) -> Option<&'static Rule> {
        let compiled = COMPILED.get(&profile.discipline)?;
        let text = DimensionParser::normalize(&row.description);
        if text.trim().is_empty() {
            return None;
        }

        if let Some(scope) = &compiled.scope {
            if !scope.is_match(&text) {
                return None;
            }
        }
        if let Some(scope_exclude) = &compiled.scope_exclude {
            if scope_exclude.is_match(&text) {
                return None;
            }
        }

        profile
            .rules
            .iter()
            .zip(compiled.rules.iter())
            .find(|(rule, compiled_rule)| {
                compiled_rule.include.is_match(&text)
                    && !compiled_rule
                        .exclude
                        .as_ref()
                        .is_some_and(|ex| ex.is_match(&text))
                    && rule.accepts_unit(row.unit)
            })
            .map(|(rule, _)| rule)
    }

    /// category 提示指向其它专业时,本专业不处理该行
    fn gated_out(&self, profile: &DisciplineProfile, row: &RawRow) -> bool {
        if !self.respect_category {
            return false;
        }
        row.category
            .as_deref()
            .and_then(discipline_for_category)
            .is_some_and(|d| d != profile.discipline)
    }

    /// 按专业规则表分类整批原始行
    ///
    /// # 参数
    /// - profile: 专业配置
    /// - rows: 整批原始行（位置即占用表下标）
    /// - mode: 认领 / 只读
    ///
    /// # 返回
    /// - 按行位置排列的已分类构件
    pub fn classify(
        &self,
        profile: &'static DisciplineProfile,
        rows: &[RawRow],
        mut mode: ClassifyMode<'_>,
    ) -> EngineResult<Vec<ClassifiedItem>> {
        let discipline = profile.discipline;
        let mut items = Vec::new();

        for (position, row) in rows.iter().enumerate() {
            let visible = match &mode {
                ClassifyMode::Claim(tracker) => tracker
                    .claimant(position)
                    .map_or(true, |owner| owner == discipline),
                ClassifyMode::Peek { tracker, owner } => tracker.claimant(position) == Some(*owner),
            };
            if !visible || self.gated_out(profile, row) {
                continue;
            }

            let Some(rule) = self.match_rule(profile, row) else {
                continue;
            };

            if let ClassifyMode::Claim(tracker) = &mut mode {
                match tracker.claim(position, discipline) {
                    Some(ClaimOutcome::Claimed) | Some(ClaimOutcome::AlreadyOwned) => {}
                    Some(ClaimOutcome::Conflict(owner)) => {
                        return Err(EngineError::InvariantViolation(format!(
                            "行 {} 已被 {} 认领,{} 不可重复认领",
                            position, owner, discipline
                        )));
                    }
                    None => {
                        return Err(EngineError::InvariantViolation(format!(
                            "行位置 {} 超出占用表范围 {}",
                            position,
                            tracker.len()
                        )));
                    }
                }
            }

            debug!(
                discipline = %discipline,
                position,
                source_index = row.source_index,
                item = rule.item.code,
                "行命中规则"
            );
            items.push(self.build(rule.item, position, row, false));
        }

        info!(
            discipline = %discipline,
            peek = matches!(mode, ClassifyMode::Peek { .. }),
            matched = items.len(),
            "专业分类完成"
        );
        Ok(items)
    }

    /// 生成镜像构件: 按目标类型的布局重新解析并重算分组键
    pub fn mirror(&self, item: &ClassifiedItem, target: &'static ItemType) -> ClassifiedItem {
        self.build(target, item.row_position, &item.raw, true)
    }

    fn build(
        &self,
        item_type: &'static ItemType,
        position: usize,
        row: &RawRow,
        mirrored: bool,
    ) -> ClassifiedItem {
        let parsed = self.parser.resolve(&row.description, item_type.layout);
        let group_key = derive_group_key(item_type, &parsed, self.group_key_decimals);
        ClassifiedItem {
            item_type,
            row_position: position,
            parsed,
            group_key,
            raw: row.clone(),
            mirrored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Unit;
    use crate::engine::rules::{
        civil, demolition, excavation, foundation, rock_excavation, soe, superstructure,
        waterproofing,
    };

    fn classifier() -> ItemClassifier {
        ItemClassifier::new(&EstimateConfig::default())
    }

    #[test]
    fn test_all_rule_patterns_compile() {
        // 强制编译整张规则表
        assert_eq!(COMPILED.len(), 8);
        for profile in all_profiles() {
            let compiled = &COMPILED[&profile.discipline];
            assert_eq!(compiled.rules.len(), profile.rules.len());
        }
    }

    #[test]
    fn test_match_rule_respects_priority() {
        let c = classifier();
        let row = RawRow::new("Service elevator pit (8'x6'x4')", 1.0, Unit::Ea, 1);
        let rule = c.match_rule(&foundation::PROFILE, &row).unwrap();
        assert_eq!(rule.item.code, "fdn_service_elevator_pit");

        let row = RawRow::new("Elevator pit (8'x6'x4')", 1.0, Unit::Ea, 2);
        let rule = c.match_rule(&foundation::PROFILE, &row).unwrap();
        assert_eq!(rule.item.code, "fdn_elevator_pit");
    }

    fn code_of(
        c: &ItemClassifier,
        profile: &'static DisciplineProfile,
        description: &str,
        unit: Unit,
    ) -> Option<&'static str> {
        let row = RawRow::new(description, 1.0, unit, 1);
        c.match_rule(profile, &row).map(|rule| rule.item.code)
    }

    #[test]
    fn test_sump_pit_requires_pit() {
        let c = classifier();
        assert_eq!(
            code_of(&c, &foundation::PROFILE, "Sump pit (4'x4'x3')", Unit::Ea),
            Some("fdn_sump_pit")
        );
        assert_ne!(
            code_of(&c, &foundation::PROFILE, "Sump pump", Unit::Ea),
            Some("fdn_sump_pit")
        );
    }

    #[test]
    fn test_gravel_under_slab_is_civil_stone() {
        let c = classifier();
        let text = "4\" gravel under SOG";
        assert_eq!(code_of(&c, &foundation::PROFILE, text, Unit::Sf), None);
        assert_eq!(code_of(&c, &excavation::PROFILE, text, Unit::Sf), None);
        assert_eq!(
            code_of(&c, &civil::PROFILE, text, Unit::Sf),
            Some("civ_stone_base")
        );
        assert_eq!(
            code_of(&c, &foundation::PROFILE, "Crushed stone base course 6\"", Unit::Sf),
            None
        );
        assert_eq!(
            code_of(&c, &foundation::PROFILE, "SOG 6\"", Unit::Sf),
            Some("fdn_sog")
        );
    }

    #[test]
    fn test_soe_drilled_soldier_pile_first() {
        let c = classifier();
        assert_eq!(
            code_of(&c, &soe::PROFILE, "Drilled soldier pile HP12x84 (L=40')", Unit::Ea),
            Some("soe_drilled_soldier_pile")
        );
        assert_eq!(
            code_of(&c, &soe::PROFILE, "Soldier pile HP12x84 (L=40')", Unit::Ea),
            Some("soe_soldier_pile")
        );
    }

    #[test]
    fn test_superstructure_topping_before_slab() {
        let c = classifier();
        let p = &superstructure::PROFILE;
        assert_eq!(code_of(&c, p, "Topping slab 3\"", Unit::Sf), Some("ss_topping_slab"));
        assert_eq!(code_of(&c, p, "Elevated slab 8\"", Unit::Sf), Some("ss_slab"));
        assert_eq!(code_of(&c, p, "Slab on grade 6\"", Unit::Sf), None);
    }

    #[test]
    fn test_exterior_stairs_fall_to_civil() {
        let c = classifier();
        assert_eq!(
            code_of(&c, &superstructure::PROFILE, "Interior stairs", Unit::Ea),
            Some("ss_stairs")
        );
        for text in ["Stairs @ entrance", "Steps on grade"] {
            assert_eq!(code_of(&c, &superstructure::PROFILE, text, Unit::Ea), None);
            assert_eq!(
                code_of(&c, &civil::PROFILE, text, Unit::Ea),
                Some("civ_stair_steps")
            );
        }
        assert_eq!(
            code_of(&c, &civil::PROFILE, "Cheek wall @ stairs", Unit::Ft),
            Some("civ_stair_cheek_wall")
        );
    }

    #[test]
    fn test_waterproofing_wall_and_below_slab() {
        let c = classifier();
        let p = &waterproofing::PROFILE;
        assert_eq!(
            code_of(&c, p, "Below slab waterproofing", Unit::Sf),
            Some("wp_below_slab")
        );
        assert_eq!(
            code_of(&c, p, "Waterproofing membrane under slab", Unit::Sf),
            Some("wp_below_slab")
        );
        assert_eq!(
            code_of(&c, p, "Foundation wall waterproofing (H=10')", Unit::Ft),
            Some("wp_wall")
        );
        assert_eq!(
            code_of(&c, p, "Foundation wall waterproofing", Unit::Sf),
            Some("wp_general")
        );
    }

    #[test]
    fn test_rock_pit_before_trench_and_bulk() {
        let c = classifier();
        let p = &rock_excavation::PROFILE;
        assert_eq!(code_of(&c, p, "Rock pit excavation (4')", Unit::Ea), Some("rock_pit"));
        assert_eq!(
            code_of(&c, p, "Rock trench excavation (3')", Unit::Ft),
            Some("rock_trench")
        );
        // 基坑规则只收 EA
        assert_eq!(
            code_of(&c, p, "Rock excavation at footings (6')", Unit::Sf),
            Some("rock_excavation")
        );
        assert_eq!(code_of(&c, p, "Rock socket", Unit::Ft), None);
    }

    #[test]
    fn test_demolition_rule_order() {
        let c = classifier();
        let p = &demolition::PROFILE;
        let cases = [
            ("Saw cut existing slab", Unit::Ft, "demo_saw_cut"),
            ("Demo existing asphalt pavement", Unit::Sf, "demo_pavement"),
            ("Demo wall footing", Unit::Ft, "demo_strip_footing"),
            ("Demo pile cap", Unit::Ea, "demo_isolated_footing"),
            ("Demo existing wall 8\"", Unit::Ft, "demo_wall"),
            ("Remove existing SOG 6\"", Unit::Sf, "demo_slab"),
            ("Demo existing wall", Unit::Sf, "demo_misc"),
        ];
        for (text, unit, expected) in cases {
            assert_eq!(code_of(&c, p, text, unit), Some(expected), "{}", text);
        }
        assert_eq!(code_of(&c, p, "Demo rock", Unit::Sf), None);
        assert_eq!(code_of(&c, p, "Existing wall", Unit::Ft), None);
    }

    #[test]
    fn test_match_rule_filters_by_unit() {
        let c = classifier();
        // 条基只接受 FT
        let row = RawRow::new("SF (2'-0\"x1'-0\")", 100.0, Unit::Ea, 1);
        assert!(c.match_rule(&foundation::PROFILE, &row).is_none());

        let row = RawRow::new("SF (2'-0\"x1'-0\")", 100.0, Unit::None, 1);
        let rule = c.match_rule(&foundation::PROFILE, &row).unwrap();
        assert_eq!(rule.item.code, "fdn_strip_footing");

        let row = RawRow::new("SF (2'-0\"x1'-0\")", 100.0, Unit::Ft, 1);
        let rule = c.match_rule(&foundation::PROFILE, &row).unwrap();
        assert_eq!(rule.item.code, "fdn_strip_footing");
    }

    #[test]
    fn test_scope_exclude_blocks_profile() {
        let c = classifier();
        let row = RawRow::new("Rock excavation", 500.0, Unit::Sf, 1);
        assert!(c.match_rule(&excavation::PROFILE, &row).is_none());
    }

    #[test]
    fn test_claim_skips_rows_owned_by_others() {
        let c = classifier();
        let rows = vec![
            RawRow::new("SOG 6\"", 1000.0, Unit::Sf, 1),
            RawRow::new("Elevated slab 8\"", 500.0, Unit::Sf, 2),
        ];
        let mut tracker = UsedRowTracker::new(rows.len());
        tracker.claim(0, Discipline::Demolition);

        let items = c
            .classify(&foundation::PROFILE, &rows, ClassifyMode::Claim(&mut tracker))
            .unwrap();
        assert!(items.is_empty());
        assert_eq!(tracker.claimant(0), Some(Discipline::Demolition));

        let items = c
            .classify(
                &superstructure::PROFILE,
                &rows,
                ClassifyMode::Claim(&mut tracker),
            )
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].row_position, 1);
        assert_eq!(tracker.claimant(1), Some(Discipline::Superstructure));
    }

    #[test]
    fn test_peek_does_not_claim() {
        let c = classifier();
        let rows = vec![RawRow::new("SF (2'-0\"x1'-0\")", 100.0, Unit::Ft, 1)];
        let mut tracker = UsedRowTracker::new(1);
        c.classify(&foundation::PROFILE, &rows, ClassifyMode::Claim(&mut tracker))
            .unwrap();

        let peeked = c
            .classify(
                &foundation::PROFILE,
                &rows,
                ClassifyMode::Peek {
                    tracker: &tracker,
                    owner: Discipline::Foundation,
                },
            )
            .unwrap();
        assert_eq!(peeked.len(), 1);
        assert_eq!(tracker.count_for(Discipline::Foundation), 1);
    }

    #[test]
    fn test_category_gating() {
        let c = classifier();
        let rows = vec![RawRow::new("SOG 6\"", 1000.0, Unit::Sf, 1).with_category("Demolition")];
        let mut tracker = UsedRowTracker::new(1);
        let items = c
            .classify(&foundation::PROFILE, &rows, ClassifyMode::Claim(&mut tracker))
            .unwrap();
        assert!(items.is_empty());

        let mut config = EstimateConfig::default();
        config.respect_category = false;
        let c = ItemClassifier::new(&config);
        let items = c
            .classify(&foundation::PROFILE, &rows, ClassifyMode::Claim(&mut tracker))
            .unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_mirror_reresolves_with_target_layout() {
        let c = classifier();
        let rows = vec![RawRow::new("PC-1 (6'x5'x3')", 4.0, Unit::Ea, 1)];
        let mut tracker = UsedRowTracker::new(1);
        let items = c
            .classify(&foundation::PROFILE, &rows, ClassifyMode::Claim(&mut tracker))
            .unwrap();
        let mirrored = c.mirror(&items[0], &excavation::FDN_BOX);
        assert!(mirrored.mirrored);
        assert_eq!(mirrored.discipline(), Discipline::Excavation);
        assert_eq!(mirrored.parsed.length, Some(6.0));
        assert_eq!(mirrored.parsed.width, Some(5.0));
        assert_eq!(mirrored.parsed.height, Some(3.0));
        assert_eq!(mirrored.row_position, 0);
    }
}
