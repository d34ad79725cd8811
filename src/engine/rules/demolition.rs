// ==========================================
// 施工算量清单编译器 - 拆除专业规则
// ==========================================
// 范围: 描述中出现 demo / remove / saw cut / break out
// ==========================================

use super::{item, DisciplineProfile, Rule};
use crate::domain::takeoff::{
    DimensionLayout as L, FormulaShape as S, GroupingStrategy as G, ItemType,
};
use crate::domain::types::{Discipline, Unit};

const D: Discipline = Discipline::Demolition;

pub const SUB_SLAB: &str = "Slab demolition";
pub const SUB_WALL: &str = "Wall demolition";
pub const SUB_STRIP_FOOTING: &str = "Strip footing demolition";
pub const SUB_ISOLATED_FOOTING: &str = "Footing & pile cap demolition";
pub const SUB_PAVEMENT: &str = "Pavement removal";
pub const SUB_SAW_CUT: &str = "Saw cutting";
pub const SUB_MISC: &str = "Miscellaneous demolition";

pub static SAW_CUT: ItemType = item(
    "demo_saw_cut",
    "Saw cutting",
    D,
    SUB_SAW_CUT,
    S::LinearOnly,
    L::None,
    G::Dimension,
);
pub static PAVEMENT: ItemType = item(
    "demo_pavement",
    "Pavement removal",
    D,
    SUB_PAVEMENT,
    S::AreaOnly,
    L::None,
    G::Dimension,
);
pub static STRIP_FOOTING: ItemType = item(
    "demo_strip_footing",
    "Strip footing demolition",
    D,
    SUB_STRIP_FOOTING,
    S::LinearFooting,
    L::WidthHeight,
    G::Dimension,
);
pub static ISOLATED_FOOTING: ItemType = item(
    "demo_isolated_footing",
    "Isolated footing / pile cap demolition",
    D,
    SUB_ISOLATED_FOOTING,
    S::BoxVolume,
    L::LengthWidthHeight,
    G::Dimension,
);
pub static WALL: ItemType = item(
    "demo_wall",
    "Wall demolition",
    D,
    SUB_WALL,
    S::LinearAreaVolume,
    L::WidthHeight,
    G::Dimension,
);
pub static SLAB: ItemType = item(
    "demo_slab",
    "Slab demolition",
    D,
    SUB_SLAB,
    S::AreaVolume,
    L::Thickness,
    G::Dimension,
);
pub static MISC: ItemType = item(
    "demo_misc",
    "Miscellaneous demolition",
    D,
    SUB_MISC,
    S::CountOnly,
    L::None,
    G::Dimension,
);

pub static PROFILE: DisciplineProfile = DisciplineProfile {
    discipline: D,
    scope: Some(r"\b(?:demo\w*|remov\w*|break\s*out|saw[\s-]*cut\w*)"),
    scope_exclude: Some(r"\brock\b"),
    subsections: &[
        SUB_SLAB,
        SUB_WALL,
        SUB_STRIP_FOOTING,
        SUB_ISOLATED_FOOTING,
        SUB_PAVEMENT,
        SUB_SAW_CUT,
        SUB_MISC,
    ],
    rules: &[
        Rule {
            item: &SAW_CUT,
            include: r"saw[\s-]*cut",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &PAVEMENT,
            include: r"\b(?:asphalt|pavement|paving|sidewalks?)\b",
            exclude: None,
            units: &[Unit::Sf],
        },
        // 条形基础要先于墙体判定（"wall footing" 含 wall）
        Rule {
            item: &STRIP_FOOTING,
            include: r"\b(?:strip|continuous|wall)\s+footings?\b|\bsf\b",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &ISOLATED_FOOTING,
            include: r"\b(?:isolated|spread|pad|column)\s+footings?\b|\bpile\s*caps?\b|\bf-?\d+\b|\bfootings?\b",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &WALL,
            include: r"\bwalls?\b",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &SLAB,
            include: r"\b(?:slabs?|sog|floors?|mat)\b",
            exclude: None,
            units: &[Unit::Sf],
        },
        Rule {
            item: &MISC,
            include: r".",
            exclude: None,
            units: &[],
        },
    ],
    category_aliases: &["demolition", "demo"],
    parts: &[],
    mirror: None,
};
