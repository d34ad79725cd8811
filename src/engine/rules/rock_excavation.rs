// ==========================================
// 施工算量清单编译器 - 岩石开挖专业规则
// ==========================================
// 范围: 描述含 rock,嵌岩段 (socket / RS) 与锚杆除外
// 红线: 岩石开挖不乘松方系数
// ==========================================

use super::{item, DisciplineProfile, Rule};
use crate::domain::takeoff::{
    DimensionLayout as L, ExcavationBasis, FormulaShape, GroupingStrategy as G, ItemType,
};
use crate::domain::types::{Discipline, Unit};

const D: Discipline = Discipline::RockExcavation;

pub const SUB_LINE_DRILLING: &str = "Line drilling";
pub const SUB_TRENCH: &str = "Rock trench";
pub const SUB_PIT: &str = "Rock pit";
pub const SUB_BULK: &str = "Rock excavation";

pub static LINE_DRILLING: ItemType = item(
    "rock_line_drilling",
    "Line drilling",
    D,
    SUB_LINE_DRILLING,
    FormulaShape::LinearArea,
    L::HeightOnly,
    G::Dimension,
);
pub static TRENCH: ItemType = item(
    "rock_trench",
    "Rock trench excavation",
    D,
    SUB_TRENCH,
    FormulaShape::Excavation {
        basis: ExcavationBasis::Linear,
        swell: false,
    },
    L::WidthHeight,
    G::Dimension,
);
pub static PIT: ItemType = item(
    "rock_pit",
    "Rock pit excavation",
    D,
    SUB_PIT,
    FormulaShape::Excavation {
        basis: ExcavationBasis::Box,
        swell: false,
    },
    L::LengthWidthHeight,
    G::Dimension,
);
pub static BULK: ItemType = item(
    "rock_excavation",
    "Rock excavation",
    D,
    SUB_BULK,
    FormulaShape::Excavation {
        basis: ExcavationBasis::Area,
        swell: false,
    },
    L::HeightOnly,
    G::Dimension,
);

pub static PROFILE: DisciplineProfile = DisciplineProfile {
    discipline: D,
    scope: Some(r"\brock\b"),
    scope_exclude: Some(r"socket|\brs\b|anchors?|bolts?"),
    subsections: &[SUB_LINE_DRILLING, SUB_TRENCH, SUB_PIT, SUB_BULK],
    rules: &[
        Rule {
            item: &LINE_DRILLING,
            include: r"line[\s-]*drill",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &TRENCH,
            include: r"\btrench",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &PIT,
            include: r"\bpits?\b|\bcaps?\b|footings?|\bpiers?\b",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &BULK,
            include: r"excavat|remov|\brock\b",
            exclude: None,
            units: &[Unit::Sf],
        },
    ],
    category_aliases: &["rockexcavation", "rock"],
    parts: &[],
    mirror: None,
};
