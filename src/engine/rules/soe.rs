// ==========================================
// 施工算量清单编译器 - 支护 (SOE) 专业规则
// ==========================================
// 红线: "drilled soldier pile" 必须先于 "soldier pile"
// ==========================================

use super::{item, DisciplineProfile, Rule};
use crate::domain::takeoff::{
    DimensionLayout as L, FormulaShape as S, GroupingStrategy as G, ItemType,
};
use crate::domain::types::{Discipline, Unit};

const D: Discipline = Discipline::Soe;

pub const SUB_SOLDIER_PILES: &str = "Soldier piles";
pub const SUB_LAGGING: &str = "Lagging";
pub const SUB_SHEETING: &str = "Sheeting";
pub const SUB_TIEBACKS: &str = "Tiebacks";
pub const SUB_RAKERS: &str = "Rakers & struts";
pub const SUB_WALERS: &str = "Walers";
pub const SUB_UNDERPINNING: &str = "Underpinning";
pub const SUB_SHOTCRETE: &str = "Shotcrete";

pub static DRILLED_SOLDIER_PILE: ItemType = item(
    "soe_drilled_soldier_pile",
    "Drilled soldier pile",
    D,
    SUB_SOLDIER_PILES,
    S::Pile,
    L::RolledSectionPile,
    G::Dimension,
);
pub static SOLDIER_PILE: ItemType = item(
    "soe_soldier_pile",
    "Soldier pile",
    D,
    SUB_SOLDIER_PILES,
    S::Pile,
    L::RolledSectionPile,
    G::Dimension,
);
pub static LAGGING: ItemType = item(
    "soe_lagging",
    "Timber lagging",
    D,
    SUB_LAGGING,
    S::LinearArea,
    L::HeightOnly,
    G::Dimension,
);
pub static SHEETING: ItemType = item(
    "soe_sheeting",
    "Sheet piling",
    D,
    SUB_SHEETING,
    S::LinearArea,
    L::HeightOnly,
    G::Dimension,
);
pub static TIEBACK: ItemType = item(
    "soe_tieback",
    "Tieback anchor",
    D,
    SUB_TIEBACKS,
    S::CountLength,
    L::LengthTag,
    G::Dimension,
);
pub static RAKER: ItemType = item(
    "soe_raker",
    "Raker / strut",
    D,
    SUB_RAKERS,
    S::CountLength,
    L::LengthTag,
    G::Dimension,
);
pub static WALER: ItemType = item(
    "soe_waler",
    "Waler",
    D,
    SUB_WALERS,
    S::LinearWeight,
    L::RolledSection,
    G::Dimension,
);
pub static UNDERPINNING: ItemType = item(
    "soe_underpinning",
    "Underpinning pit",
    D,
    SUB_UNDERPINNING,
    S::BoxVolume,
    L::LengthWidthHeight,
    G::Dimension,
);
pub static SHOTCRETE: ItemType = item(
    "soe_shotcrete",
    "Shotcrete",
    D,
    SUB_SHOTCRETE,
    S::AreaVolume,
    L::Thickness,
    G::Dimension,
);

pub static PROFILE: DisciplineProfile = DisciplineProfile {
    discipline: D,
    scope: None,
    scope_exclude: None,
    subsections: &[
        SUB_SOLDIER_PILES,
        SUB_LAGGING,
        SUB_SHEETING,
        SUB_TIEBACKS,
        SUB_RAKERS,
        SUB_WALERS,
        SUB_UNDERPINNING,
        SUB_SHOTCRETE,
    ],
    rules: &[
        Rule {
            item: &DRILLED_SOLDIER_PILE,
            include: r"drilled\s+soldier\s+(?:piles?|beams?)",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &SOLDIER_PILE,
            include: r"soldier\s+(?:piles?|beams?)",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &LAGGING,
            include: r"\blagging\b",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &SHEETING,
            include: r"sheet[\s-]*pil\w*|\bsheeting\b",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &TIEBACK,
            include: r"tie[\s-]*backs?|\b(?:soil|rock)\s+anchors?",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &RAKER,
            include: r"\b(?:rakers?|struts?|kickers?)\b",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &WALER,
            include: r"\bwal(?:er|e)s?\b",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &UNDERPINNING,
            include: r"underpin\w*",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &SHOTCRETE,
            include: r"shotcrete|gunite",
            exclude: None,
            units: &[Unit::Sf],
        },
    ],
    category_aliases: &["soe", "shoring", "supportofexcavation", "shoringsoe"],
    parts: &[],
    mirror: None,
};
