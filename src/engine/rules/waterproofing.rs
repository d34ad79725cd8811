// ==========================================
// 施工算量清单编译器 - 防水专业规则
// ==========================================

use super::{item, DisciplineProfile, Rule};
use crate::domain::takeoff::{
    DimensionLayout as L, FormulaShape as S, GroupingStrategy as G, ItemType,
};
use crate::domain::types::{Discipline, Unit};

const D: Discipline = Discipline::Waterproofing;

pub const SUB_BELOW_SLAB: &str = "Below-slab waterproofing";
pub const SUB_WALL: &str = "Wall waterproofing";
pub const SUB_GENERAL: &str = "Waterproofing";
pub const SUB_DAMPPROOFING: &str = "Dampproofing";
pub const SUB_VAPOR_BARRIER: &str = "Vapor barrier";
pub const SUB_DRAINAGE_BOARD: &str = "Drainage board";
pub const SUB_BENTONITE: &str = "Bentonite";
pub const SUB_PROTECTION_BOARD: &str = "Protection board";
pub const SUB_WATERSTOP: &str = "Waterstop";

pub static WATERSTOP: ItemType = item(
    "wp_waterstop",
    "Waterstop",
    D,
    SUB_WATERSTOP,
    S::LinearOnly,
    L::None,
    G::Dimension,
);
pub static VAPOR_BARRIER: ItemType = item(
    "wp_vapor_barrier",
    "Vapor barrier",
    D,
    SUB_VAPOR_BARRIER,
    S::AreaOnly,
    L::None,
    G::Dimension,
);
pub static BELOW_SLAB: ItemType = item(
    "wp_below_slab",
    "Below-slab waterproofing",
    D,
    SUB_BELOW_SLAB,
    S::AreaOnly,
    L::None,
    G::Dimension,
);
pub static DRAINAGE_BOARD: ItemType = item(
    "wp_drainage_board",
    "Drainage board",
    D,
    SUB_DRAINAGE_BOARD,
    S::AreaOnly,
    L::None,
    G::Dimension,
);
pub static PROTECTION_BOARD: ItemType = item(
    "wp_protection_board",
    "Protection board",
    D,
    SUB_PROTECTION_BOARD,
    S::AreaOnly,
    L::None,
    G::Dimension,
);
pub static BENTONITE: ItemType = item(
    "wp_bentonite",
    "Bentonite waterproofing",
    D,
    SUB_BENTONITE,
    S::AreaOnly,
    L::None,
    G::Dimension,
);
pub static DAMPPROOFING: ItemType = item(
    "wp_dampproofing",
    "Dampproofing",
    D,
    SUB_DAMPPROOFING,
    S::AreaOnly,
    L::None,
    G::Dimension,
);
pub static WALL: ItemType = item(
    "wp_wall",
    "Wall waterproofing",
    D,
    SUB_WALL,
    S::LinearArea,
    L::HeightOnly,
    G::Dimension,
);
pub static GENERAL: ItemType = item(
    "wp_general",
    "Waterproofing",
    D,
    SUB_GENERAL,
    S::AreaOnly,
    L::None,
    G::Dimension,
);

pub static PROFILE: DisciplineProfile = DisciplineProfile {
    discipline: D,
    scope: None,
    scope_exclude: None,
    subsections: &[
        SUB_BELOW_SLAB,
        SUB_WALL,
        SUB_GENERAL,
        SUB_DAMPPROOFING,
        SUB_VAPOR_BARRIER,
        SUB_DRAINAGE_BOARD,
        SUB_BENTONITE,
        SUB_PROTECTION_BOARD,
        SUB_WATERSTOP,
    ],
    rules: &[
        Rule {
            item: &WATERSTOP,
            include: r"water[\s-]*stop",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &VAPOR_BARRIER,
            include: r"vapou?r\s*(?:barrier|retarder)|\bvb\b",
            exclude: None,
            units: &[Unit::Sf],
        },
        Rule {
            item: &BELOW_SLAB,
            include: r"(?:below|under)[\s-]*slab.*(?:waterproof|membrane)|(?:waterproof|membrane).*(?:below|under)[\s-]*slab",
            exclude: None,
            units: &[Unit::Sf],
        },
        Rule {
            item: &DRAINAGE_BOARD,
            include: r"drain\w*\s*(?:board|mat|composite)",
            exclude: None,
            units: &[Unit::Sf],
        },
        Rule {
            item: &PROTECTION_BOARD,
            include: r"protection\s*board",
            exclude: None,
            units: &[Unit::Sf],
        },
        Rule {
            item: &BENTONITE,
            include: r"bentonite",
            exclude: None,
            units: &[Unit::Sf],
        },
        Rule {
            item: &DAMPPROOFING,
            include: r"damp[\s-]*proof",
            exclude: None,
            units: &[Unit::Sf],
        },
        Rule {
            item: &WALL,
            include: r"waterproof\w*|\bwp\b",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &GENERAL,
            include: r"waterproof\w*|\bwp\b|membrane",
            exclude: None,
            units: &[Unit::Sf],
        },
    ],
    category_aliases: &["waterproofing", "wp", "dampproofing"],
    parts: &[],
    mirror: None,
};
