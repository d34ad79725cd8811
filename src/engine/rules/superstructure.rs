// ==========================================
// 施工算量清单编译器 - 上部结构专业规则
// ==========================================
// 红线: topping slab 先于通用楼板
// 红线: 室外/带 @ 标签的楼梯留给场地专业的组合构件
// ==========================================

use super::{item, DisciplineProfile, Rule};
use crate::domain::takeoff::{
    DimensionLayout as L, FormulaShape as S, GroupingStrategy as G, ItemType,
};
use crate::domain::types::{Discipline, Unit};

const D: Discipline = Discipline::Superstructure;

pub const SUB_TOPPING: &str = "Topping slabs";
pub const SUB_SLABS: &str = "Elevated slabs";
pub const SUB_COLUMNS: &str = "Columns";
pub const SUB_BEAMS: &str = "Beams";
pub const SUB_SHEAR_WALLS: &str = "Shear walls";
pub const SUB_PARAPETS: &str = "Parapets";
pub const SUB_STAIRS: &str = "Stairs";
pub const SUB_EQUIPMENT_PADS: &str = "Equipment pads";

pub static TOPPING_SLAB: ItemType = item(
    "ss_topping_slab",
    "Topping slab",
    D,
    SUB_TOPPING,
    S::AreaVolume,
    L::Thickness,
    G::Dimension,
);
pub static SLAB: ItemType = item(
    "ss_slab",
    "Elevated slab",
    D,
    SUB_SLABS,
    S::AreaVolume,
    L::Thickness,
    G::Dimension,
);
pub static COLUMN: ItemType = item(
    "ss_column",
    "Column",
    D,
    SUB_COLUMNS,
    S::BoxVolume,
    L::LengthWidthHeight,
    G::Dimension,
);
pub static BEAM: ItemType = item(
    "ss_beam",
    "Beam",
    D,
    SUB_BEAMS,
    S::LinearAreaVolume,
    L::WidthHeight,
    G::Dimension,
);
pub static SHEAR_WALL: ItemType = item(
    "ss_shear_wall",
    "Shear wall",
    D,
    SUB_SHEAR_WALLS,
    S::LinearAreaVolume,
    L::WidthHeight,
    G::Dimension,
);
pub static PARAPET: ItemType = item(
    "ss_parapet",
    "Parapet",
    D,
    SUB_PARAPETS,
    S::LinearAreaVolume,
    L::WidthHeight,
    G::Dimension,
);
pub static STAIRS: ItemType = item(
    "ss_stairs",
    "Interior stair",
    D,
    SUB_STAIRS,
    S::CountOnly,
    L::None,
    G::Dimension,
);
pub static EQUIPMENT_PAD: ItemType = item(
    "ss_equipment_pad",
    "Equipment pad",
    D,
    SUB_EQUIPMENT_PADS,
    S::BoxVolume,
    L::LengthWidthHeight,
    G::Dimension,
);

pub static PROFILE: DisciplineProfile = DisciplineProfile {
    discipline: D,
    scope: None,
    scope_exclude: None,
    subsections: &[
        SUB_TOPPING,
        SUB_SLABS,
        SUB_COLUMNS,
        SUB_BEAMS,
        SUB_SHEAR_WALLS,
        SUB_PARAPETS,
        SUB_STAIRS,
        SUB_EQUIPMENT_PADS,
    ],
    rules: &[
        Rule {
            item: &TOPPING_SLAB,
            include: r"\btopping\b",
            exclude: None,
            units: &[Unit::Sf],
        },
        Rule {
            item: &SLAB,
            include: r"\bslabs?\b|\bdecks?\b",
            exclude: Some(r"on[\s-]*grade|\bsog\b|\bmat\b|\bmud\b"),
            units: &[Unit::Sf],
        },
        Rule {
            item: &COLUMN,
            include: r"\bcol(?:umn)?s?\b|\bc[\s-]?\d+\b",
            exclude: Some(r"footing"),
            units: &[Unit::Ea],
        },
        Rule {
            item: &BEAM,
            include: r"\bbeams?\b|\bb[\s-]?\d+\b",
            exclude: Some(r"grade"),
            units: &[Unit::Ft],
        },
        Rule {
            item: &SHEAR_WALL,
            include: r"shear\s*walls?|core\s*walls?|\bsw[\s-]*\d+",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &PARAPET,
            include: r"parapets?",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &STAIRS,
            include: r"\bstairs?\b|\bsteps?\b|\blandings?\b",
            exclude: Some(r"on[\s-]*grade|@|exterior|\bsite\b"),
            units: &[],
        },
        Rule {
            item: &EQUIPMENT_PAD,
            include: r"(?:equipment|housekeeping|mechanical)\s*pads?|\bpads?\b",
            exclude: None,
            units: &[Unit::Ea],
        },
    ],
    category_aliases: &["superstructure", "structure", "structural", "concrete"],
    parts: &[],
    mirror: None,
};
