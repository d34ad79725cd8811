// ==========================================
// 施工算量清单编译器 - 土方专业规则
// ==========================================
// 范围: 土方开挖与回填（岩石另见 rock_excavation）
// 镜像: 基础专业已认领的条基/墙/坑/板,只读生成基础开挖子目
// 红线: 松方系数只用于开挖;回填保持自然方体积
// ==========================================

use super::{item, DisciplineProfile, MirrorRule, MirrorSpec, Rule};
use crate::domain::takeoff::{
    DimensionLayout as L, ExcavationBasis, FormulaShape, GroupingStrategy as G, ItemType,
};
use crate::domain::types::{Discipline, Unit};

const D: Discipline = Discipline::Excavation;

const SWELL_AREA: FormulaShape = FormulaShape::Excavation {
    basis: ExcavationBasis::Area,
    swell: true,
};
const SWELL_LINEAR: FormulaShape = FormulaShape::Excavation {
    basis: ExcavationBasis::Linear,
    swell: true,
};
const SWELL_BOX: FormulaShape = FormulaShape::Excavation {
    basis: ExcavationBasis::Box,
    swell: true,
};
const BANK_AREA: FormulaShape = FormulaShape::Excavation {
    basis: ExcavationBasis::Area,
    swell: false,
};
const BANK_LINEAR: FormulaShape = FormulaShape::Excavation {
    basis: ExcavationBasis::Linear,
    swell: false,
};

pub const SUB_BULK: &str = "Bulk excavation";
pub const SUB_TRENCH: &str = "Trench excavation";
pub const SUB_FDN_LINEAR: &str = "Foundation excavation - footings & walls";
pub const SUB_FDN_BOX: &str = "Foundation excavation - pits & caps";
pub const SUB_FDN_SLAB: &str = "Foundation excavation - slabs";
pub const SUB_BACKFILL: &str = "Backfill";
pub const SUB_TRENCH_BACKFILL: &str = "Trench backfill";

pub static TRENCH_BACKFILL: ItemType = item(
    "exc_trench_backfill",
    "Trench backfill",
    D,
    SUB_TRENCH_BACKFILL,
    BANK_LINEAR,
    L::WidthHeight,
    G::Dimension,
);
pub static BACKFILL: ItemType = item(
    "exc_backfill",
    "Backfill",
    D,
    SUB_BACKFILL,
    BANK_AREA,
    L::HeightOnly,
    G::Dimension,
);
pub static TRENCH: ItemType = item(
    "exc_trench",
    "Trench excavation",
    D,
    SUB_TRENCH,
    SWELL_LINEAR,
    L::WidthHeight,
    G::Dimension,
);
pub static BULK: ItemType = item(
    "exc_bulk",
    "Bulk excavation",
    D,
    SUB_BULK,
    SWELL_AREA,
    L::HeightOnly,
    G::Dimension,
);

// ===== 镜像构件（不在规则表中,不认领） =====

pub static FDN_LINEAR: ItemType = item(
    "exc_fdn_linear",
    "Footing & wall excavation",
    D,
    SUB_FDN_LINEAR,
    SWELL_LINEAR,
    L::WidthHeight,
    G::Dimension,
);
pub static FDN_BOX: ItemType = item(
    "exc_fdn_box",
    "Pit & cap excavation",
    D,
    SUB_FDN_BOX,
    SWELL_BOX,
    L::LengthWidthHeight,
    G::Dimension,
);
pub static FDN_SLAB: ItemType = item(
    "exc_fdn_slab",
    "Slab excavation",
    D,
    SUB_FDN_SLAB,
    SWELL_AREA,
    L::Thickness,
    G::Dimension,
);

pub static PROFILE: DisciplineProfile = DisciplineProfile {
    discipline: D,
    scope: Some(r"\b(?:excavat\w*|backfill\w*|trench\w*|cut|dig\w*|earthwork\w*)\b"),
    scope_exclude: Some(r"\brock\b|trench\s*drains?"),
    subsections: &[
        SUB_BULK,
        SUB_TRENCH,
        SUB_FDN_LINEAR,
        SUB_FDN_BOX,
        SUB_FDN_SLAB,
        SUB_BACKFILL,
        SUB_TRENCH_BACKFILL,
    ],
    rules: &[
        Rule {
            item: &TRENCH_BACKFILL,
            include: r"trench\w*.*backfill|backfill.*trench",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &BACKFILL,
            include: r"backfill",
            exclude: None,
            units: &[Unit::Sf],
        },
        Rule {
            item: &TRENCH,
            include: r"\btrench",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &BULK,
            include: r"excavat|\bcut\b|\bdig|earthwork",
            exclude: None,
            units: &[Unit::Sf],
        },
    ],
    category_aliases: &["excavation", "soilexcavation", "earthwork", "earthworks", "soil"],
    parts: &[],
    mirror: Some(MirrorSpec {
        source: Discipline::Foundation,
        rules: &[
            MirrorRule {
                source_code: "fdn_strip_footing",
                item: &FDN_LINEAR,
            },
            MirrorRule {
                source_code: "fdn_grade_beam",
                item: &FDN_LINEAR,
            },
            MirrorRule {
                source_code: "fdn_retaining_wall",
                item: &FDN_LINEAR,
            },
            MirrorRule {
                source_code: "fdn_foundation_wall",
                item: &FDN_LINEAR,
            },
            MirrorRule {
                source_code: "fdn_pile_cap",
                item: &FDN_BOX,
            },
            MirrorRule {
                source_code: "fdn_service_elevator_pit",
                item: &FDN_BOX,
            },
            MirrorRule {
                source_code: "fdn_elevator_pit",
                item: &FDN_BOX,
            },
            MirrorRule {
                source_code: "fdn_sump_pit",
                item: &FDN_BOX,
            },
            MirrorRule {
                source_code: "fdn_pier",
                item: &FDN_BOX,
            },
            MirrorRule {
                source_code: "fdn_isolated_footing",
                item: &FDN_BOX,
            },
            MirrorRule {
                source_code: "fdn_mat_slab",
                item: &FDN_SLAB,
            },
            MirrorRule {
                source_code: "fdn_sog",
                item: &FDN_SLAB,
            },
        ],
    }),
};
