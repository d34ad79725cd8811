// ==========================================
// 施工算量清单编译器 - 场地 / 市政专业规则
// ==========================================
// 室外楼梯是组合构件: 休息平台 / 踏步 / 侧墙 三个分部,
// 按 `@ Label` 分组,分部之间插入分部标题行
// ==========================================

use super::{item, part_item, DisciplineProfile, Rule};
use crate::domain::takeoff::{
    DimensionLayout as L, FormulaShape as S, GroupingStrategy as G, ItemType,
};
use crate::domain::types::{Discipline, Unit};

const D: Discipline = Discipline::Civil;

pub const SUB_STAIRS_ON_GRADE: &str = "Stairs on grade";
pub const SUB_ASPHALT: &str = "Asphalt paving";
pub const SUB_CONCRETE_PAVING: &str = "Concrete paving";
pub const SUB_STONE_BASE: &str = "Stone base";
pub const SUB_CURBS: &str = "Curbs";
pub const SUB_FENCING: &str = "Fencing";
pub const SUB_SITE_PIPING: &str = "Site piping";
pub const SUB_DRAINAGE: &str = "Drainage structures";
pub const SUB_BOLLARDS: &str = "Bollards";
pub const SUB_LANDSCAPING: &str = "Landscaping";
pub const SUB_SITE_WALLS: &str = "Site walls";

/// 楼梯分部（输出顺序）
pub const PART_LANDINGS: &str = "Landings";
pub const PART_STEPS: &str = "Steps";
pub const PART_CHEEK_WALLS: &str = "Cheek walls";
pub const STAIR_PARTS: [&str; 3] = [PART_LANDINGS, PART_STEPS, PART_CHEEK_WALLS];

pub static STAIR_CHEEK_WALL: ItemType = part_item(
    "civ_stair_cheek_wall",
    "Stair cheek wall",
    D,
    SUB_STAIRS_ON_GRADE,
    S::BoxVolume,
    L::LengthWidthHeight,
    G::AtLabel,
    PART_CHEEK_WALLS,
);
pub static STAIR_LANDING: ItemType = part_item(
    "civ_stair_landing",
    "Stair landing",
    D,
    SUB_STAIRS_ON_GRADE,
    S::BoxVolume,
    L::LengthWidthHeight,
    G::AtLabel,
    PART_LANDINGS,
);
pub static STAIR_STEPS: ItemType = part_item(
    "civ_stair_steps",
    "Stair steps",
    D,
    SUB_STAIRS_ON_GRADE,
    S::BoxVolume,
    L::LengthWidthHeight,
    G::AtLabel,
    PART_STEPS,
);
pub static ASPHALT: ItemType = item(
    "civ_asphalt",
    "Asphalt paving",
    D,
    SUB_ASPHALT,
    S::AreaVolume,
    L::Thickness,
    G::Dimension,
);
pub static CONCRETE_PAVING: ItemType = item(
    "civ_concrete_paving",
    "Concrete paving / sidewalk",
    D,
    SUB_CONCRETE_PAVING,
    S::AreaVolume,
    L::Thickness,
    G::Dimension,
);
pub static STONE_BASE: ItemType = item(
    "civ_stone_base",
    "Stone base",
    D,
    SUB_STONE_BASE,
    S::AreaVolume,
    L::Thickness,
    G::Dimension,
);
pub static CURB: ItemType = item(
    "civ_curb",
    "Curb",
    D,
    SUB_CURBS,
    S::LinearOnly,
    L::None,
    G::Dimension,
);
pub static FENCE: ItemType = item(
    "civ_fence",
    "Fencing",
    D,
    SUB_FENCING,
    S::LinearOnly,
    L::None,
    G::Dimension,
);
pub static SITE_PIPE: ItemType = item(
    "civ_site_pipe",
    "Site piping",
    D,
    SUB_SITE_PIPING,
    S::LinearOnly,
    L::None,
    G::Dimension,
);
pub static DRAINAGE_STRUCTURE: ItemType = item(
    "civ_drainage_structure",
    "Drainage structure",
    D,
    SUB_DRAINAGE,
    S::CountOnly,
    L::None,
    G::Dimension,
);
pub static BOLLARD: ItemType = item(
    "civ_bollard",
    "Bollard",
    D,
    SUB_BOLLARDS,
    S::CountOnly,
    L::None,
    G::Dimension,
);
pub static LANDSCAPING: ItemType = item(
    "civ_landscaping",
    "Landscaping",
    D,
    SUB_LANDSCAPING,
    S::AreaOnly,
    L::None,
    G::Dimension,
);
pub static SITE_WALL: ItemType = item(
    "civ_site_wall",
    "Site wall",
    D,
    SUB_SITE_WALLS,
    S::LinearAreaVolume,
    L::WidthHeight,
    G::Dimension,
);

pub static PROFILE: DisciplineProfile = DisciplineProfile {
    discipline: D,
    scope: None,
    scope_exclude: None,
    subsections: &[
        SUB_STAIRS_ON_GRADE,
        SUB_ASPHALT,
        SUB_CONCRETE_PAVING,
        SUB_STONE_BASE,
        SUB_CURBS,
        SUB_FENCING,
        SUB_SITE_PIPING,
        SUB_DRAINAGE,
        SUB_BOLLARDS,
        SUB_LANDSCAPING,
        SUB_SITE_WALLS,
    ],
    rules: &[
        Rule {
            item: &STAIR_CHEEK_WALL,
            include: r"cheek\s*walls?",
            exclude: None,
            units: &[],
        },
        Rule {
            item: &STAIR_LANDING,
            include: r"\blandings?\b",
            exclude: None,
            units: &[],
        },
        Rule {
            item: &STAIR_STEPS,
            include: r"\bsteps?\b|\bstairs?\b|\btreads?\b",
            exclude: None,
            units: &[],
        },
        Rule {
            item: &ASPHALT,
            include: r"asphalt|blacktop|\bac\s+paving",
            exclude: None,
            units: &[Unit::Sf],
        },
        Rule {
            item: &CONCRETE_PAVING,
            include: r"concrete\s*(?:paving|pavement|walks?)|sidewalks?|\bpaving\b|\bpavement\b",
            exclude: None,
            units: &[Unit::Sf],
        },
        Rule {
            item: &STONE_BASE,
            include: r"\bstone\b|gravel|aggregate\s*base|base\s*course|crushed",
            exclude: None,
            units: &[Unit::Sf],
        },
        Rule {
            item: &CURB,
            include: r"\bcurbs?\b|\bcurbing\b",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &FENCE,
            include: r"\bfenc\w*",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &SITE_PIPE,
            include: r"\bpip(?:e|es|ing)\b|storm\s*line|sanitary|water\s*main",
            exclude: Some(r"\bpiles?\b"),
            units: &[Unit::Ft],
        },
        Rule {
            item: &DRAINAGE_STRUCTURE,
            include: r"catch\s*basins?|manholes?|dry\s*wells?|\binlets?\b|drain(?:age)?\s*structures?|\bcb[\s-]*\d+|area\s*drains?|trench\s*drains?",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &BOLLARD,
            include: r"bollards?",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &LANDSCAPING,
            include: r"landscap\w*|\bsod\b|topsoil|seeding|planting|mulch",
            exclude: None,
            units: &[Unit::Sf],
        },
        Rule {
            item: &SITE_WALL,
            include: r"(?:site|screen|seat|garden)\s*walls?",
            exclude: None,
            units: &[Unit::Ft],
        },
    ],
    category_aliases: &["civil", "sitework", "site", "civilsitework", "sitecivil"],
    parts: &STAIR_PARTS,
    mirror: None,
};
