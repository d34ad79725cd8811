// ==========================================
// 施工算量清单编译器 - 基础专业规则
// ==========================================
// 红线: 优先级顺序
// - 钻孔桩（Ø…RS）先于钢管桩,钢管桩先于通用桩
// - service elevator pit 先于 elevator pit 先于 sump pit
// - mud slab 先于 mat slab
// 说明: 条基/墙/坑/承台/板同时被土方专业只读镜像
// ==========================================

use super::{item, DisciplineProfile, Rule};
use crate::domain::takeoff::{
    DimensionLayout as L, FormulaShape as S, GroupingStrategy as G, ItemType,
};
use crate::domain::types::{Discipline, Unit};

const D: Discipline = Discipline::Foundation;

pub const SUB_DRILLED_PILES: &str = "Drilled piles";
pub const SUB_PIPE_PILES: &str = "Pipe piles";
pub const SUB_H_PILES: &str = "H-piles";
pub const SUB_HELICAL_PILES: &str = "Helical piles";
pub const SUB_PILES: &str = "Piles";
pub const SUB_PILE_CAPS: &str = "Pile caps";
pub const SUB_PITS: &str = "Pits";
pub const SUB_PIERS: &str = "Piers";
pub const SUB_ISOLATED_FOOTINGS: &str = "Isolated footings";
pub const SUB_STRIP_FOOTINGS: &str = "Strip footings";
pub const SUB_GRADE_BEAMS: &str = "Grade beams";
pub const SUB_RETAINING_WALLS: &str = "Retaining walls";
pub const SUB_FOUNDATION_WALLS: &str = "Foundation walls";
pub const SUB_MAT_SLABS: &str = "Mat slabs";
pub const SUB_MUD_SLABS: &str = "Mud slabs";
pub const SUB_SOG: &str = "Slab on grade";

// ===== 桩 =====

pub static DRILLED_PILE: ItemType = item(
    "fdn_drilled_pile",
    "Drilled pile",
    D,
    SUB_DRILLED_PILES,
    S::Pile,
    L::PipePile,
    G::HeightRockSocket,
);
pub static PIPE_PILE: ItemType = item(
    "fdn_pipe_pile",
    "Pipe pile",
    D,
    SUB_PIPE_PILES,
    S::Pile,
    L::PipePile,
    G::Dimension,
);
pub static H_PILE: ItemType = item(
    "fdn_h_pile",
    "H-pile",
    D,
    SUB_H_PILES,
    S::Pile,
    L::RolledSectionPile,
    G::Dimension,
);
pub static HELICAL_PILE: ItemType = item(
    "fdn_helical_pile",
    "Helical pile",
    D,
    SUB_HELICAL_PILES,
    S::Pile,
    L::PipePile,
    G::Dimension,
);
pub static PILE: ItemType = item(
    "fdn_pile",
    "Pile",
    D,
    SUB_PILES,
    S::Pile,
    L::PipePile,
    G::Dimension,
);

// ===== 承台 / 坑 / 墩 / 独立基础 =====

pub static PILE_CAP: ItemType = item(
    "fdn_pile_cap",
    "Pile cap",
    D,
    SUB_PILE_CAPS,
    S::BoxVolume,
    L::LengthWidthHeight,
    G::Dimension,
);
pub static SERVICE_ELEVATOR_PIT: ItemType = item(
    "fdn_service_elevator_pit",
    "Service elevator pit",
    D,
    SUB_PITS,
    S::BoxVolume,
    L::LengthWidthHeight,
    G::Dimension,
);
pub static ELEVATOR_PIT: ItemType = item(
    "fdn_elevator_pit",
    "Elevator pit",
    D,
    SUB_PITS,
    S::BoxVolume,
    L::LengthWidthHeight,
    G::Dimension,
);
pub static SUMP_PIT: ItemType = item(
    "fdn_sump_pit",
    "Sump pit",
    D,
    SUB_PITS,
    S::BoxVolume,
    L::LengthWidthHeight,
    G::Dimension,
);
pub static PIER: ItemType = item(
    "fdn_pier",
    "Pier",
    D,
    SUB_PIERS,
    S::BoxVolume,
    L::LengthWidthHeight,
    G::Dimension,
);
pub static ISOLATED_FOOTING: ItemType = item(
    "fdn_isolated_footing",
    "Isolated footing",
    D,
    SUB_ISOLATED_FOOTINGS,
    S::BoxVolume,
    L::LengthWidthHeight,
    G::Dimension,
);

// ===== 线性构件 =====

pub static STRIP_FOOTING: ItemType = item(
    "fdn_strip_footing",
    "Strip footing",
    D,
    SUB_STRIP_FOOTINGS,
    S::LinearFooting,
    L::WidthHeight,
    G::Dimension,
);
pub static GRADE_BEAM: ItemType = item(
    "fdn_grade_beam",
    "Grade beam",
    D,
    SUB_GRADE_BEAMS,
    S::LinearAreaVolume,
    L::WidthHeight,
    G::Dimension,
);
pub static RETAINING_WALL: ItemType = item(
    "fdn_retaining_wall",
    "Retaining wall",
    D,
    SUB_RETAINING_WALLS,
    S::LinearAreaVolume,
    L::WidthHeight,
    G::Dimension,
);
pub static FOUNDATION_WALL: ItemType = item(
    "fdn_foundation_wall",
    "Foundation wall",
    D,
    SUB_FOUNDATION_WALLS,
    S::LinearAreaVolume,
    L::WidthHeight,
    G::Dimension,
);

// ===== 板 =====

pub static MUD_SLAB: ItemType = item(
    "fdn_mud_slab",
    "Mud slab",
    D,
    SUB_MUD_SLABS,
    S::AreaVolume,
    L::Thickness,
    G::Dimension,
);
pub static MAT_SLAB: ItemType = item(
    "fdn_mat_slab",
    "Mat slab",
    D,
    SUB_MAT_SLABS,
    S::AreaVolume,
    L::Thickness,
    G::Dimension,
);
pub static SOG: ItemType = item(
    "fdn_sog",
    "Slab on grade",
    D,
    SUB_SOG,
    S::AreaVolume,
    L::Thickness,
    G::Dimension,
);

pub static PROFILE: DisciplineProfile = DisciplineProfile {
    discipline: D,
    scope: None,
    scope_exclude: Some(
        r"excavat|backfill|\bdemo\w*|\bremov\w*|waterproof|damp[\s-]*proof|membrane|water[\s-]*stop|vapou?r|bentonite|(?:drainage|protection)\s*board|\bstone\b|gravel|aggregate|base\s*course|crushed",
    ),
    subsections: &[
        SUB_DRILLED_PILES,
        SUB_PIPE_PILES,
        SUB_H_PILES,
        SUB_HELICAL_PILES,
        SUB_PILES,
        SUB_PILE_CAPS,
        SUB_PITS,
        SUB_PIERS,
        SUB_ISOLATED_FOOTINGS,
        SUB_STRIP_FOOTINGS,
        SUB_GRADE_BEAMS,
        SUB_RETAINING_WALLS,
        SUB_FOUNDATION_WALLS,
        SUB_MAT_SLABS,
        SUB_MUD_SLABS,
        SUB_SOG,
    ],
    rules: &[
        Rule {
            item: &DRILLED_PILE,
            include: r"Ø.*\brs\b|\bdrilled\s+(?:piles?|shafts?|caissons?)|\bcaissons?\b|\bmicro[\s-]*piles?",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &PIPE_PILE,
            include: r#"pipe[\s-]*piles?|\d\s*"?\s*Ø\s*x"#,
            exclude: Some(r"\bpiers?\b"),
            units: &[Unit::Ea],
        },
        Rule {
            item: &H_PILE,
            include: r"\bh[\s-]*piles?\b|\bhp\s?\d+\s?x\s?\d+",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &HELICAL_PILE,
            include: r"helical",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &PILE,
            include: r"\bpiles?\b|\bpiling\b",
            exclude: Some(r"\bcaps?\b"),
            units: &[Unit::Ea],
        },
        Rule {
            item: &PILE_CAP,
            include: r"pile\s*caps?|\bpc[\s-]*\d+",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &SERVICE_ELEVATOR_PIT,
            include: r"service\s+elevator\s+pits?",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &ELEVATOR_PIT,
            include: r"elevator\s+pits?",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &SUMP_PIT,
            include: r"sump\s*pits?",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &PIER,
            include: r"\bpiers?\b|\bpilasters?\b",
            exclude: None,
            units: &[Unit::Ea],
        },
        Rule {
            item: &ISOLATED_FOOTING,
            include: r"\b(?:isolated|spread|pad|column)\s+footings?\b|\bf-?\d+\b|\bfootings?\b",
            exclude: Some(r"\b(?:strip|continuous|wall)\s+footings?\b"),
            units: &[Unit::Ea],
        },
        Rule {
            item: &STRIP_FOOTING,
            include: r"^\s*sf\b|\bsf[\s-]*\d+\b|\b(?:strip|continuous|wall)\s+footings?\b|\bfootings?\b",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &GRADE_BEAM,
            include: r"grade\s*beams?|\bgb[\s-]*\d+",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &RETAINING_WALL,
            include: r"retaining\s+walls?|\brw[\s-]*\d+",
            exclude: None,
            units: &[Unit::Ft],
        },
        Rule {
            item: &FOUNDATION_WALL,
            include: r"foundation\s+walls?|basement\s+walls?|\bfw[\s-]*\d+|\bwalls?\b",
            exclude: Some(r"\b(?:shear|core|parapet|cheek|site|screen|seat|garden|curtain)\b"),
            units: &[Unit::Ft],
        },
        Rule {
            item: &MUD_SLAB,
            include: r"mud\s*(?:slab|mat)",
            exclude: None,
            units: &[Unit::Sf],
        },
        Rule {
            item: &MAT_SLAB,
            include: r"\bmat\b|\braft\b",
            exclude: None,
            units: &[Unit::Sf],
        },
        Rule {
            item: &SOG,
            include: r"\bsog\b|slab[\s-]*on[\s-]*grade",
            exclude: Some(r"elevated|topping"),
            units: &[Unit::Sf],
        },
    ],
    category_aliases: &["foundation", "foundations", "fdn"],
    parts: &[],
    mirror: None,
};
