// ==========================================
// 施工算量清单编译器 - 领域模型层
// ==========================================
// 职责: 定义算量行、解析尺寸、构件类型、分组、公式与工作簿模型
// 红线: 不含规则逻辑,不含 I/O
// ==========================================

pub mod formula;
pub mod group;
pub mod takeoff;
pub mod types;
pub mod workbook;

// 重导出核心类型
pub use formula::{BinaryOp, CellRef, Expr, RangeSum, RowNumber, RowRange, RowSlot};
pub use group::{
    DisciplineBlocks, Group, GroupKey, GroupKind, Segment, SubsectionBlock, SumRowSpec, NO_AT,
};
pub use takeoff::{
    ClassifiedItem, DimensionLayout, ExcavationBasis, FormulaShape, GroupingStrategy, ItemType,
    ParsedDimensions, RawRow,
};
pub use types::{Column, Discipline, RowKind, Unit};
pub use workbook::{Cell, CellValue, OutputRow, RowScope, Sheet, Workbook};
