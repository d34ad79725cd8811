// ==========================================
// 施工算量清单编译器 - 算量领域对象
// ==========================================
// 职责: 原始算量行 / 解析尺寸 / 构件类型 / 已分类构件
// 红线: RawRow 创建后不可变,解析结果永不回写原始行
// ==========================================

use crate::domain::group::GroupKey;
use crate::domain::types::{Column, Discipline, Unit};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// RawRow - 原始算量行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// 自由文本描述,如 `SF (2'-0"x1'-0")`
    pub description: String,
    /// 图纸量取的数量 (Takeoff)
    pub quantity: f64,
    pub unit: Unit,
    /// 导入方提供的分类提示（工作表名/专业名）
    #[serde(default)]
    pub category: Option<String>,
    /// 导入来源行号,仅用于回溯与未使用行报告
    pub source_index: usize,
}

impl RawRow {
    pub fn new(description: &str, quantity: f64, unit: Unit, source_index: usize) -> Self {
        Self {
            description: description.to_string(),
            quantity,
            unit,
            category: None,
            source_index,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
}

// ==========================================
// ParsedDimensions - 解析尺寸
// ==========================================
// 单位: 英尺 / 磅每英尺
// 例外: 管桩外径 diameter 与壁厚 thickness 保持英寸（型材参数）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDimensions {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub diameter: Option<f64>,
    pub thickness: Option<f64>,
    pub embedment: Option<f64>,
    pub rock_socket: Option<f64>,
    pub weight: Option<f64>,
    /// 桩计算长度: 向上取整到 5 英尺
    pub calculated_height: Option<f64>,
    /// `@` 之后的文本
    pub at_label: Option<String>,
    /// 型钢规格,如 HP12X53
    pub section: Option<String>,
    /// 括号内的尺寸列表 `(L x W x H)`,按出现顺序
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bracket: Vec<f64>,
    /// 括号与标签之外的第一个尺寸,如 `SOG 6"`
    pub loose: Option<f64>,
}

impl ParsedDimensions {
    /// 构件行的"高度"列取值: 桩类优先使用计算长度
    pub fn effective_height(&self) -> Option<f64> {
        self.calculated_height.or(self.height)
    }

    pub fn has_length(&self) -> bool {
        self.length.is_some()
    }

    pub fn has_width(&self) -> bool {
        self.width.is_some()
    }

    pub fn has_height(&self) -> bool {
        self.effective_height().is_some()
    }

    pub fn has_weight(&self) -> bool {
        self.weight.is_some()
    }
}

// ==========================================
// 尺寸布局 (Dimension Layout)
// ==========================================
// 括号内尺寸的含义随构件类型变化:
// `SF (2'-0"x1'-0")` 是 宽x高; `PC (6'x6'x3')` 是 长x宽x高
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DimensionLayout {
    /// 不使用尺寸
    None,
    /// 单一厚度 → 高度（板厚、铺装厚）
    Thickness,
    /// 仅高度/深度 (H= / D= / 括号单值)
    HeightOnly,
    /// 括号 [宽, 高]
    WidthHeight,
    /// 括号 [长, 宽, 高]
    LengthWidthHeight,
    /// 长度标签 L=
    LengthTag,
    /// 钢管桩: Ø x 壁厚, H=, + RS
    PipePile,
    /// 型钢桩: HP/W 规格, H=, E=
    RolledSectionPile,
    /// 型钢线性构件: 仅规格重量
    RolledSection,
}

impl DimensionLayout {
    /// 括号内尺寸依次对应的列
    pub fn bracket_columns(&self) -> &'static [Column] {
        match self {
            DimensionLayout::Thickness | DimensionLayout::HeightOnly => &[Column::Height],
            DimensionLayout::WidthHeight => &[Column::Width, Column::Height],
            DimensionLayout::LengthWidthHeight => &[Column::Length, Column::Width, Column::Height],
            DimensionLayout::LengthTag => &[Column::Length],
            DimensionLayout::None
            | DimensionLayout::PipePile
            | DimensionLayout::RolledSectionPile
            | DimensionLayout::RolledSection => &[],
        }
    }

    /// 构件行输出的数值列
    pub fn value_columns(&self) -> &'static [Column] {
        match self {
            DimensionLayout::None | DimensionLayout::RolledSection => &[],
            DimensionLayout::Thickness | DimensionLayout::HeightOnly => &[Column::Height],
            DimensionLayout::WidthHeight => &[Column::Width, Column::Height],
            DimensionLayout::LengthWidthHeight => &[Column::Length, Column::Width, Column::Height],
            DimensionLayout::LengthTag => &[Column::Length],
            DimensionLayout::PipePile | DimensionLayout::RolledSectionPile => &[Column::Height],
        }
    }

    pub fn is_pile(&self) -> bool {
        matches!(
            self,
            DimensionLayout::PipePile | DimensionLayout::RolledSectionPile
        )
    }
}

// ==========================================
// 土方计算基准
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExcavationBasis {
    /// 面积 = Takeoff (SF)
    Area,
    /// 延长 = Takeoff, 面积 = 延长 x 宽
    Linear,
    /// 面积 = Takeoff x 长 x 宽, 数量 = Takeoff
    Box,
}

// ==========================================
// 公式形态 (Formula Shape)
// ==========================================
// 各专业全部构件类型的推导方式是以下形态的有限枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormulaShape {
    /// Area = Takeoff
    AreaOnly,
    /// Area = Takeoff; Volume = Area x Height / 27
    AreaVolume,
    /// LF = Takeoff
    LinearOnly,
    /// LF = Takeoff; Area = LF x Height
    LinearArea,
    /// LF = Takeoff; Area = LF x Height; Volume = Area x Width / 27
    LinearAreaVolume,
    /// LF = Takeoff; Area = Takeoff x Width; Volume = Area x Height / 27
    LinearFooting,
    /// Area = Takeoff x Length x Width; Volume = Area x Height / 27; QTY = Takeoff
    BoxVolume,
    /// QTY = Takeoff
    CountOnly,
    /// QTY = Takeoff; LF = Takeoff x Length
    CountLength,
    /// LF = Takeoff; Weight = LF x lbs/ft
    LinearWeight,
    /// QTY = Takeoff; LF = Takeoff x Height; Weight = LF x lbs/ft
    Pile,
    /// swell=true: Bank = Area x Height / 27 (I 列), Volume = Bank x 1.3
    /// swell=false: Volume = Area x Height / 27
    Excavation { basis: ExcavationBasis, swell: bool },
}

impl FormulaShape {
    /// 在给定解析结果下该形态实际产出的派生列
    ///
    /// 依赖尺寸缺失（解析未命中）的列不产出,保持空白;
    /// 只依赖 Takeoff 的列总是产出（Takeoff 为 0 时结果为 0）
    pub fn derived_columns(&self, parsed: &ParsedDimensions) -> Vec<Column> {
        let l = parsed.has_length();
        let w = parsed.has_width();
        let h = parsed.has_height();
        let mut cols = Vec::new();

        match self {
            FormulaShape::AreaOnly => cols.push(Column::Area),
            FormulaShape::AreaVolume => {
                cols.push(Column::Area);
                if h {
                    cols.push(Column::Volume);
                }
            }
            FormulaShape::LinearOnly => cols.push(Column::LinearFeet),
            FormulaShape::LinearArea => {
                cols.push(Column::LinearFeet);
                if h {
                    cols.push(Column::Area);
                }
            }
            FormulaShape::LinearAreaVolume => {
                cols.push(Column::LinearFeet);
                if h {
                    cols.push(Column::Area);
                    if w {
                        cols.push(Column::Volume);
                    }
                }
            }
            FormulaShape::LinearFooting => {
                cols.push(Column::LinearFeet);
                if w {
                    cols.push(Column::Area);
                    if h {
                        cols.push(Column::Volume);
                    }
                }
            }
            FormulaShape::BoxVolume => {
                if l && w {
                    cols.push(Column::Area);
                    if h {
                        cols.push(Column::Volume);
                    }
                }
                cols.push(Column::FinalQuantity);
            }
            FormulaShape::CountOnly => cols.push(Column::FinalQuantity),
            FormulaShape::CountLength => {
                if l {
                    cols.push(Column::LinearFeet);
                }
                cols.push(Column::FinalQuantity);
            }
            FormulaShape::LinearWeight => {
                cols.push(Column::LinearFeet);
                if parsed.has_weight() {
                    cols.push(Column::Weight);
                }
            }
            FormulaShape::Pile => {
                if h {
                    cols.push(Column::LinearFeet);
                    if parsed.has_weight() {
                        cols.push(Column::Weight);
                    }
                }
                cols.push(Column::FinalQuantity);
            }
            FormulaShape::Excavation { basis, swell } => {
                let has_area = match basis {
                    ExcavationBasis::Area => {
                        cols.push(Column::Area);
                        true
                    }
                    ExcavationBasis::Linear => {
                        cols.push(Column::LinearFeet);
                        if w {
                            cols.push(Column::Area);
                        }
                        w
                    }
                    ExcavationBasis::Box => {
                        if l && w {
                            cols.push(Column::Area);
                        }
                        l && w
                    }
                };
                if has_area && h {
                    if *swell {
                        cols.push(Column::Weight);
                    }
                    cols.push(Column::Volume);
                }
                if matches!(basis, ExcavationBasis::Box) {
                    cols.push(Column::FinalQuantity);
                }
            }
        }

        cols.sort();
        cols
    }

    /// 是否为松方系数调整的土方
    pub fn is_swell(&self) -> bool {
        matches!(self, FormulaShape::Excavation { swell: true, .. })
    }
}

// ==========================================
// 分组策略 (Grouping Strategy)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupingStrategy {
    /// 按解析尺寸（保留 2 位小数）+ 构件编码
    Dimension,
    /// 按 `@ Label` 文本（缺失时为 NO_AT）
    AtLabel,
    /// 按 高度 + 嵌岩段 组合键（钻孔桩）
    HeightRockSocket,
}

// ==========================================
// ItemType - 构件类型
// ==========================================
// 静态规则表中的一项元数据;同一子目内的构件类型必须共享公式形态
#[derive(Debug)]
pub struct ItemType {
    /// 稳定编码（snake_case）
    pub code: &'static str,
    /// 显示名称
    pub label: &'static str,
    pub discipline: Discipline,
    pub subsection: &'static str,
    pub shape: FormulaShape,
    pub layout: DimensionLayout,
    pub grouping: GroupingStrategy,
    /// 组合构件中的分部名（如楼梯的 Landings / Steps）
    pub part: Option<&'static str>,
}

impl PartialEq for ItemType {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for ItemType {}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

// ==========================================
// ClassifiedItem - 已分类构件
// ==========================================
#[derive(Debug, Clone)]
pub struct ClassifiedItem {
    pub item_type: &'static ItemType,
    /// 批次内位置（非 source_index）
    pub row_position: usize,
    pub parsed: ParsedDimensions,
    pub group_key: GroupKey,
    pub raw: RawRow,
    /// 由非占用镜像产生（土方对基础构件的只读视图）
    pub mirrored: bool,
}

impl ClassifiedItem {
    pub fn discipline(&self) -> Discipline {
        self.item_type.discipline
    }

    pub fn subsection(&self) -> &'static str {
        self.item_type.subsection
    }

    pub fn shape(&self) -> FormulaShape {
        self.item_type.shape
    }

    /// 该行实际产出的派生列
    pub fn derived_columns(&self) -> Vec<Column> {
        self.item_type.shape.derived_columns(&self.parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(l: Option<f64>, w: Option<f64>, h: Option<f64>) -> ParsedDimensions {
        ParsedDimensions {
            length: l,
            width: w,
            height: h,
            ..Default::default()
        }
    }

    #[test]
    fn test_linear_footing_columns_full() {
        let cols = FormulaShape::LinearFooting.derived_columns(&dims(None, Some(2.0), Some(1.0)));
        assert_eq!(cols, vec![Column::LinearFeet, Column::Area, Column::Volume]);
    }

    #[test]
    fn test_linear_footing_parse_miss_leaves_blank() {
        // 无宽度: 面积和体积都不产出
        let cols = FormulaShape::LinearFooting.derived_columns(&dims(None, None, Some(1.0)));
        assert_eq!(cols, vec![Column::LinearFeet]);
    }

    #[test]
    fn test_swell_excavation_columns() {
        let shape = FormulaShape::Excavation {
            basis: ExcavationBasis::Area,
            swell: true,
        };
        let cols = shape.derived_columns(&dims(None, None, Some(10.0)));
        assert_eq!(cols, vec![Column::Area, Column::Weight, Column::Volume]);
        assert!(shape.is_swell());
    }

    #[test]
    fn test_backfill_has_no_bank_column() {
        let shape = FormulaShape::Excavation {
            basis: ExcavationBasis::Area,
            swell: false,
        };
        let cols = shape.derived_columns(&dims(None, None, Some(10.0)));
        assert_eq!(cols, vec![Column::Area, Column::Volume]);
        assert!(!shape.is_swell());
    }

    #[test]
    fn test_pile_prefers_calculated_height() {
        let parsed = ParsedDimensions {
            height: Some(32.5),
            calculated_height: Some(40.0),
            weight: Some(52.9),
            ..Default::default()
        };
        assert_eq!(parsed.effective_height(), Some(40.0));
        let cols = FormulaShape::Pile.derived_columns(&parsed);
        assert_eq!(
            cols,
            vec![Column::LinearFeet, Column::Weight, Column::FinalQuantity]
        );
    }
}
