// ==========================================
// 施工算量清单编译器 - 公式合成
// ==========================================
// 职责: 按公式形态生成明细行与汇总行的符号公式
// 红线: 不适用的列不出现（不是 0）;解析未命中的派生列留空
// 红线: 明细公式只引用本行;汇总公式只引用本组成员段
// ==========================================

use crate::config::EstimateConfig;
use crate::domain::formula::{Expr, RowRange, RowSlot};
use crate::domain::group::SumRowSpec;
use crate::domain::takeoff::{ClassifiedItem, ExcavationBasis, FormulaShape};
use crate::domain::types::Column;
use crate::domain::workbook::Cell;
use std::collections::BTreeMap;

/// 符号公式（行引用尚未绑定）
pub type SlotExpr = Expr<RowSlot>;

// ==========================================
// FormulaSynthesizer - 公式合成器
// ==========================================
#[derive(Debug, Clone)]
pub struct FormulaSynthesizer {
    cubic_feet_per_yard: f64,
    swell_factor: f64,
}

fn here(column: Column) -> SlotExpr {
    Expr::cell(column, RowSlot::Current)
}

impl FormulaSynthesizer {
    pub fn new(config: &EstimateConfig) -> Self {
        Self {
            cubic_feet_per_yard: config.cubic_feet_per_yard,
            swell_factor: config.swell_factor,
        }
    }

    fn per_yard(&self, expr: SlotExpr) -> SlotExpr {
        expr.div(Expr::literal(self.cubic_feet_per_yard))
    }

    /// 明细行的派生列公式
    ///
    /// # 返回
    /// - 列 → 符号公式;只包含该行实际产出的派生列
    pub fn item_formulas(&self, item: &ClassifiedItem) -> BTreeMap<Column, SlotExpr> {
        let takeoff = || here(Column::Takeoff);
        let weight_per_ft = item.parsed.weight.unwrap_or(0.0);
        let mut all: Vec<(Column, SlotExpr)> = Vec::new();

        match item.shape() {
            FormulaShape::AreaOnly => all.push((Column::Area, takeoff())),
            FormulaShape::AreaVolume => {
                all.push((Column::Area, takeoff()));
                all.push((
                    Column::Volume,
                    self.per_yard(here(Column::Area).mul(here(Column::Height))),
                ));
            }
            FormulaShape::LinearOnly => all.push((Column::LinearFeet, takeoff())),
            FormulaShape::LinearArea => {
                all.push((Column::LinearFeet, takeoff()));
                all.push((
                    Column::Area,
                    here(Column::LinearFeet).mul(here(Column::Height)),
                ));
            }
            FormulaShape::LinearAreaVolume => {
                all.push((Column::LinearFeet, takeoff()));
                all.push((
                    Column::Area,
                    here(Column::LinearFeet).mul(here(Column::Height)),
                ));
                all.push((
                    Column::Volume,
                    self.per_yard(here(Column::Area).mul(here(Column::Width))),
                ));
            }
            FormulaShape::LinearFooting => {
                all.push((Column::LinearFeet, takeoff()));
                all.push((Column::Area, takeoff().mul(here(Column::Width))));
                all.push((
                    Column::Volume,
                    self.per_yard(here(Column::Area).mul(here(Column::Height))),
                ));
            }
            FormulaShape::BoxVolume => {
                all.push((
                    Column::Area,
                    takeoff()
                        .mul(here(Column::Length))
                        .mul(here(Column::Width)),
                ));
                all.push((
                    Column::Volume,
                    self.per_yard(here(Column::Area).mul(here(Column::Height))),
                ));
                all.push((Column::FinalQuantity, takeoff()));
            }
            FormulaShape::CountOnly => all.push((Column::FinalQuantity, takeoff())),
            FormulaShape::CountLength => {
                all.push((Column::LinearFeet, takeoff().mul(here(Column::Length))));
                all.push((Column::FinalQuantity, takeoff()));
            }
            FormulaShape::LinearWeight => {
                all.push((Column::LinearFeet, takeoff()));
                all.push((
                    Column::Weight,
                    here(Column::LinearFeet).mul(Expr::literal(weight_per_ft)),
                ));
            }
            FormulaShape::Pile => {
                all.push((Column::LinearFeet, takeoff().mul(here(Column::Height))));
                all.push((
                    Column::Weight,
                    here(Column::LinearFeet).mul(Expr::literal(weight_per_ft)),
                ));
                all.push((Column::FinalQuantity, takeoff()));
            }
            FormulaShape::Excavation { basis, swell } => {
                match basis {
                    ExcavationBasis::Area => all.push((Column::Area, takeoff())),
                    ExcavationBasis::Linear => {
                        all.push((Column::LinearFeet, takeoff()));
                        all.push((
                            Column::Area,
                            here(Column::LinearFeet).mul(here(Column::Width)),
                        ));
                    }
                    ExcavationBasis::Box => {
                        all.push((
                            Column::Area,
                            takeoff()
                                .mul(here(Column::Length))
                                .mul(here(Column::Width)),
                        ));
                        all.push((Column::FinalQuantity, takeoff()));
                    }
                }
                let bank = self.per_yard(here(Column::Area).mul(here(Column::Height)));
                if swell {
                    all.push((Column::Weight, bank));
                    all.push((
                        Column::Volume,
                        here(Column::Weight).mul(Expr::literal(self.swell_factor)),
                    ));
                } else {
                    all.push((Column::Volume, bank));
                }
            }
        }

        let produced = item.derived_columns();
        all.into_iter()
            .filter(|(column, _)| produced.contains(column))
            .collect()
    }

    /// 明细行的取值单元格（描述 / 数量 / 单位 / 尺寸）
    ///
    /// 尺寸列在布局声明或被公式引用且已解析时输出
    pub fn item_values(
        &self,
        item: &ClassifiedItem,
        formulas: &BTreeMap<Column, SlotExpr>,
    ) -> BTreeMap<Column, Cell> {
        let mut cells = BTreeMap::new();
        cells.insert(Column::Description, Cell::text(&item.raw.description));
        cells.insert(Column::Takeoff, Cell::number(item.raw.quantity));
        if !item.raw.unit.is_none() {
            cells.insert(Column::Unit, Cell::text(&item.raw.unit.to_string()));
        }

        let dims = [
            (Column::Length, item.parsed.length),
            (Column::Width, item.parsed.width),
            (Column::Height, item.parsed.effective_height()),
        ];
        let layout_columns = item.item_type.layout.value_columns();
        for (column, value) in dims {
            let Some(value) = value else {
                continue;
            };
            let referenced = formulas.values().any(|f| f.references_column(column));
            if layout_columns.contains(&column) || referenced {
                cells.insert(column, Cell::number(value));
            }
        }
        cells
    }

    /// 汇总行公式: 每个派生列对各成员段求和
    ///
    /// 松方汇总的体积 = 自然方合计 x 松方系数（不对单行体积求和）
    pub fn sum_formulas(&self, spec: &SumRowSpec) -> BTreeMap<Column, SlotExpr> {
        let ranges: Vec<RowRange<RowSlot>> = (0..spec.segments.len())
            .map(|i| RowRange::new(RowSlot::SegmentFirst(i), RowSlot::SegmentLast(i)))
            .collect();

        spec.columns
            .iter()
            .map(|&column| {
                let expr = if spec.swell
                    && column == Column::Volume
                    && spec.columns.contains(&Column::Weight)
                {
                    Expr::sum(Column::Weight, ranges.clone()).mul(Expr::literal(self.swell_factor))
                } else {
                    Expr::sum(column, ranges.clone())
                };
                (column, expr)
            })
            .collect()
    }
}
