// ==========================================
// 施工算量清单编译器 - 汇总视图
// ==========================================
// 职责: 从已构建的明细表派生面向客户的汇总表
// 红线: 只通过跨表公式引用明细表的汇总行,绝不重新计算数值
// ==========================================

use crate::config::EstimateConfig;
use crate::domain::formula::{Expr, RowNumber, RowRange};
use crate::domain::types::{Column, Discipline, RowKind};
use crate::domain::workbook::{Cell, OutputRow, RowScope, Sheet};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// 汇总表输出的列
const SUMMARY_COLUMNS: [Column; 6] = [
    Column::Description,
    Column::LinearFeet,
    Column::Area,
    Column::Weight,
    Column::Volume,
    Column::FinalQuantity,
];

// ==========================================
// SummaryBuilder - 汇总表构建器
// ==========================================
pub struct SummaryBuilder<'a> {
    config: &'a EstimateConfig,
}

impl<'a> SummaryBuilder<'a> {
    pub fn new(config: &'a EstimateConfig) -> Self {
        Self { config }
    }

    /// 基于明细表构建汇总表
    ///
    /// # 返回
    /// - 每个子目一行,各派生列 = 明细表该子目全部汇总行之和;
    ///   基础专业额外一行引用明细表标题行的体积合计
    #[instrument(skip(self, detail), fields(detail = %detail.name))]
    pub fn build(&self, detail: &Sheet) -> EngineResult<Sheet> {
        if detail.name == self.config.summary_sheet_name {
            return Err(EngineError::InvariantViolation(format!(
                "汇总表与明细表同名: {}",
                detail.name
            )));
        }

        let mut sheet = Sheet::new(&self.config.summary_sheet_name);
        let push = |sheet: &mut Sheet, mut row: OutputRow| {
            row.row_number = sheet.rows.len() as RowNumber + 1;
            sheet.rows.push(row);
        };

        let mut titles = OutputRow::new(0, RowKind::Header);
        for column in SUMMARY_COLUMNS {
            titles.cells.insert(column, Cell::text(column.title()));
        }
        push(&mut sheet, titles);

        for discipline in Discipline::SECTION_ORDER {
            let Some(header) = detail.rows.iter().find(|r| {
                r.kind == RowKind::Header
                    && r.scope
                        .as_ref()
                        .is_some_and(|s| s.discipline == discipline && s.subsection.is_none())
            }) else {
                continue;
            };

            let mut section = OutputRow::new(0, RowKind::Header);
            section.scope = Some(RowScope {
                discipline,
                subsection: None,
            });
            section
                .cells
                .insert(Column::Description, Cell::text(discipline.title()));
            push(&mut sheet, section);

            for (subsection, sum_rows) in Self::subsection_sums(detail, discipline) {
                let mut row = OutputRow::new(0, RowKind::Sum);
                row.scope = Some(RowScope {
                    discipline,
                    subsection: Some(subsection.clone()),
                });
                row.cells
                    .insert(Column::Description, Cell::text(&subsection));

                for column in Column::DERIVED {
                    let ranges: Vec<RowRange<RowNumber>> = sum_rows
                        .iter()
                        .filter(|r| r.cells.contains_key(&column))
                        .map(|r| RowRange::single(r.row_number))
                        .collect();
                    if !ranges.is_empty() {
                        row.cells.insert(
                            column,
                            Cell::formula(Expr::sheet_sum(&detail.name, column, ranges)),
                        );
                    }
                }
                push(&mut sheet, row);
            }

            if discipline == Discipline::Foundation && header.cells.contains_key(&Column::Volume) {
                let mut total = OutputRow::new(0, RowKind::Sum);
                total.scope = Some(RowScope {
                    discipline,
                    subsection: None,
                });
                total.cells.insert(
                    Column::Description,
                    Cell::text(&format!("Total {}", discipline.title())),
                );
                total.cells.insert(
                    Column::Volume,
                    Cell::formula(Expr::sheet_cell(
                        &detail.name,
                        Column::Volume,
                        header.row_number,
                    )),
                );
                push(&mut sheet, total);
            }
        }

        info!(rows = sheet.rows.len(), "汇总表构建完成");
        Ok(sheet)
    }

    /// 某专业的汇总行,按子目首次出现顺序归并
    fn subsection_sums(detail: &Sheet, discipline: Discipline) -> Vec<(String, Vec<&OutputRow>)> {
        let mut order: Vec<String> = Vec::new();
        let mut by_subsection: BTreeMap<String, Vec<&OutputRow>> = BTreeMap::new();

        for row in detail.rows_of_kind(RowKind::Sum) {
            let Some(scope) = &row.scope else {
                continue;
            };
            if scope.discipline != discipline {
                continue;
            }
            let Some(subsection) = &scope.subsection else {
                continue;
            };
            if !by_subsection.contains_key(subsection) {
                order.push(subsection.clone());
            }
            by_subsection.entry(subsection.clone()).or_default().push(row);
        }

        order
            .into_iter()
            .filter_map(|s| by_subsection.remove(&s).map(|rows| (s, rows)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail() -> Sheet {
        let mut sheet = Sheet::new("Estimate");
        let mut header = OutputRow::new(1, RowKind::Header);
        header.scope = Some(RowScope {
            discipline: Discipline::Foundation,
            subsection: None,
        });
        header.cells.insert(
            Column::Volume,
            Cell::formula(Expr::sum(Column::Volume, vec![RowRange::single(4)])),
        );
        sheet.rows.push(header);

        for n in 2..=3 {
            let mut row = OutputRow::new(n, RowKind::Data);
            row.scope = Some(RowScope {
                discipline: Discipline::Foundation,
                subsection: Some("Strip footings".to_string()),
            });
            row.cells.insert(Column::Volume, Cell::number(1.0));
            sheet.rows.push(row);
        }

        let mut sum = OutputRow::new(4, RowKind::Sum);
        sum.scope = Some(RowScope {
            discipline: Discipline::Foundation,
            subsection: Some("Strip footings".to_string()),
        });
        sum.cells.insert(
            Column::Volume,
            Cell::formula(Expr::sum(Column::Volume, vec![RowRange::new(2, 3)])),
        );
        sheet.rows.push(sum);
        sheet
    }

    #[test]
    fn test_summary_references_detail_sum_rows() {
        let config = EstimateConfig::default();
        let summary = SummaryBuilder::new(&config).build(&detail()).unwrap();
        assert_eq!(summary.name, "Summary");

        let strip = summary
            .rows
            .iter()
            .find(|r| r.description() == Some("Strip footings"))
            .unwrap();
        assert_eq!(
            strip.formula_text(Column::Volume),
            Some("=SUM('Estimate'!J4)")
        );

        let total = summary
            .rows
            .iter()
            .find(|r| r.description() == Some("Total Foundation"))
            .unwrap();
        assert_eq!(total.formula_text(Column::Volume), Some("='Estimate'!J1"));
    }

    #[test]
    fn test_summary_rows_are_numbered_consecutively() {
        let config = EstimateConfig::default();
        let summary = SummaryBuilder::new(&config).build(&detail()).unwrap();
        for (i, row) in summary.rows.iter().enumerate() {
            assert_eq!(row.row_number as usize, i + 1);
        }
    }
}
