// ==========================================
// 施工算量清单编译器 - 工作簿预览求值
// ==========================================
// 职责: 对工作簿全部单元格求值（含跨表引用）,用于命令行合计与测试
// 红线: 只读工作簿;结果带缓存;检测循环引用
// 说明: 空单元格与文本按 0 参与运算;除零按 0 处理
// ==========================================

use crate::domain::formula::{Expr, RowNumber};
use crate::domain::types::Column;
use crate::domain::workbook::{Cell, CellValue, Workbook};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::{BTreeMap, BTreeSet};

type CellKey = (String, RowNumber, Column);

// ==========================================
// WorkbookEvaluator - 工作簿求值器
// ==========================================
pub struct WorkbookEvaluator<'a> {
    workbook: &'a Workbook,
    cache: BTreeMap<CellKey, f64>,
    in_progress: BTreeSet<CellKey>,
}

impl<'a> WorkbookEvaluator<'a> {
    pub fn new(workbook: &'a Workbook) -> Self {
        Self {
            workbook,
            cache: BTreeMap::new(),
            in_progress: BTreeSet::new(),
        }
    }

    /// 求单个单元格的数值
    ///
    /// # 返回
    /// - Ok(v): 数值;缺失单元格为 0
    /// - Err(UnknownSheet / CyclicReference)
    pub fn value(&mut self, sheet: &str, row: RowNumber, column: Column) -> EngineResult<f64> {
        let key: CellKey = (sheet.to_string(), row, column);
        if let Some(v) = self.cache.get(&key) {
            return Ok(*v);
        }

        let workbook: &'a Workbook = self.workbook;
        let target = workbook
            .sheet(sheet)
            .ok_or_else(|| EngineError::UnknownSheet(sheet.to_string()))?;
        let cell = target.row(row).and_then(|r| r.cell(column));

        let value = match cell {
            None => 0.0,
            Some(Cell::Value { value }) => match value {
                CellValue::Number(n) => *n,
                CellValue::Text(_) => 0.0,
            },
            Some(Cell::Formula { expr, .. }) => {
                if !self.in_progress.insert(key.clone()) {
                    return Err(EngineError::CyclicReference {
                        sheet: sheet.to_string(),
                        column,
                        row,
                    });
                }
                let result = self.eval(expr, sheet);
                self.in_progress.remove(&key);
                result?
            }
        };

        self.cache.insert(key, value);
        Ok(value)
    }

    fn eval(&mut self, expr: &Expr, current_sheet: &str) -> EngineResult<f64> {
        match expr {
            Expr::Literal { value } => Ok(*value),
            Expr::ColumnRef(cell) => {
                let sheet = cell.sheet.as_deref().unwrap_or(current_sheet);
                self.value(sheet, cell.row, cell.column)
            }
            Expr::Sum(sum) => {
                let sheet = sum.sheet.as_deref().unwrap_or(current_sheet);
                let mut total = 0.0;
                for range in &sum.ranges {
                    for row in range.first..=range.last {
                        total += self.value(sheet, row, sum.column)?;
                    }
                }
                Ok(total)
            }
            Expr::Binary { op, lhs, rhs } => {
                let l = self.eval(lhs, current_sheet)?;
                let r = self.eval(rhs, current_sheet)?;
                Ok(op.apply(l, r))
            }
        }
    }

    /// 某行全部非文本单元格的数值
    pub fn row_values(
        &mut self,
        sheet: &str,
        row: RowNumber,
    ) -> EngineResult<BTreeMap<Column, f64>> {
        let target = self
            .workbook
            .sheet(sheet)
            .ok_or_else(|| EngineError::UnknownSheet(sheet.to_string()))?;
        let columns: Vec<Column> = target
            .row(row)
            .map(|r| {
                r.cells
                    .iter()
                    .filter(|(_, c)| !matches!(c.value(), Some(CellValue::Text(_))))
                    .map(|(column, _)| *column)
                    .collect()
            })
            .unwrap_or_default();

        let mut values = BTreeMap::new();
        for column in columns {
            values.insert(column, self.value(sheet, row, column)?);
        }
        Ok(values)
    }

    /// 对整张工作表全部公式求值（用于一次性检查可求值性）
    pub fn evaluate_sheet(&mut self, sheet: &str) -> EngineResult<usize> {
        let target = self
            .workbook
            .sheet(sheet)
            .ok_or_else(|| EngineError::UnknownSheet(sheet.to_string()))?;
        let cells: Vec<(RowNumber, Column)> = target
            .rows
            .iter()
            .flat_map(|r| {
                r.cells
                    .iter()
                    .filter(|(_, c)| c.expr().is_some())
                    .map(move |(column, _)| (r.row_number, *column))
            })
            .collect();

        for (row, column) in &cells {
            self.value(sheet, *row, *column)?;
        }
        Ok(cells.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::formula::RowRange;
    use crate::domain::types::RowKind;
    use crate::domain::workbook::{OutputRow, Sheet};

    fn workbook() -> Workbook {
        let mut detail = Sheet::new("Estimate");
        for n in 1..=2 {
            let mut row = OutputRow::new(n, RowKind::Data);
            row.cells.insert(Column::Takeoff, Cell::number(10.0 * n as f64));
            row.cells.insert(Column::Width, Cell::number(2.0));
            row.cells.insert(
                Column::Area,
                Cell::formula(Expr::cell(Column::Takeoff, n).mul(Expr::cell(Column::Width, n))),
            );
            detail.rows.push(row);
        }
        let mut sum = OutputRow::new(3, RowKind::Sum);
        sum.cells.insert(
            Column::Area,
            Cell::formula(Expr::sum(Column::Area, vec![RowRange::new(1, 2)])),
        );
        detail.rows.push(sum);

        let mut summary = Sheet::new("Summary");
        let mut row = OutputRow::new(1, RowKind::Sum);
        row.cells.insert(
            Column::Area,
            Cell::formula(Expr::sheet_cell("Estimate", Column::Area, 3)),
        );
        summary.rows.push(row);

        Workbook {
            sheets: vec![detail, summary],
        }
    }

    #[test]
    fn test_evaluate_sum_and_cross_sheet() {
        let wb = workbook();
        let mut eval = WorkbookEvaluator::new(&wb);
        assert_eq!(eval.value("Estimate", 1, Column::Area).unwrap(), 20.0);
        assert_eq!(eval.value("Estimate", 3, Column::Area).unwrap(), 60.0);
        assert_eq!(eval.value("Summary", 1, Column::Area).unwrap(), 60.0);
        assert_eq!(eval.value("Estimate", 3, Column::Volume).unwrap(), 0.0);
        assert_eq!(eval.evaluate_sheet("Estimate").unwrap(), 3);
    }

    #[test]
    fn test_detects_cycle() {
        let mut sheet = Sheet::new("Estimate");
        let mut row = OutputRow::new(1, RowKind::Sum);
        row.cells
            .insert(Column::Area, Cell::formula(Expr::cell(Column::Volume, 1)));
        row.cells
            .insert(Column::Volume, Cell::formula(Expr::cell(Column::Area, 1)));
        sheet.rows.push(row);
        let wb = Workbook {
            sheets: vec![sheet],
        };
        let err = WorkbookEvaluator::new(&wb)
            .value("Estimate", 1, Column::Area)
            .unwrap_err();
        assert!(matches!(err, EngineError::CyclicReference { .. }));
    }

    #[test]
    fn test_unknown_sheet() {
        let wb = workbook();
        let err = WorkbookEvaluator::new(&wb)
            .value("Nope", 1, Column::Area)
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownSheet("Nope".to_string()));
    }
}
