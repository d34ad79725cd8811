// ==========================================
// 施工算量清单编译器 - 工作簿输出模型
// ==========================================
// 职责: 单元格 / 输出行 / 工作表 / 工作簿
// 红线: 工作簿对外只读;公式对渲染方是不透明的 (列, 行号) 表达式
// ==========================================

use crate::domain::formula::{Expr, RowNumber};
use crate::domain::types::{Column, Discipline, RowKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// 单元格
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(t) => Some(t.as_str()),
            CellValue::Number(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cell {
    Value {
        value: CellValue,
    },
    Formula {
        /// A1 文本（含 '='）
        formula: String,
        expr: Expr,
        /// 同表引用行号（升序去重）
        referenced_rows: Vec<RowNumber>,
    },
}

impl Cell {
    pub fn number(value: f64) -> Self {
        Cell::Value {
            value: CellValue::Number(value),
        }
    }

    pub fn text(value: &str) -> Self {
        Cell::Value {
            value: CellValue::Text(value.to_string()),
        }
    }

    pub fn formula(expr: Expr) -> Self {
        Cell::Formula {
            formula: expr.to_a1(),
            referenced_rows: expr.referenced_rows(),
            expr,
        }
    }

    pub fn expr(&self) -> Option<&Expr> {
        match self {
            Cell::Formula { expr, .. } => Some(expr),
            Cell::Value { .. } => None,
        }
    }

    pub fn formula_text(&self) -> Option<&str> {
        match self {
            Cell::Formula { formula, .. } => Some(formula.as_str()),
            Cell::Value { .. } => None,
        }
    }

    pub fn value(&self) -> Option<&CellValue> {
        match self {
            Cell::Value { value } => Some(value),
            Cell::Formula { .. } => None,
        }
    }
}

// ==========================================
// 行归属 (供汇总视图按子目回溯)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowScope {
    pub discipline: Discipline,
    pub subsection: Option<String>,
}

// ==========================================
// OutputRow - 输出行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    pub row_number: RowNumber,
    pub kind: RowKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<RowScope>,
    /// 原始行来源（仅明细行）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_index: Option<usize>,
    pub cells: BTreeMap<Column, Cell>,
}

impl OutputRow {
    pub fn new(row_number: RowNumber, kind: RowKind) -> Self {
        Self {
            row_number,
            kind,
            scope: None,
            source_index: None,
            cells: BTreeMap::new(),
        }
    }

    pub fn cell(&self, column: Column) -> Option<&Cell> {
        self.cells.get(&column)
    }

    pub fn description(&self) -> Option<&str> {
        self.cells
            .get(&Column::Description)
            .and_then(|c| c.value())
            .and_then(|v| v.as_text())
    }

    pub fn formula_text(&self, column: Column) -> Option<&str> {
        self.cells.get(&column).and_then(|c| c.formula_text())
    }
}

// ==========================================
// Sheet / Workbook
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<OutputRow>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: Vec::new(),
        }
    }

    /// 按行号取行（行号连续,从 1 起算）
    pub fn row(&self, row_number: RowNumber) -> Option<&OutputRow> {
        if row_number == 0 {
            return None;
        }
        self.rows
            .get(row_number as usize - 1)
            .filter(|r| r.row_number == row_number)
    }

    pub fn last_row_number(&self) -> RowNumber {
        self.rows.last().map(|r| r.row_number).unwrap_or(0)
    }

    pub fn rows_of_kind(&self, kind: RowKind) -> impl Iterator<Item = &OutputRow> {
        self.rows.iter().filter(move |r| r.kind == kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_cell_carries_references() {
        let cell = Cell::formula(Expr::cell(Column::Area, 7).mul(Expr::cell(Column::Height, 7)));
        match cell {
            Cell::Formula {
                formula,
                referenced_rows,
                ..
            } => {
                assert_eq!(formula, "=H7*F7");
                assert_eq!(referenced_rows, vec![7]);
            }
            _ => panic!("expected formula cell"),
        }
    }

    #[test]
    fn test_sheet_row_lookup() {
        let mut sheet = Sheet::new("Estimate");
        sheet.rows.push(OutputRow::new(1, RowKind::Header));
        sheet.rows.push(OutputRow::new(2, RowKind::Data));
        assert_eq!(sheet.row(2).map(|r| r.kind), Some(RowKind::Data));
        assert!(sheet.row(0).is_none());
        assert!(sheet.row(3).is_none());
        assert_eq!(sheet.last_row_number(), 2);
    }
}
