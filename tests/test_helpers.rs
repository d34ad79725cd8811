// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 原始行构造 / 流水线运行 / 工作簿查找与求值
// ==========================================

#![allow(dead_code)]

use takeoff_estimator::domain::formula::RowNumber;
use takeoff_estimator::domain::types::{Column, Discipline, RowKind, Unit};
use takeoff_estimator::domain::workbook::{OutputRow, Sheet};
use takeoff_estimator::{logging, EstimateConfig, EstimatePipeline, EstimateResult, RawRow, WorkbookEvaluator};

/// 按顺序编号的原始行构造器
#[derive(Default)]
pub struct RowBuilder {
    rows: Vec<RawRow>,
}

impl RowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, description: &str, quantity: f64, unit: Unit) -> Self {
        let index = self.rows.len() + 1;
        self.rows.push(RawRow::new(description, quantity, unit, index));
        self
    }

    pub fn add_with_category(
        mut self,
        description: &str,
        quantity: f64,
        unit: Unit,
        category: &str,
    ) -> Self {
        let index = self.rows.len() + 1;
        self.rows
            .push(RawRow::new(description, quantity, unit, index).with_category(category));
        self
    }

    pub fn build(self) -> Vec<RawRow> {
        self.rows
    }
}

/// 使用缺省配置运行流水线
pub fn run(rows: &[RawRow]) -> EstimateResult {
    run_with(EstimateConfig::default(), rows)
}

pub fn run_with(config: EstimateConfig, rows: &[RawRow]) -> EstimateResult {
    logging::init_test();
    EstimatePipeline::new(config)
        .run(rows)
        .expect("pipeline should succeed")
}

pub fn detail(result: &EstimateResult) -> &Sheet {
    &result.workbook.sheets[0]
}

pub fn summary(result: &EstimateResult) -> &Sheet {
    &result.workbook.sheets[1]
}

/// 某专业某子目下的全部行
pub fn rows_in<'a>(sheet: &'a Sheet, discipline: Discipline, subsection: &str) -> Vec<&'a OutputRow> {
    sheet
        .rows
        .iter()
        .filter(|r| {
            r.scope.as_ref().is_some_and(|s| {
                s.discipline == discipline && s.subsection.as_deref() == Some(subsection)
            })
        })
        .collect()
}

pub fn data_rows_in<'a>(
    sheet: &'a Sheet,
    discipline: Discipline,
    subsection: &str,
) -> Vec<&'a OutputRow> {
    rows_in(sheet, discipline, subsection)
        .into_iter()
        .filter(|r| r.kind == RowKind::Data)
        .collect()
}

pub fn sum_rows_in<'a>(
    sheet: &'a Sheet,
    discipline: Discipline,
    subsection: &str,
) -> Vec<&'a OutputRow> {
    rows_in(sheet, discipline, subsection)
        .into_iter()
        .filter(|r| r.kind == RowKind::Sum)
        .collect()
}

/// 专业标题行
pub fn section_header(sheet: &Sheet, discipline: Discipline) -> Option<&OutputRow> {
    sheet.rows.iter().find(|r| {
        r.kind == RowKind::Header
            && r.scope
                .as_ref()
                .is_some_and(|s| s.discipline == discipline && s.subsection.is_none())
    })
}

/// 求单元格数值
pub fn value(result: &EstimateResult, sheet: &str, row: RowNumber, column: Column) -> f64 {
    WorkbookEvaluator::new(&result.workbook)
        .value(sheet, row, column)
        .expect("cell should evaluate")
}

pub fn approx(actual: f64, expected: f64, tolerance: f64) -> bool {
    (actual - expected).abs() <= tolerance
}
