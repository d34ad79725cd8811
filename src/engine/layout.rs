// ==========================================
// 施工算量清单编译器 - 工作簿布局
// ==========================================
// 职责: 分配最终行号 / 绑定符号公式 / 延迟写入 / 引用校验
// 流程: 第一遍排行号 → 第二遍绑定公式 → 刷新延迟队列 → 校验
// 红线: 明细公式只引用本行;汇总公式只引用更早的行
// 红线: 前向引用只允许出现在延迟写入的单元格上（基础专业标题合计）
// ==========================================

use crate::config::EstimateConfig;
use crate::domain::formula::{Expr, RowNumber, RowRange, RowSlot};
use crate::domain::group::{DisciplineBlocks, Group, SubsectionBlock};
use crate::domain::takeoff::ClassifiedItem;
use crate::domain::types::{Column, Discipline, RowKind};
use crate::domain::workbook::{Cell, OutputRow, RowScope, Sheet, Workbook};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::synthesis::{FormulaSynthesizer, SlotExpr};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

/// 延迟写入的单元格坐标 (行, 列)
pub type DeferredCells = BTreeSet<(RowNumber, Column)>;

// ==========================================
// 第一遍: 行计划
// ==========================================
enum PlannedRow<'g> {
    ColumnTitles,
    Section(Discipline),
    Subsection(&'g SubsectionBlock),
    PartLabel {
        block: &'g SubsectionBlock,
        label: &'static str,
    },
    Item {
        block: &'g SubsectionBlock,
        item: &'g ClassifiedItem,
    },
    Sum {
        block: &'g SubsectionBlock,
        group: &'g Group,
        /// 每段成员的 (首行, 末行)
        segment_rows: Vec<(RowNumber, RowNumber)>,
    },
}

struct RowPlan<'g> {
    rows: Vec<PlannedRow<'g>>,
}

impl<'g> RowPlan<'g> {
    fn next_row(&self) -> RowNumber {
        self.rows.len() as RowNumber + 1
    }

    fn push(&mut self, row: PlannedRow<'g>) -> RowNumber {
        let number = self.next_row();
        self.rows.push(row);
        number
    }
}

// ==========================================
// 延迟写入队列
// ==========================================
// 仅用于基础专业标题行的体积合计: 该合计引用其后的全部基础汇总行
struct DeferredWrite {
    row: RowNumber,
    column: Column,
    expr: Expr,
}

#[derive(Default)]
struct DeferredQueue {
    pending: Vec<DeferredWrite>,
}

impl DeferredQueue {
    fn push(&mut self, row: RowNumber, column: Column, expr: Expr) {
        self.pending.push(DeferredWrite { row, column, expr });
    }

    /// 每张工作表刷新一次;返回写入过的单元格
    fn flush(self, sheet: &mut Sheet) -> EngineResult<DeferredCells> {
        let mut written = DeferredCells::new();
        for write in self.pending {
            let row = sheet
                .rows
                .get_mut(write.row as usize - 1)
                .filter(|r| r.row_number == write.row)
                .ok_or_else(|| {
                    EngineError::InvariantViolation(format!(
                        "延迟写入目标行 {} 不存在",
                        write.row
                    ))
                })?;
            row.cells.insert(write.column, Cell::formula(write.expr));
            written.insert((write.row, write.column));
        }
        Ok(written)
    }
}

// ==========================================
// LayoutBuilder - 明细表布局
// ==========================================
pub struct LayoutBuilder<'a> {
    config: &'a EstimateConfig,
    synthesizer: FormulaSynthesizer,
}

/// 明细表布局结果
#[derive(Debug)]
pub struct DetailLayout {
    pub sheet: Sheet,
    pub deferred: DeferredCells,
}

impl<'a> LayoutBuilder<'a> {
    pub fn new(config: &'a EstimateConfig) -> Self {
        Self {
            config,
            synthesizer: FormulaSynthesizer::new(config),
        }
    }

    /// 构建明细工作表
    ///
    /// # 参数
    /// - sections: 各专业分组结果（任意顺序,按固定分段顺序输出）
    ///
    /// # 返回
    /// - 已绑定并通过本表引用校验的明细表 + 延迟写入的单元格
    #[instrument(skip(self, sections), fields(sheet = %self.config.detail_sheet_name))]
    pub fn build_detail(&self, sections: &[DisciplineBlocks]) -> EngineResult<DetailLayout> {
        let plan = self.plan(sections)?;
        let mut sheet = Sheet::new(&self.config.detail_sheet_name);
        let mut queue = DeferredQueue::default();
        let mut foundation_header: Option<RowNumber> = None;

        // 第二遍: 绑定
        for (index, planned) in plan.rows.iter().enumerate() {
            let row_number = index as RowNumber + 1;
            let row = self.bind_row(row_number, planned)?;
            if let PlannedRow::Section(Discipline::Foundation) = planned {
                foundation_header = Some(row_number);
            }
            sheet.rows.push(row);
        }

        if let Some(header) = foundation_header {
            let totals: Vec<RowRange<RowNumber>> = sheet
                .rows
                .iter()
                .filter(|r| {
                    r.kind == RowKind::Sum
                        && r.scope.as_ref().map(|s| s.discipline) == Some(Discipline::Foundation)
                        && r.cells.contains_key(&Column::Volume)
                })
                .map(|r| RowRange::single(r.row_number))
                .collect();
            if !totals.is_empty() {
                queue.push(header, Column::Volume, Expr::sum(Column::Volume, totals));
            }
        }

        let deferred = queue.flush(&mut sheet)?;
        validate_sheet(&sheet, &[], &deferred)?;

        info!(
            rows = sheet.rows.len(),
            deferred = deferred.len(),
            "明细表布局完成"
        );
        Ok(DetailLayout { sheet, deferred })
    }

    /// 第一遍: 按固定分段顺序排出全部行
    fn plan<'g>(&self, sections: &'g [DisciplineBlocks]) -> EngineResult<RowPlan<'g>> {
        let mut plan = RowPlan { rows: Vec::new() };
        plan.push(PlannedRow::ColumnTitles);

        for discipline in Discipline::SECTION_ORDER {
            let section = sections.iter().find(|s| s.discipline == discipline);
            let is_empty = section.map_or(true, |s| s.is_empty());
            if is_empty && !self.config.emit_empty_sections {
                continue;
            }
            plan.push(PlannedRow::Section(discipline));

            let Some(section) = section else {
                continue;
            };
            for block in &section.blocks {
                if block.groups.is_empty() {
                    continue;
                }
                plan.push(PlannedRow::Subsection(block));
                for group in &block.groups {
                    let mut segment_rows = Vec::with_capacity(group.sum_spec.segments.len());
                    for segment in &group.sum_spec.segments {
                        if segment.is_empty() || segment.end > group.members.len() {
                            return Err(EngineError::InvariantViolation(format!(
                                "分组 {} 的成员段 [{}, {}) 非法",
                                group.key, segment.start, segment.end
                            )));
                        }
                        if let Some(label) = segment.label {
                            plan.push(PlannedRow::PartLabel { block, label });
                        }
                        let first = plan.next_row();
                        for item in &group.members[segment.start..segment.end] {
                            plan.push(PlannedRow::Item { block, item });
                        }
                        segment_rows.push((first, plan.next_row() - 1));
                    }
                    let sum_row = plan.push(PlannedRow::Sum {
                        block,
                        group,
                        segment_rows,
                    });
                    debug!(
                        subsection = block.subsection,
                        key = %group.key,
                        sum_row,
                        members = group.members.len(),
                        "汇总行就位"
                    );
                }
            }
        }

        Ok(plan)
    }

    fn bind_row(&self, row_number: RowNumber, planned: &PlannedRow<'_>) -> EngineResult<OutputRow> {
        let row = match planned {
            PlannedRow::ColumnTitles => {
                let mut row = OutputRow::new(row_number, RowKind::Header);
                for column in Column::ALL {
                    row.cells.insert(column, Cell::text(column.title()));
                }
                row
            }
            PlannedRow::Section(discipline) => {
                let mut row = OutputRow::new(row_number, RowKind::Header);
                row.scope = Some(scope(*discipline, None));
                row.cells
                    .insert(Column::Description, Cell::text(discipline.title()));
                row
            }
            PlannedRow::Subsection(block) => {
                let mut row = OutputRow::new(row_number, RowKind::SubsectionHeader);
                row.scope = Some(scope(block.discipline, Some(block.subsection)));
                row.cells
                    .insert(Column::Description, Cell::text(block.subsection));
                row
            }
            PlannedRow::PartLabel { block, label } => {
                let mut row = OutputRow::new(row_number, RowKind::SubsectionHeader);
                row.scope = Some(scope(block.discipline, Some(block.subsection)));
                row.cells.insert(Column::Description, Cell::text(label));
                row
            }
            PlannedRow::Item { block, item } => {
                let formulas = self.synthesizer.item_formulas(item);
                let mut row = OutputRow::new(row_number, RowKind::Data);
                row.scope = Some(scope(block.discipline, Some(block.subsection)));
                row.source_index = Some(item.raw.source_index);
                row.cells = self.synthesizer.item_values(item, &formulas);
                for (column, template) in &formulas {
                    let expr = bind(template, |slot| match slot {
                        RowSlot::Current => Some(row_number),
                        _ => None,
                    })?;
                    row.cells.insert(*column, Cell::formula(expr));
                }
                row
            }
            PlannedRow::Sum {
                block,
                group,
                segment_rows,
            } => {
                let mut row = OutputRow::new(row_number, RowKind::Sum);
                row.scope = Some(scope(block.discipline, Some(block.subsection)));
                row.cells
                    .insert(Column::Description, Cell::text(&group.sum_label()));
                for (column, template) in self.synthesizer.sum_formulas(&group.sum_spec) {
                    let expr = bind(&template, |slot| match slot {
                        RowSlot::SegmentFirst(i) => segment_rows.get(i).map(|r| r.0),
                        RowSlot::SegmentLast(i) => segment_rows.get(i).map(|r| r.1),
                        RowSlot::Current => None,
                    })?;
                    row.cells.insert(column, Cell::formula(expr));
                }
                row
            }
        };
        Ok(row)
    }
}

fn scope(discipline: Discipline, subsection: Option<&str>) -> RowScope {
    RowScope {
        discipline,
        subsection: subsection.map(str::to_string),
    }
}

/// 将符号行位置绑定为行号;无法绑定的位置视为内部错误
fn bind<F>(template: &SlotExpr, mut resolve: F) -> EngineResult<Expr>
where
    F: FnMut(RowSlot) -> Option<RowNumber>,
{
    template.try_map_rows(&mut |slot| {
        resolve(slot).ok_or_else(|| {
            EngineError::InvariantViolation(format!("符号行位置 {:?} 无法绑定", slot))
        })
    })
}

// ==========================================
// 引用校验
// ==========================================

/// 校验一张工作表的全部公式引用
///
/// # 参数
/// - sheet: 被校验的工作表
/// - others: 可被跨表引用的其它工作表
/// - deferred: 允许前向引用的延迟写入单元格
///
/// # 规则
/// - 目标行必须存在;明细行引用的目标单元格也必须存在
/// - 明细行只能引用本行
/// - 其余行只能引用更早的行（延迟写入除外）
/// - 跨表引用的工作表与目标行必须存在
pub fn validate_sheet(sheet: &Sheet, others: &[&Sheet], deferred: &DeferredCells) -> EngineResult<()> {
    for row in &sheet.rows {
        for (column, cell) in &row.cells {
            let Some(expr) = cell.expr() else {
                continue;
            };
            let mut refs: Vec<(Option<String>, Column, RowNumber, RowNumber)> = Vec::new();
            expr.visit_refs(&mut |target_sheet, c, first, last| {
                refs.push((target_sheet.map(str::to_string), c, first, last));
            });

            for (target_sheet, target_column, first, last) in refs {
                if let Some(name) = target_sheet.filter(|n| *n != sheet.name) {
                    let target = others
                        .iter()
                        .find(|s| s.name == name)
                        .ok_or_else(|| EngineError::UnknownSheet(name.clone()))?;
                    for t in first..=last {
                        if target.row(t).is_none() {
                            return Err(EngineError::DanglingReference {
                                sheet: sheet.name.clone(),
                                row: row.row_number,
                                column: *column,
                                target: t,
                            });
                        }
                    }
                    continue;
                }

                // 先确认全部目标行存在,再检查引用方向
                for t in first..=last {
                    let dangling = match sheet.row(t) {
                        None => true,
                        Some(target) => {
                            row.kind == RowKind::Data && target.cell(target_column).is_none()
                        }
                    };
                    if dangling {
                        return Err(EngineError::DanglingReference {
                            sheet: sheet.name.clone(),
                            row: row.row_number,
                            column: *column,
                            target: t,
                        });
                    }
                }
                for t in first..=last {
                    if row.kind == RowKind::Data {
                        if t != row.row_number {
                            return Err(EngineError::CrossRowReference {
                                sheet: sheet.name.clone(),
                                row: row.row_number,
                                column: *column,
                                target: t,
                            });
                        }
                    } else if t >= row.row_number && !deferred.contains(&(row.row_number, *column)) {
                        return Err(EngineError::ForwardReference {
                            sheet: sheet.name.clone(),
                            row: row.row_number,
                            column: *column,
                            target: t,
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

/// 校验整个工作簿（跨表引用可指向任意其它工作表）
pub fn validate_workbook(
    workbook: &Workbook,
    deferred: &BTreeMap<String, DeferredCells>,
) -> EngineResult<()> {
    let empty = DeferredCells::new();
    for sheet in &workbook.sheets {
        let others: Vec<&Sheet> = workbook
            .sheets
            .iter()
            .filter(|s| s.name != sheet.name)
            .collect();
        validate_sheet(sheet, &others, deferred.get(&sheet.name).unwrap_or(&empty))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_with(rows: Vec<OutputRow>) -> Sheet {
        let mut sheet = Sheet::new("Estimate");
        sheet.rows = rows;
        sheet
    }

    fn data_row(n: RowNumber) -> OutputRow {
        let mut row = OutputRow::new(n, RowKind::Data);
        row.cells.insert(Column::Takeoff, Cell::number(10.0));
        row.cells
            .insert(Column::Area, Cell::formula(Expr::cell(Column::Takeoff, n)));
        row
    }

    #[test]
    fn test_validate_accepts_backward_sum() {
        let mut sum = OutputRow::new(3, RowKind::Sum);
        sum.cells.insert(
            Column::Area,
            Cell::formula(Expr::sum(Column::Area, vec![RowRange::new(1, 2)])),
        );
        let sheet = sheet_with(vec![data_row(1), data_row(2), sum]);
        assert!(validate_sheet(&sheet, &[], &DeferredCells::new()).is_ok());
    }

    #[test]
    fn test_validate_rejects_forward_reference() {
        let mut header = OutputRow::new(1, RowKind::Header);
        header.cells.insert(
            Column::Area,
            Cell::formula(Expr::sum(Column::Area, vec![RowRange::single(2)])),
        );
        let sheet = sheet_with(vec![header, data_row(2)]);
        let err = validate_sheet(&sheet, &[], &DeferredCells::new()).unwrap_err();
        assert!(matches!(err, EngineError::ForwardReference { target: 2, .. }));

        // 延迟写入的单元格允许前向引用
        let deferred: DeferredCells = [(1, Column::Area)].into_iter().collect();
        assert!(validate_sheet(&sheet, &[], &deferred).is_ok());
    }

    #[test]
    fn test_validate_rejects_cross_row_data_formula() {
        let mut bad = OutputRow::new(2, RowKind::Data);
        bad.cells
            .insert(Column::Area, Cell::formula(Expr::cell(Column::Takeoff, 1)));
        let sheet = sheet_with(vec![data_row(1), bad]);
        let err = validate_sheet(&sheet, &[], &DeferredCells::new()).unwrap_err();
        assert!(matches!(err, EngineError::CrossRowReference { row: 2, .. }));
    }

    #[test]
    fn test_validate_rejects_dangling_and_unknown_sheet() {
        let mut sum = OutputRow::new(2, RowKind::Sum);
        sum.cells.insert(
            Column::Area,
            Cell::formula(Expr::sum(Column::Area, vec![RowRange::new(1, 5)])),
        );
        let sheet = sheet_with(vec![data_row(1), sum]);
        let err = validate_sheet(&sheet, &[], &DeferredCells::new()).unwrap_err();
        assert!(matches!(err, EngineError::DanglingReference { target: 3, .. }));

        let mut summary = Sheet::new("Summary");
        let mut row = OutputRow::new(1, RowKind::Sum);
        row.cells.insert(
            Column::Area,
            Cell::formula(Expr::sheet_cell("Missing", Column::Area, 1)),
        );
        summary.rows.push(row);
        let err = validate_sheet(&summary, &[], &DeferredCells::new()).unwrap_err();
        assert_eq!(err, EngineError::UnknownSheet("Missing".to_string()));
    }

    #[test]
    fn test_validate_reports_missing_target_before_direction() {
        // 区间内既有前向行又有缺失行时,缺失优先
        let mut sum = OutputRow::new(2, RowKind::Sum);
        sum.cells.insert(
            Column::Area,
            Cell::formula(Expr::sum(Column::Area, vec![RowRange::new(1, 4)])),
        );
        let sheet = sheet_with(vec![data_row(1), sum, data_row(3)]);
        let err = validate_sheet(&sheet, &[], &DeferredCells::new()).unwrap_err();
        assert!(matches!(err, EngineError::DanglingReference { row: 2, target: 4, .. }));
    }
}
