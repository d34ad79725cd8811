// ==========================================
// 施工算量清单编译器 - 公式表达式
// ==========================================
// 职责: 带标签的公式表达式树（字面量 / 单元格引用 / 区间求和 / 二元运算）
// 红线: 不拼接公式字符串,A1 文本只在最终渲染时生成
// ==========================================
// 行引用类型参数 R:
// - RowSlot: 公式合成阶段的符号行位置
// - u32:     布局阶段绑定后的最终行号
// ==========================================

use crate::domain::types::Column;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 最终行号（1 起算）
pub type RowNumber = u32;

// ==========================================
// 二元运算符
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn symbol(&self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }

    pub fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            // 与电子表格不同: 除零按 0 处理,保持静默降级
            BinaryOp::Div => {
                if rhs == 0.0 {
                    0.0
                } else {
                    lhs / rhs
                }
            }
        }
    }
}

// ==========================================
// 符号行位置 (公式合成阶段)
// ==========================================
// 合成阶段尚未分配行号,只描述"相对哪一行"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowSlot {
    /// 公式所在行
    Current,
    /// 第 i 段成员的首行
    SegmentFirst(usize),
    /// 第 i 段成员的末行
    SegmentLast(usize),
}

// ==========================================
// 单元格引用 / 区间求和
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRef<R> {
    /// None 表示同一工作表
    pub sheet: Option<String>,
    pub column: Column,
    pub row: R,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRange<R> {
    pub first: R,
    pub last: R,
}

impl<R: Copy> RowRange<R> {
    pub fn new(first: R, last: R) -> Self {
        Self { first, last }
    }

    pub fn single(row: R) -> Self {
        Self {
            first: row,
            last: row,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSum<R> {
    pub sheet: Option<String>,
    pub column: Column,
    /// 可以是多个互不相邻的区间（组合构件）
    pub ranges: Vec<RowRange<R>>,
}

// ==========================================
// Expr - 公式表达式
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Expr<R = RowNumber> {
    Literal { value: f64 },
    ColumnRef(CellRef<R>),
    Sum(RangeSum<R>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr<R>>,
        rhs: Box<Expr<R>>,
    },
}

impl<R: Copy> Expr<R> {
    pub fn literal(value: f64) -> Self {
        Expr::Literal { value }
    }

    pub fn cell(column: Column, row: R) -> Self {
        Expr::ColumnRef(CellRef {
            sheet: None,
            column,
            row,
        })
    }

    pub fn sheet_cell(sheet: &str, column: Column, row: R) -> Self {
        Expr::ColumnRef(CellRef {
            sheet: Some(sheet.to_string()),
            column,
            row,
        })
    }

    pub fn sum(column: Column, ranges: Vec<RowRange<R>>) -> Self {
        Expr::Sum(RangeSum {
            sheet: None,
            column,
            ranges,
        })
    }

    pub fn sheet_sum(sheet: &str, column: Column, ranges: Vec<RowRange<R>>) -> Self {
        Expr::Sum(RangeSum {
            sheet: Some(sheet.to_string()),
            column,
            ranges,
        })
    }

    pub fn binary(op: BinaryOp, lhs: Expr<R>, rhs: Expr<R>) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn mul(self, rhs: Expr<R>) -> Self {
        Expr::binary(BinaryOp::Mul, self, rhs)
    }

    pub fn div(self, rhs: Expr<R>) -> Self {
        Expr::binary(BinaryOp::Div, self, rhs)
    }

    pub fn add(self, rhs: Expr<R>) -> Self {
        Expr::binary(BinaryOp::Add, self, rhs)
    }

    /// 将行引用映射为另一种表示（符号位置 → 行号）
    ///
    /// 映射失败时返回第一个错误,不做部分绑定
    pub fn try_map_rows<S, E, F>(&self, f: &mut F) -> Result<Expr<S>, E>
    where
        S: Copy,
        F: FnMut(R) -> Result<S, E>,
    {
        Ok(match self {
            Expr::Literal { value } => Expr::Literal { value: *value },
            Expr::ColumnRef(cell) => Expr::ColumnRef(CellRef {
                sheet: cell.sheet.clone(),
                column: cell.column,
                row: f(cell.row)?,
            }),
            Expr::Sum(sum) => {
                let mut ranges = Vec::with_capacity(sum.ranges.len());
                for range in &sum.ranges {
                    ranges.push(RowRange {
                        first: f(range.first)?,
                        last: f(range.last)?,
                    });
                }
                Expr::Sum(RangeSum {
                    sheet: sum.sheet.clone(),
                    column: sum.column,
                    ranges,
                })
            }
            Expr::Binary { op, lhs, rhs } => Expr::Binary {
                op: *op,
                lhs: Box::new(lhs.try_map_rows(f)?),
                rhs: Box::new(rhs.try_map_rows(f)?),
            },
        })
    }

    /// 收集表达式中引用的所有单元格区间（sheet, column, first, last）
    pub fn visit_refs<F>(&self, f: &mut F)
    where
        F: FnMut(Option<&str>, Column, R, R),
    {
        match self {
            Expr::Literal { .. } => {}
            Expr::ColumnRef(cell) => f(cell.sheet.as_deref(), cell.column, cell.row, cell.row),
            Expr::Sum(sum) => {
                for range in &sum.ranges {
                    f(sum.sheet.as_deref(), sum.column, range.first, range.last);
                }
            }
            Expr::Binary { lhs, rhs, .. } => {
                lhs.visit_refs(f);
                rhs.visit_refs(f);
            }
        }
    }

    /// 是否引用了某列（任意行）
    pub fn references_column(&self, column: Column) -> bool {
        let mut found = false;
        self.visit_refs(&mut |_, c, _, _| {
            if c == column {
                found = true;
            }
        });
        found
    }
}

impl Expr<RowNumber> {
    /// 同表引用的全部行号（升序去重）
    pub fn referenced_rows(&self) -> Vec<RowNumber> {
        let mut rows = Vec::new();
        self.visit_refs(&mut |sheet, _, first, last| {
            if sheet.is_none() {
                rows.extend(first..=last);
            }
        });
        rows.sort_unstable();
        rows.dedup();
        rows
    }

    /// 渲染为 A1 公式文本（含前导 '='）
    pub fn to_a1(&self) -> String {
        format!("={}", self)
    }

    fn fmt_child(
        child: &Expr<RowNumber>,
        parent: BinaryOp,
        is_rhs: bool,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let needs_parens = match child {
            Expr::Binary { op, .. } => {
                op.precedence() < parent.precedence()
                    || (is_rhs
                        && op.precedence() == parent.precedence()
                        && matches!(parent, BinaryOp::Sub | BinaryOp::Div))
            }
            _ => false,
        };
        if needs_parens {
            write!(f, "({})", child)
        } else {
            write!(f, "{}", child)
        }
    }
}

fn sheet_prefix(sheet: Option<&str>) -> String {
    match sheet {
        Some(name) => format!("'{}'!", name.replace('\'', "''")),
        None => String::new(),
    }
}

/// 数值字面量渲染: 整数不带小数点,其余使用最短表示
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

impl fmt::Display for Expr<RowNumber> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal { value } => write!(f, "{}", format_number(*value)),
            Expr::ColumnRef(cell) => write!(
                f,
                "{}{}{}",
                sheet_prefix(cell.sheet.as_deref()),
                cell.column.letter(),
                cell.row
            ),
            Expr::Sum(sum) => {
                let prefix = sheet_prefix(sum.sheet.as_deref());
                let parts: Vec<String> = sum
                    .ranges
                    .iter()
                    .map(|r| {
                        if r.first == r.last {
                            format!("{}{}{}", prefix, sum.column.letter(), r.first)
                        } else {
                            format!(
                                "{}{}{}:{}{}",
                                prefix,
                                sum.column.letter(),
                                r.first,
                                sum.column.letter(),
                                r.last
                            )
                        }
                    })
                    .collect();
                write!(f, "SUM({})", parts.join(","))
            }
            Expr::Binary { op, lhs, rhs } => {
                Self::fmt_child(lhs, *op, false, f)?;
                write!(f, "{}", op.symbol())?;
                Self::fmt_child(rhs, *op, true, f)
            }
        }
    }
}
