// ==========================================
// 施工算量清单编译器 - 引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 解析未命中与分类未命中不是错误（静默降级）;
//       这里只收录内部不变量被破坏的情况,必须大声失败
// ==========================================

use crate::domain::formula::RowNumber;
use crate::domain::types::Column;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    // ===== 引用校验 =====
    #[error("悬空引用 (工作表 {sheet}, 行 {row}, 列 {column}): 目标行 {target} 不存在")]
    DanglingReference {
        sheet: String,
        row: RowNumber,
        column: Column,
        target: RowNumber,
    },

    #[error("前向引用 (工作表 {sheet}, 行 {row}, 列 {column}): 引用了后续行 {target}")]
    ForwardReference {
        sheet: String,
        row: RowNumber,
        column: Column,
        target: RowNumber,
    },

    #[error("明细行跨行引用 (工作表 {sheet}, 行 {row}, 列 {column}): 引用了行 {target}")]
    CrossRowReference {
        sheet: String,
        row: RowNumber,
        column: Column,
        target: RowNumber,
    },

    #[error("未知工作表: {0}")]
    UnknownSheet(String),

    // ===== 求值 =====
    #[error("循环引用: {sheet}!{column}{row}")]
    CyclicReference {
        sheet: String,
        column: Column,
        row: RowNumber,
    },

    // ===== 其他内部不变量 =====
    #[error("内部不变量被破坏: {0}")]
    InvariantViolation(String),
}

/// 引擎结果类型别名
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// 是否属于引用校验失败
    pub fn is_reference_error(&self) -> bool {
        matches!(
            self,
            EngineError::DanglingReference { .. }
                | EngineError::ForwardReference { .. }
                | EngineError::CrossRowReference { .. }
                | EngineError::UnknownSheet(_)
        )
    }
}
