// ==========================================
// 施工算量清单编译器 - 引擎层
// ==========================================
// 职责: 尺寸解析 / 分类认领 / 分组 / 公式合成 / 布局 / 汇总
// 红线: 引擎不做 I/O;输入为原始行切片与只读配置
// 红线: 单行解析或分类失败只会降级,不会中断整批
// ==========================================

pub mod classifier;
pub mod dimension;
pub mod error;
pub mod evaluator;
pub mod grouping;
pub mod layout;
pub mod orchestrator;
pub mod rules;
pub mod summary;
pub mod synthesis;
pub mod usage;

// 重导出核心引擎
pub use classifier::{ClassifyMode, ItemClassifier};
pub use dimension::DimensionParser;
pub use error::{EngineError, EngineResult};
pub use evaluator::WorkbookEvaluator;
pub use grouping::{derive_group_key, Grouper};
pub use layout::{validate_sheet, validate_workbook, DetailLayout, LayoutBuilder};
pub use orchestrator::{EstimatePipeline, EstimateResult, RunStats, UnusedRow};
pub use summary::SummaryBuilder;
pub use synthesis::FormulaSynthesizer;
pub use usage::{ClaimOutcome, UsedRowTracker};
