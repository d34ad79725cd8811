// ==========================================
// 施工算量清单编译器 - 核心库
// ==========================================
// 输入: 扁平算量行（描述 / 数量 / 单位 / 分类提示）
// 输出: 分专业明细工作表 + 汇总工作表（全部为活公式）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 算量行、公式、工作簿
pub mod domain;

// 引擎层 - 解析、分类、分组、布局
pub mod engine;

// 导入层 - CSV / Excel / JSON
pub mod importer;

// 配置层 - 估算参数
pub mod config;

// 导出层 - JSON / CSV
pub mod export;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{ConfigManager, EstimateConfig};
pub use domain::takeoff::{ClassifiedItem, ParsedDimensions, RawRow};
pub use domain::types::{Column, Discipline, RowKind, Unit};
pub use domain::workbook::{Cell, OutputRow, Sheet, Workbook};
pub use engine::{EngineError, EstimatePipeline, EstimateResult, WorkbookEvaluator};
pub use export::WorkbookExporter;
pub use importer::{ImportReport, TakeoffImport, TakeoffImporter};

// ==========================================
// 常量定义
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "施工算量清单编译器";
