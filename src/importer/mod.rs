// ==========================================
// 施工算量清单编译器 - 导入层
// ==========================================
// 职责: 外部算量文件 → RawRow 批次
// 红线: 导入层不做分类,只做字段映射与清洗
// ==========================================

pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod takeoff_importer;
pub mod takeoff_importer_trait;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use takeoff_importer::TakeoffImporter;
pub use takeoff_importer_trait::{
    FileParser, ImportReport, ParsedTable, RawRecord, RejectedRow, TakeoffImport,
};
