// ==========================================
// 施工算量清单编译器 - 算量导入器
// ==========================================
// 流程: 解析文件 → 表头映射 → 逐行转换 → 导入报告
// 支持: .csv / .xlsx / .xls / .json
// 红线: 单行问题只进入 rejected,不影响其余行
// ==========================================

use crate::domain::takeoff::RawRow;
use crate::domain::types::Unit;
use crate::importer::data_cleaner::normalize_null;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::takeoff_importer_trait::{
    FileParser, ImportReport, ParsedTable, RejectedRow, TakeoffImport,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, instrument, warn};

/// JSON 输入行（数组元素）
#[derive(Debug, Deserialize)]
struct JsonTakeoffRow {
    description: String,
    #[serde(default, alias = "qty", alias = "takeoff")]
    quantity: f64,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

// ==========================================
// TakeoffImporter - 导入器
// ==========================================
#[derive(Debug, Default)]
pub struct TakeoffImporter;

impl TakeoffImporter {
    pub fn new() -> Self {
        Self
    }

    /// 表格记录 → 导入报告
    pub fn map_table(&self, table: &ParsedTable) -> ImportResult<ImportReport> {
        let mapper = FieldMapper::from_headers(&table.headers)?;
        let mut report = ImportReport::default();

        for record in &table.records {
            match mapper.map_record(record) {
                Ok(row) => report.rows.push(row),
                Err(e) if e.is_row_level() => {
                    warn!(line = record.line, error = %e, "拒收输入行");
                    report.rejected.push(RejectedRow {
                        line: record.line,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    /// JSON 文本 → 导入报告
    pub fn import_json_str(&self, content: &str) -> ImportResult<ImportReport> {
        let items: Vec<JsonTakeoffRow> = serde_json::from_str(content)?;
        let mut report = ImportReport::default();

        for (idx, item) in items.into_iter().enumerate() {
            let line = idx + 1;
            let Some(description) = normalize_null(&item.description) else {
                report.rejected.push(RejectedRow {
                    line,
                    reason: "描述为空".to_string(),
                });
                continue;
            };
            if !item.quantity.is_finite() {
                report.rejected.push(RejectedRow {
                    line,
                    reason: "数量非有限值".to_string(),
                });
                continue;
            }
            let unit = item
                .unit
                .as_deref()
                .map(Unit::parse)
                .unwrap_or(Unit::None);
            let mut row = RawRow::new(&description, item.quantity, unit, line);
            if let Some(category) = item.category.as_deref().and_then(normalize_null) {
                row = row.with_category(&category);
            }
            report.rows.push(row);
        }
        Ok(report)
    }
}

impl TakeoffImport for TakeoffImporter {
    #[instrument(skip(self), fields(file = %file_path.display()))]
    fn import_file(&self, file_path: &Path) -> ImportResult<ImportReport> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let report = if ext == "json" {
            if !file_path.exists() {
                return Err(ImportError::FileNotFound(file_path.display().to_string()));
            }
            let content = fs::read_to_string(file_path)?;
            self.import_json_str(&content)?
        } else {
            let table = UniversalFileParser.parse(file_path)?;
            self.map_table(&table)?
        };

        info!(
            rows = report.rows.len(),
            rejected = report.rejected.len(),
            "算量导入完成"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_import_json() {
        let json = r#"[
            {"description": "SOG 6\"", "quantity": 1000, "unit": "SF"},
            {"description": "  ", "quantity": 1},
            {"description": "Pile cap PC-1", "qty": 3, "unit": "EA", "category": "Foundation"}
        ]"#;
        let report = TakeoffImporter::new().import_json_str(json).unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rejected, vec![RejectedRow { line: 2, reason: "描述为空".to_string() }]);
        assert_eq!(report.rows[1].source_index, 3);
        assert_eq!(report.rows[1].category.as_deref(), Some("Foundation"));
    }

    #[test]
    fn test_import_malformed_json() {
        let err = TakeoffImporter::new().import_json_str("{not json").unwrap_err();
        assert!(matches!(err, ImportError::JsonParseError(_)));
    }

    #[test]
    fn test_import_csv_with_rejected_row() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Description,Qty,Unit").unwrap();
        writeln!(file, "Grade beam GB-1 (2'x3'),120,LF").unwrap();
        writeln!(file, "Pile cap,lots,EA").unwrap();

        let report = TakeoffImporter::new().import_file(file.path()).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].line, 2);
    }
}
