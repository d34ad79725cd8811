// ==========================================
// 施工算量清单编译器 - 工作簿导出
// ==========================================
// 职责: 估算结果 → JSON / 每表一个 CSV
// 红线: CSV 第 n 行即工作表第 n 行,列 A..K 固定;公式输出 A1 文本
// ==========================================

use crate::domain::formula::format_number;
use crate::domain::types::Column;
use crate::domain::workbook::{Cell, CellValue, Sheet};
use crate::engine::EstimateResult;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("写入失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// 单元格 → CSV 文本
fn cell_text(cell: Option<&Cell>) -> String {
    match cell {
        None => String::new(),
        Some(Cell::Formula { formula, .. }) => formula.clone(),
        Some(Cell::Value { value }) => match value {
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(t) => t.clone(),
        },
    }
}

/// 文件名中不允许的字符替换为 '_'
fn file_stem(sheet_name: &str) -> String {
    sheet_name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

// ==========================================
// WorkbookExporter
// ==========================================
pub struct WorkbookExporter;

impl WorkbookExporter {
    /// 完整结果 → 格式化 JSON
    pub fn to_json(result: &EstimateResult) -> ExportResult<String> {
        Ok(serde_json::to_string_pretty(result)?)
    }

    /// 单张工作表 → CSV 文本
    pub fn sheet_to_csv(sheet: &Sheet) -> ExportResult<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        for row in &sheet.rows {
            let record: Vec<String> = Column::ALL
                .iter()
                .map(|column| cell_text(row.cell(*column)))
                .collect();
            writer.write_record(&record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// 写出 estimate.json 与每表一个 CSV
    ///
    /// # 返回
    /// - 写出的文件路径（JSON 在前,CSV 按工作表顺序）
    pub fn write_all(result: &EstimateResult, out_dir: &Path) -> ExportResult<Vec<PathBuf>> {
        fs::create_dir_all(out_dir)?;
        let mut written = Vec::new();

        let json_path = out_dir.join("estimate.json");
        fs::write(&json_path, Self::to_json(result)?)?;
        written.push(json_path);

        for sheet in &result.workbook.sheets {
            let path = out_dir.join(format!("{}.csv", file_stem(&sheet.name)));
            fs::write(&path, Self::sheet_to_csv(sheet)?)?;
            written.push(path);
        }

        info!(dir = %out_dir.display(), files = written.len(), "导出完成");
        Ok(written)
    }
}
