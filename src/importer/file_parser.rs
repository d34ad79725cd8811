// ==========================================
// 施工算量清单编译器 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 说明: Excel 读取全部工作表,工作表名作为分类提示
// 红线: 行号 = 数据行序号（1 起算,表头不计,空白行也占号）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::takeoff_importer_trait::{FileParser, ParsedTable, RawRecord};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

fn check_file(path: &Path, allowed: &[&str]) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !allowed.contains(&ext.as_str()) {
        return Err(ImportError::UnsupportedFormat(ext));
    }
    Ok(())
}

/// 表头 + 一行单元格 → 记录;全部为空时返回 None
fn to_record(
    headers: &[String],
    cells: impl Iterator<Item = String>,
    line: usize,
    sheet: Option<&str>,
) -> Option<RawRecord> {
    let mut fields = HashMap::new();
    for (header, value) in headers.iter().zip(cells) {
        if !header.is_empty() {
            fields.insert(header.clone(), value.trim().to_string());
        }
    }
    if fields.values().all(|v| v.is_empty()) {
        return None;
    }
    Some(RawRecord {
        line,
        sheet: sheet.map(str::to_string),
        fields,
    })
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse(&self, file_path: &Path) -> ImportResult<ParsedTable> {
        check_file(file_path, &["csv"])?;

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            if let Some(r) = to_record(&headers, record.iter().map(str::to_string), idx + 1, None) {
                records.push(r);
            }
        }

        debug!(file = %file_path.display(), records = records.len(), "CSV 解析完成");
        Ok(ParsedTable { headers, records })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse(&self, file_path: &Path) -> ImportResult<ParsedTable> {
        check_file(file_path, &["xlsx", "xls"])?;

        let mut workbook = open_workbook_auto(file_path)?;
        let sheet_names = workbook.sheet_names().to_vec();
        if sheet_names.is_empty() {
            return Err(ImportError::ExcelParseError("Excel 文件无工作表".to_string()));
        }

        let mut all_headers: Vec<String> = Vec::new();
        let mut records = Vec::new();
        let mut line = 0usize;

        for sheet_name in &sheet_names {
            let range = workbook.worksheet_range(sheet_name)?;
            let mut rows = range.rows();
            let Some(header_row) = rows.next() else {
                continue;
            };
            let headers: Vec<String> = header_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect();
            for h in &headers {
                if !h.is_empty() && !all_headers.contains(h) {
                    all_headers.push(h.clone());
                }
            }

            for data_row in rows {
                line += 1;
                let cells = data_row.iter().map(|c| c.to_string());
                if let Some(r) = to_record(&headers, cells, line, Some(sheet_name)) {
                    records.push(r);
                }
            }
        }

        if all_headers.is_empty() {
            return Err(ImportError::ExcelParseError("Excel 文件无数据行".to_string()));
        }

        debug!(
            file = %file_path.display(),
            sheets = sheet_names.len(),
            records = records.len(),
            "Excel 解析完成"
        );
        Ok(ParsedTable {
            headers: all_headers,
            records,
        })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse(&self, file_path: &Path) -> ImportResult<ParsedTable> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse(file_path),
            "xlsx" | "xls" => ExcelParser.parse(file_path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
