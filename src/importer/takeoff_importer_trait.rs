// ==========================================
// 施工算量清单编译器 - 导入接口定义
// ==========================================
// 职责: 定义文件解析与算量导入的抽象接口
// ==========================================

use crate::domain::takeoff::RawRow;
use crate::importer::error::ImportResult;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// 解析中间结构
// ==========================================

/// 单条解析记录（表头 → 单元格文本）
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 数据行序号（1 起算）
    pub line: usize,
    /// 来源工作表名（仅 Excel）
    pub sheet: Option<String>,
    pub fields: HashMap<String, String>,
}

/// 解析后的表格
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

// ==========================================
// 导入报告
// ==========================================

/// 被拒收的输入行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub line: usize,
    pub reason: String,
}

/// 导入报告: 可用行 + 拒收行
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub rows: Vec<RawRow>,
    pub rejected: Vec<RejectedRow>,
}

// ==========================================
// Trait 定义
// ==========================================

/// 文件解析器
pub trait FileParser {
    /// 解析文件为表格记录（空白行已跳过）
    fn parse(&self, file_path: &Path) -> ImportResult<ParsedTable>;
}

/// 算量导入器
pub trait TakeoffImport {
    /// 从文件导入一个批次
    ///
    /// # 返回
    /// - Ok(ImportReport): 行级问题进入 rejected,不中断
    /// - Err(ImportError): 文件级错误（不存在/格式/缺列）
    fn import_file(&self, file_path: &Path) -> ImportResult<ImportReport>;
}
