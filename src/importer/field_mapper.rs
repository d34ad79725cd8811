// ==========================================
// 施工算量清单编译器 - 字段映射器
// ==========================================
// 职责: 表头别名识别 → RawRow
// 说明: 表头比较前统一小写并去掉非字母数字字符
// ==========================================

use crate::domain::takeoff::RawRow;
use crate::domain::types::Unit;
use crate::importer::data_cleaner::{normalize_null, parse_quantity};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::takeoff_importer_trait::RawRecord;

const DESCRIPTION_ALIASES: &[&str] = &["description", "item", "name", "itemdescription"];
const QUANTITY_ALIASES: &[&str] = &["quantity", "qty", "takeoff", "measurement"];
const UNIT_ALIASES: &[&str] = &["unit", "uom", "units"];
const CATEGORY_ALIASES: &[&str] = &["category", "discipline", "section", "trade"];

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

// ==========================================
// FieldMapper - 表头定位后的映射器
// ==========================================
#[derive(Debug, Clone)]
pub struct FieldMapper {
    description: String,
    quantity: Option<String>,
    unit: Option<String>,
    category: Option<String>,
}

impl FieldMapper {
    /// 根据表头定位各字段
    ///
    /// # 返回
    /// - Err(MissingColumn): 找不到描述列
    pub fn from_headers(headers: &[String]) -> ImportResult<Self> {
        let find = |aliases: &[&str]| {
            headers
                .iter()
                .find(|h| aliases.contains(&normalize_header(h).as_str()))
                .cloned()
        };

        let description =
            find(DESCRIPTION_ALIASES).ok_or_else(|| ImportError::MissingColumn("Description".to_string()))?;

        Ok(Self {
            description,
            quantity: find(QUANTITY_ALIASES),
            unit: find(UNIT_ALIASES),
            category: find(CATEGORY_ALIASES),
        })
    }

    /// 单条记录 → RawRow
    ///
    /// # 参数
    /// - record: 解析记录
    /// - fallback_category: 分类列为空时使用（工作表名）
    pub fn map_record(&self, record: &RawRecord) -> ImportResult<RawRow> {
        let field = |name: &Option<String>| {
            name.as_ref()
                .and_then(|h| record.fields.get(h))
                .and_then(|v| normalize_null(v))
        };

        let description = record
            .fields
            .get(&self.description)
            .and_then(|v| normalize_null(v))
            .ok_or_else(|| ImportError::FieldMappingError {
                row: record.line,
                message: "描述为空".to_string(),
            })?;

        let quantity = match field(&self.quantity) {
            Some(raw) => parse_quantity(&raw).map_err(|message| ImportError::TypeConversionError {
                row: record.line,
                field: "Quantity".to_string(),
                message,
            })?,
            None => 0.0,
        };

        let unit = field(&self.unit)
            .map(|u| Unit::parse(&u))
            .unwrap_or(Unit::None);

        let mut row = RawRow::new(&description, quantity, unit, record.line);
        if let Some(category) = field(&self.category).or_else(|| record.sheet.clone()) {
            row = row.with_category(&category);
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(pairs: &[(&str, &str)], sheet: Option<&str>) -> RawRecord {
        RawRecord {
            line: 4,
            sheet: sheet.map(str::to_string),
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_header_aliases() {
        let headers = vec!["Item Description".to_string(), "QTY".to_string(), "U.O.M".to_string()];
        let mapper = FieldMapper::from_headers(&headers).unwrap();
        let row = mapper
            .map_record(&record(
                &[("Item Description", "Grade beam GB-1 (2'x3')"), ("QTY", "120"), ("U.O.M", "LF")],
                None,
            ))
            .unwrap();
        assert_eq!(row.quantity, 120.0);
        assert_eq!(row.unit, Unit::Ft);
        assert_eq!(row.source_index, 4);
    }

    #[test]
    fn test_missing_description_column() {
        let headers = vec!["Qty".to_string()];
        assert!(matches!(
            FieldMapper::from_headers(&headers),
            Err(ImportError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_sheet_name_as_category_fallback() {
        let headers = vec!["Description".to_string(), "Category".to_string()];
        let mapper = FieldMapper::from_headers(&headers).unwrap();

        let row = mapper
            .map_record(&record(&[("Description", "SOG 6\""), ("Category", "")], Some("Foundation")))
            .unwrap();
        assert_eq!(row.category.as_deref(), Some("Foundation"));
        assert_eq!(row.unit, Unit::None);
        assert_eq!(row.quantity, 0.0);
    }

    #[test]
    fn test_bad_quantity_is_row_level_error() {
        let headers = vec!["Description".to_string(), "Qty".to_string()];
        let mapper = FieldMapper::from_headers(&headers).unwrap();
        let err = mapper
            .map_record(&record(&[("Description", "Pile cap"), ("Qty", "abc")], None))
            .unwrap_err();
        assert!(err.is_row_level());
    }
}
