// ==========================================
// 施工算量清单编译器 - 数据清洗
// ==========================================
// 职责: 文本规整 / 空值识别 / 数量解析
// ==========================================

/// 折叠空白并去掉不可见字符
pub fn clean_text(value: &str) -> String {
    value
        .replace(['\u{00a0}', '\u{200b}', '\u{feff}'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 空值识别: 空串 / NULL / N/A / - 视为空
pub fn normalize_null(value: &str) -> Option<String> {
    let cleaned = clean_text(value);
    match cleaned.to_uppercase().as_str() {
        "" | "NULL" | "N/A" | "NA" | "-" | "--" => None,
        _ => Some(cleaned),
    }
}

/// 解析数量
///
/// # 参数
/// - value: 原始文本,允许千分位逗号与首尾空白
///
/// # 返回
/// - Ok(0.0): 空值
/// - Ok(v): 有限数值
/// - Err(msg): 非数值或非有限
pub fn parse_quantity(value: &str) -> Result<f64, String> {
    let Some(cleaned) = normalize_null(value) else {
        return Ok(0.0);
    };
    let digits: String = cleaned.chars().filter(|c| *c != ',' && *c != ' ').collect();
    match digits.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(format!("数量非有限值: {}", cleaned)),
        Err(_) => Err(format!("数量不是数字: {}", cleaned)),
    }
}
