// ==========================================
// 施工算量清单编译器 - 尺寸解析器
// ==========================================
// 职责: 从自由文本中解码工程尺寸（英尺 / 英寸 / 分数 / 管径x壁厚 / 型钢规格）
// 红线: 尽力而为,未命中返回 None,永不 panic、永不报错
// ==========================================
// 支持的写法:
// - 英尺英寸:   27'-10"   2'-0 1/2"
// - 仅英寸:     22"   4½"   9-5/8"
// - 管径x壁厚:  9.625Ø x0.545   9-5/8" Øx0.545"   Ø24" x 0.5"
// - 括号列表:   (L x W x H)
// - 标签:       H= D= L= W= E= RS=   以及 "+ 7'-0" RS"
// - 型钢:       HP12x53 / W12x26（磅每英尺 = 第二个数）
// - 文本后缀:   "... @ Label"
// ==========================================

use crate::config::EstimateConfig;
use crate::domain::takeoff::{DimensionLayout, ParsedDimensions};
use crate::domain::types::Column;
use once_cell::sync::Lazy;
use regex::Regex;

// ==========================================
// 正则表（预处理后的 ASCII 文本上运行）
// ==========================================

/// 带单位标记的长度: 27'-10" / 27' / 10" / 4-1/2" / 1/2"
const LEN_MARKED: &str = r#"\d+(?:\.\d+)?\s*'(?:\s*-?\s*\d+(?:\.\d+)?(?:[ -]+\d+/\d+)?\s*")?|\d+(?:\.\d+)?(?:[ -]+\d+/\d+)?\s*"|\d+/\d+\s*""#;

/// 标签值: 带标记的长度或裸数字（裸数字按英尺）
static LEN_VALUE: Lazy<String> = Lazy::new(|| format!(r"(?:{}|\d+(?:\.\d+)?)", LEN_MARKED));

/// 管径在 Ø 之前: 9-5/8" Øx0.545"
static PIPE_AFTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?P<d>\d+(?:\.\d+)?(?:[ -]+\d+/\d+)?)\s*"?\s*Ø(?:\s*[xX]\s*(?P<t>\d*\.?\d+(?:[ -]+\d+/\d+)?)\s*"?)?"#,
    )
    .expect("Invalid regex")
});

/// 管径在 Ø 之后: Ø24" x 0.5"
static PIPE_BEFORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"Ø\s*(?P<d>\d+(?:\.\d+)?(?:[ -]+\d+/\d+)?)\s*"?(?:\s*[xX]\s*(?P<t>\d*\.?\d+(?:[ -]+\d+/\d+)?)\s*"?)?"#,
    )
    .expect("Invalid regex")
});

static ROLLED_SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?P<shape>HP|MC|W|C|S)\s?(?P<depth>\d+(?:\.\d+)?)\s?[xX]\s?(?P<wt>\d+(?:\.\d+)?)\b")
        .expect("Invalid regex")
});

static ROCK_SOCKET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\+\s*(?P<val>{})\s*RS\b", *LEN_VALUE)).expect("Invalid regex")
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<tag>RS|[HDLWE])\s*=\s*(?P<val>{})",
        *LEN_VALUE
    ))
    .expect("Invalid regex")
});

static BRACKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^()]*)\)").expect("Invalid regex"));

static LOOSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(LEN_MARKED).expect("Invalid regex"));

static AT_LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\s*(?P<label>.*)$").expect("Invalid regex"));

// ==========================================
// DimensionParser - 尺寸解析器
// ==========================================
#[derive(Debug, Clone)]
pub struct DimensionParser {
    pipe_weight_factor: f64,
    typo_min: f64,
    typo_max: f64,
    height_round_step: f64,
}

impl Default for DimensionParser {
    fn default() -> Self {
        Self::from_config(&EstimateConfig::default())
    }
}

impl DimensionParser {
    pub fn from_config(config: &EstimateConfig) -> Self {
        Self {
            pipe_weight_factor: config.pipe_weight_factor,
            typo_min: config.thickness_typo_min,
            typo_max: config.thickness_typo_max,
            height_round_step: config.height_round_step,
        }
    }

    // ==========================================
    // 预处理
    // ==========================================

    /// 规范化文本: Unicode 分数 / 撇号引号 / 直径符号 / 乘号
    ///
    /// 紧跟数字的分数写成 "-n/d"（`4½` → `4-1/2`）,其余写成 "n/d"
    pub fn normalize(text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 8);
        let mut prev_digit = false;

        for ch in text.chars() {
            if let Some(frac) = vulgar_fraction(ch) {
                if prev_digit {
                    out.push('-');
                }
                out.push_str(frac);
                prev_digit = true;
                continue;
            }

            let mapped = match ch {
                '\u{2032}' | '\u{2019}' | '\u{2018}' | '`' | '\u{00B4}' => '\'',
                '\u{2033}' | '\u{201C}' | '\u{201D}' => '"',
                'ø' | '⌀' | '∅' | 'Φ' | 'φ' => 'Ø',
                '×' => 'x',
                '\u{2044}' => '/',
                '\u{00A0}' => ' ',
                other => other,
            };
            out.push(mapped);
            prev_digit = mapped.is_ascii_digit();
        }

        // 两个单引号视为英寸符号
        out.replace("''", "\"")
    }

    // ==========================================
    // 数值解码
    // ==========================================

    /// 解码单个长度记号为英尺
    ///
    /// # 参数
    /// - token: `27'-10"` / `22"` / `4-1/2"` / `2'` / 裸数字（按英尺）
    ///
    /// # 返回
    /// - Some(英尺) / None（无法识别）
    pub fn parse_length(token: &str) -> Option<f64> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }

        if let Some(idx) = token.find('\'') {
            let feet: f64 = token[..idx].trim().parse().ok()?;
            let rest = token[idx + 1..].trim().trim_start_matches('-').trim();
            let rest = rest.trim_end_matches('"').trim();
            if rest.is_empty() {
                return Some(feet);
            }
            let inches = parse_inch_expr(rest)?;
            return Some(feet + inches / 12.0);
        }

        if let Some(body) = token.strip_suffix('"') {
            return parse_inch_expr(body.trim()).map(|inches| inches / 12.0);
        }

        parse_inch_expr(token)
    }

    /// 解码英寸数值（管径 / 壁厚）,含笔误修正
    ///
    /// 区间 [typo_min, typo_max) 内的整数视为漏写小数点: `0545` → 0.545
    pub fn parse_inches(&self, raw: &str) -> Option<f64> {
        let value = parse_inch_expr(raw.trim().trim_end_matches('"').trim())?;
        if value.fract() == 0.0 && value >= self.typo_min && value < self.typo_max {
            return Some(value / 1000.0);
        }
        Some(value)
    }

    /// 钢管桩单位重量（磅每英尺）: (D - t) x t x 系数
    pub fn pipe_weight(&self, diameter: f64, thickness: f64) -> f64 {
        (diameter - thickness) * thickness * self.pipe_weight_factor
    }

    /// 向上取整到步长的整数倍
    pub fn round_up_to_step(value: f64, step: f64) -> f64 {
        if step <= 0.0 {
            return value;
        }
        (value / step - 1e-9).ceil() * step
    }

    // ==========================================
    // 文本解析
    // ==========================================

    /// 从描述中提取全部可识别的尺寸（不依赖构件类型）
    ///
    /// 已识别的片段会在工作副本中抹去,避免被后续规则重复解读
    pub fn parse(&self, description: &str) -> ParsedDimensions {
        let mut parsed = ParsedDimensions::default();
        let mut work = Self::normalize(description);

        if let Some(caps) = AT_LABEL_RE.captures(&work) {
            let label = caps["label"].trim();
            if !label.is_empty() {
                parsed.at_label = Some(label.to_string());
            }
        }

        self.extract_pipe(&mut work, &mut parsed);
        Self::extract_rolled_section(&mut work, &mut parsed);
        Self::extract_rock_socket(&mut work, &mut parsed);
        Self::extract_tags(&mut work, &mut parsed);
        Self::extract_bracket(&mut work, &mut parsed);

        if let Some(m) = LOOSE_RE.find(&work) {
            parsed.loose = Self::parse_length(m.as_str());
        }

        parsed
    }

    /// 按构件类型的尺寸布局解析
    ///
    /// 括号位置与裸尺寸按布局落到长/宽/高;标签值优先;
    /// 桩类布局计算取整后的计算长度
    pub fn resolve(&self, description: &str, layout: DimensionLayout) -> ParsedDimensions {
        let mut parsed = self.parse(description);

        if !parsed.bracket.is_empty() {
            let values = parsed.bracket.clone();
            for (column, value) in layout.bracket_columns().iter().zip(values) {
                fill_column(&mut parsed, *column, value);
            }
        } else if let Some(loose) = parsed.loose {
            let target = match layout {
                DimensionLayout::Thickness | DimensionLayout::HeightOnly => Some(Column::Height),
                DimensionLayout::WidthHeight => Some(Column::Width),
                DimensionLayout::LengthTag => Some(Column::Length),
                _ => None,
            };
            if let Some(column) = target {
                fill_column(&mut parsed, column, loose);
            }
        }

        if layout.is_pile() {
            if let Some(height) = parsed.height {
                let total = height
                    + parsed.rock_socket.unwrap_or(0.0)
                    + parsed.embedment.unwrap_or(0.0);
                parsed.calculated_height =
                    Some(Self::round_up_to_step(total, self.height_round_step));
            }
        }

        parsed
    }

    fn extract_pipe(&self, work: &mut String, parsed: &mut ParsedDimensions) {
        let text = work.as_str();
        let caps = PIPE_AFTER_RE
            .captures(text)
            .or_else(|| PIPE_BEFORE_RE.captures(text));
        let Some(caps) = caps else {
            return;
        };

        let whole = caps.get(0).map(|m| m.range());
        parsed.diameter = caps.name("d").and_then(|m| self.parse_inches(m.as_str()));
        parsed.thickness = caps.name("t").and_then(|m| self.parse_inches(m.as_str()));

        if let (Some(d), Some(t)) = (parsed.diameter, parsed.thickness) {
            parsed.weight = Some(self.pipe_weight(d, t));
        }
        if let Some(range) = whole {
            blank(work, range.start, range.end);
        }
    }

    fn extract_rolled_section(work: &mut String, parsed: &mut ParsedDimensions) {
        let Some(caps) = ROLLED_SECTION_RE.captures(work) else {
            return;
        };
        let range = caps.get(0).map(|m| m.range());

        if let Ok(weight) = caps["wt"].parse::<f64>() {
            parsed.section = Some(format!("{}{}X{}", &caps["shape"], &caps["depth"], &caps["wt"]));
            if parsed.weight.is_none() {
                parsed.weight = Some(weight);
            }
        }
        if let Some(range) = range {
            blank(work, range.start, range.end);
        }
    }

    fn extract_rock_socket(work: &mut String, parsed: &mut ParsedDimensions) {
        let Some(caps) = ROCK_SOCKET_RE.captures(work) else {
            return;
        };
        let range = caps.get(0).map(|m| m.range());
        parsed.rock_socket = Self::parse_length(&caps["val"]);
        if let Some(range) = range {
            blank(work, range.start, range.end);
        }
    }

    fn extract_tags(work: &mut String, parsed: &mut ParsedDimensions) {
        let mut ranges = Vec::new();

        for caps in TAG_RE.captures_iter(work) {
            let Some(value) = Self::parse_length(&caps["val"]) else {
                continue;
            };
            let slot = match caps["tag"].to_ascii_uppercase().as_str() {
                "H" | "D" => &mut parsed.height,
                "L" => &mut parsed.length,
                "W" => &mut parsed.width,
                "E" => &mut parsed.embedment,
                "RS" => &mut parsed.rock_socket,
                _ => continue,
            };
            // 同名标签以首次出现为准
            if slot.is_none() {
                *slot = Some(value);
            }
            if let Some(m) = caps.get(0) {
                ranges.push(m.range());
            }
        }

        for range in ranges.into_iter().rev() {
            blank(work, range.start, range.end);
        }
    }

    fn extract_bracket(work: &mut String, parsed: &mut ParsedDimensions) {
        let mut found = None;

        for caps in BRACKET_RE.captures_iter(work) {
            let inner = &caps[1];
            let values: Option<Vec<f64>> = inner
                .split(['x', 'X'])
                .map(Self::parse_length)
                .collect();
            if let Some(values) = values {
                if !values.is_empty() {
                    found = caps.get(0).map(|m| (m.range(), values));
                    break;
                }
            }
        }

        if let Some((range, values)) = found {
            parsed.bracket = values;
            blank(work, range.start, range.end);
        }
    }
}

// ==========================================
// 内部工具
// ==========================================

fn vulgar_fraction(ch: char) -> Option<&'static str> {
    match ch {
        '½' => Some("1/2"),
        '⅓' => Some("1/3"),
        '⅔' => Some("2/3"),
        '¼' => Some("1/4"),
        '¾' => Some("3/4"),
        '⅛' => Some("1/8"),
        '⅜' => Some("3/8"),
        '⅝' => Some("5/8"),
        '⅞' => Some("7/8"),
        '⅙' => Some("1/6"),
        '⅚' => Some("5/6"),
        _ => None,
    }
}

/// 解码 "10" / "10.5" / "4-1/2" / "4 1/2" / "1/2"
fn parse_inch_expr(raw: &str) -> Option<f64> {
    let parts: Vec<&str> = raw
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [single] => parse_number_or_fraction(single),
        [whole, frac] if frac.contains('/') && !whole.contains('/') => {
            Some(whole.parse::<f64>().ok()? + parse_fraction(frac)?)
        }
        _ => None,
    }
}

fn parse_number_or_fraction(raw: &str) -> Option<f64> {
    if raw.contains('/') {
        parse_fraction(raw)
    } else {
        raw.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

fn parse_fraction(raw: &str) -> Option<f64> {
    let (num, den) = raw.split_once('/')?;
    let num: f64 = num.parse().ok()?;
    let den: f64 = den.parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

fn fill_column(parsed: &mut ParsedDimensions, column: Column, value: f64) {
    let slot = match column {
        Column::Length => &mut parsed.length,
        Column::Width => &mut parsed.width,
        Column::Height => &mut parsed.height,
        _ => return,
    };
    if slot.is_none() {
        *slot = Some(value);
    }
}

/// 用等长空格抹去已识别片段（保持字节下标不变）
fn blank(work: &mut String, start: usize, end: usize) {
    work.replace_range(start..end, &" ".repeat(end - start));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_parse_feet_inches() {
        let v = DimensionParser::parse_length("27'-10\"").unwrap();
        assert!(approx(v, 27.8333, 1e-4));
        assert_eq!(DimensionParser::parse_length("2'-0\""), Some(2.0));
        assert_eq!(DimensionParser::parse_length("2'"), Some(2.0));
        assert!(approx(DimensionParser::parse_length("2'-0 1/2\"").unwrap(), 2.0 + 0.5 / 12.0, 1e-9));
    }

    #[test]
    fn test_parse_inches_only_and_fractions() {
        assert!(approx(DimensionParser::parse_length("22\"").unwrap(), 22.0 / 12.0, 1e-9));
        assert!(approx(DimensionParser::parse_length("4-1/2\"").unwrap(), 4.5 / 12.0, 1e-9));
        assert!(approx(DimensionParser::parse_length("1/2\"").unwrap(), 0.5 / 12.0, 1e-9));
        assert_eq!(DimensionParser::parse_length("3"), Some(3.0));
    }

    #[test]
    fn test_parse_length_rejects_garbage() {
        assert_eq!(DimensionParser::parse_length(""), None);
        assert_eq!(DimensionParser::parse_length("abc"), None);
        assert_eq!(DimensionParser::parse_length("1/0\""), None);
        assert_eq!(DimensionParser::parse_length("L"), None);
    }

    #[test]
    fn test_normalize_unicode() {
        assert_eq!(DimensionParser::normalize("4½\""), "4-1/2\"");
        assert_eq!(DimensionParser::normalize("½\""), "1/2\"");
        assert_eq!(DimensionParser::normalize("27\u{2032}-10\u{2033}"), "27'-10\"");
        assert_eq!(DimensionParser::normalize("9\u{201D} ø"), "9\" Ø");
        assert_eq!(DimensionParser::normalize("6''"), "6\"");
    }

    #[test]
    fn test_thickness_typo_heuristic() {
        let parser = DimensionParser::default();
        assert_eq!(parser.parse_inches("0545"), Some(0.545));
        assert_eq!(parser.parse_inches("0.545\""), Some(0.545));
        assert_eq!(parser.parse_inches("1000"), Some(1000.0));
        assert_eq!(parser.parse_inches("99"), Some(99.0));
    }

    #[test]
    fn test_pipe_weight() {
        let parser = DimensionParser::default();
        let w = parser.pipe_weight(9.625, 0.545);
        assert!(approx(w, 52.90, 0.05), "weight = {}", w);
    }

    #[test]
    fn test_round_up_to_step() {
        assert_eq!(DimensionParser::round_up_to_step(39.5, 5.0), 40.0);
        assert_eq!(DimensionParser::round_up_to_step(40.0, 5.0), 40.0);
        assert_eq!(DimensionParser::round_up_to_step(40.01, 5.0), 45.0);
    }

    #[test]
    fn test_pipe_pile_description() {
        let parser = DimensionParser::default();
        let parsed = parser.resolve(
            "9-5/8\" Øx0.545\" H=32'-6\"+ 7'-0\" RS",
            DimensionLayout::PipePile,
        );
        assert_eq!(parsed.diameter, Some(9.625));
        assert_eq!(parsed.thickness, Some(0.545));
        assert_eq!(parsed.height, Some(32.5));
        assert_eq!(parsed.rock_socket, Some(7.0));
        assert_eq!(parsed.calculated_height, Some(40.0));
        assert!(approx(parsed.weight.unwrap(), 52.9, 0.05));
    }

    #[test]
    fn test_pipe_with_typo_and_diameter_first_symbol() {
        let parser = DimensionParser::default();
        let parsed = parser.parse("Pipe pile 9.625Ø x0545 H=40'");
        assert_eq!(parsed.diameter, Some(9.625));
        assert_eq!(parsed.thickness, Some(0.545));

        let parsed = parser.parse("Caisson Ø24\" x 0.5\" H=30'");
        assert_eq!(parsed.diameter, Some(24.0));
        assert_eq!(parsed.thickness, Some(0.5));
        assert_eq!(parsed.height, Some(30.0));
    }

    #[test]
    fn test_strip_footing_bracket() {
        let parser = DimensionParser::default();
        let parsed = parser.resolve("SF (2'-0\"x1'-0\")", DimensionLayout::WidthHeight);
        assert_eq!(parsed.bracket, vec![2.0, 1.0]);
        assert_eq!(parsed.width, Some(2.0));
        assert_eq!(parsed.height, Some(1.0));
        assert_eq!(parsed.length, None);
    }

    #[test]
    fn test_bracket_layout_length_width_height() {
        let parser = DimensionParser::default();
        let parsed = parser.resolve("PC-1 (6'x8'x3'-6\")", DimensionLayout::LengthWidthHeight);
        assert_eq!(parsed.length, Some(6.0));
        assert_eq!(parsed.width, Some(8.0));
        assert_eq!(parsed.height, Some(3.5));
    }

    #[test]
    fn test_tags_override_bracket() {
        let parser = DimensionParser::default();
        let parsed = parser.resolve("Wall (1'x10') H=12'", DimensionLayout::WidthHeight);
        assert_eq!(parsed.width, Some(1.0));
        assert_eq!(parsed.height, Some(12.0));
    }

    #[test]
    fn test_rolled_section_pile() {
        let parser = DimensionParser::default();
        let parsed = parser.resolve(
            "Drilled soldier pile HP12x53 H=25' E=12'",
            DimensionLayout::RolledSectionPile,
        );
        assert_eq!(parsed.section.as_deref(), Some("HP12X53"));
        assert_eq!(parsed.weight, Some(53.0));
        assert_eq!(parsed.height, Some(25.0));
        assert_eq!(parsed.embedment, Some(12.0));
        assert_eq!(parsed.calculated_height, Some(40.0));
    }

    #[test]
    fn test_loose_thickness() {
        let parser = DimensionParser::default();
        let parsed = parser.resolve("SOG 6\"", DimensionLayout::Thickness);
        assert_eq!(parsed.height, Some(0.5));
        let parsed = parser.resolve("Slab on grade 4½\" thick", DimensionLayout::Thickness);
        assert_eq!(parsed.height, Some(4.5 / 12.0));
    }

    #[test]
    fn test_at_label() {
        let parser = DimensionParser::default();
        let parsed = parser.parse("Landing (5'x4'x6\") @ Stair A ");
        assert_eq!(parsed.at_label.as_deref(), Some("Stair A"));
        assert_eq!(parsed.bracket, vec![5.0, 4.0, 0.5]);

        let parsed = parser.parse("Steps @");
        assert_eq!(parsed.at_label, None);
    }

    #[test]
    fn test_parse_miss_is_empty() {
        let parser = DimensionParser::default();
        let parsed = parser.resolve("Misc demolition allowance", DimensionLayout::WidthHeight);
        assert_eq!(parsed, ParsedDimensions::default());

        // 非法片段不 panic
        let parsed = parser.parse("((x)) Ø x H= '\" 1/0\" @@");
        assert_eq!(parsed.height, None);
        assert_eq!(parsed.diameter, None);
    }

    #[test]
    fn test_depth_tag_is_height() {
        let parser = DimensionParser::default();
        let parsed = parser.resolve("Bulk excavation D=12'-6\"", DimensionLayout::HeightOnly);
        assert_eq!(parsed.height, Some(12.5));
    }
}
