// ==========================================
// 施工算量清单编译器 - 领域类型定义
// ==========================================
// 职责: 计量单位 / 专业 / 工作表列 / 行类型
// 红线: 枚举顺序即输出顺序,不得随意调整
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 计量单位 (Unit)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与算量软件导出一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Unit {
    Ft,  // 延长英尺
    Sf,  // 平方英尺
    Ea,  // 个数
    Cy,  // 立方码
    Lbs, // 磅
    Ls,  // 总价项
    None, // 缺失
}

impl Unit {
    /// 从自由文本解析单位（不识别时返回 Unit::None）
    pub fn parse(raw: &str) -> Unit {
        let token: String = raw
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '.')
            .collect::<String>()
            .to_uppercase();

        match token.as_str() {
            "FT" | "LF" | "FEET" | "FOOT" | "LINFT" | "'" => Unit::Ft,
            "SF" | "SQFT" | "FT2" | "SQ" => Unit::Sf,
            "EA" | "EACH" | "NO" | "PCS" | "PC" | "COUNT" | "CT" => Unit::Ea,
            "CY" | "CUYD" | "YD3" => Unit::Cy,
            "LB" | "LBS" | "#" => Unit::Lbs,
            "LS" | "LUMPSUM" => Unit::Ls,
            _ => Unit::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Unit::None)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Ft => write!(f, "FT"),
            Unit::Sf => write!(f, "SF"),
            Unit::Ea => write!(f, "EA"),
            Unit::Cy => write!(f, "CY"),
            Unit::Lbs => write!(f, "LBS"),
            Unit::Ls => write!(f, "LS"),
            Unit::None => write!(f, ""),
        }
    }
}

// ==========================================
// 专业 (Discipline)
// ==========================================
// 红线: 声明顺序 = 工作簿分段顺序
// 后续分段的汇总公式可能引用前序分段的合计
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Discipline {
    Demolition,
    Excavation,
    RockExcavation,
    Soe,
    Foundation,
    Waterproofing,
    Superstructure,
    Civil,
}

impl Discipline {
    /// 工作簿分段顺序
    pub const SECTION_ORDER: [Discipline; 8] = [
        Discipline::Demolition,
        Discipline::Excavation,
        Discipline::RockExcavation,
        Discipline::Soe,
        Discipline::Foundation,
        Discipline::Waterproofing,
        Discipline::Superstructure,
        Discipline::Civil,
    ];

    /// 分段标题
    pub fn title(&self) -> &'static str {
        match self {
            Discipline::Demolition => "Demolition",
            Discipline::Excavation => "Excavation",
            Discipline::RockExcavation => "Rock Excavation",
            Discipline::Soe => "Shoring / SOE",
            Discipline::Foundation => "Foundation",
            Discipline::Waterproofing => "Waterproofing",
            Discipline::Superstructure => "Superstructure",
            Discipline::Civil => "Civil / Sitework",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discipline::Demolition => write!(f, "DEMOLITION"),
            Discipline::Excavation => write!(f, "EXCAVATION"),
            Discipline::RockExcavation => write!(f, "ROCK_EXCAVATION"),
            Discipline::Soe => write!(f, "SOE"),
            Discipline::Foundation => write!(f, "FOUNDATION"),
            Discipline::Waterproofing => write!(f, "WATERPROOFING"),
            Discipline::Superstructure => write!(f, "SUPERSTRUCTURE"),
            Discipline::Civil => write!(f, "CIVIL"),
        }
    }
}

// ==========================================
// 工作表列 (Column)
// ==========================================
// 各专业共用同一套列语义,列字母固定
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Column {
    Description,   // A
    Takeoff,       // B
    Unit,          // C
    Length,        // D
    Width,         // E
    Height,        // F
    LinearFeet,    // G
    Area,          // H
    Weight,        // I 重量,或土方的自然方体积
    Volume,        // J
    FinalQuantity, // K
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::Description,
        Column::Takeoff,
        Column::Unit,
        Column::Length,
        Column::Width,
        Column::Height,
        Column::LinearFeet,
        Column::Area,
        Column::Weight,
        Column::Volume,
        Column::FinalQuantity,
    ];

    /// 派生列（可被公式计算、可被汇总）
    pub const DERIVED: [Column; 5] = [
        Column::LinearFeet,
        Column::Area,
        Column::Weight,
        Column::Volume,
        Column::FinalQuantity,
    ];

    /// A1 列字母
    pub fn letter(&self) -> &'static str {
        match self {
            Column::Description => "A",
            Column::Takeoff => "B",
            Column::Unit => "C",
            Column::Length => "D",
            Column::Width => "E",
            Column::Height => "F",
            Column::LinearFeet => "G",
            Column::Area => "H",
            Column::Weight => "I",
            Column::Volume => "J",
            Column::FinalQuantity => "K",
        }
    }

    /// 表头文字
    pub fn title(&self) -> &'static str {
        match self {
            Column::Description => "Description",
            Column::Takeoff => "Takeoff",
            Column::Unit => "Unit",
            Column::Length => "Length (FT)",
            Column::Width => "Width (FT)",
            Column::Height => "Height (FT)",
            Column::LinearFeet => "LF",
            Column::Area => "SF",
            Column::Weight => "LBS / Bank CY",
            Column::Volume => "CY",
            Column::FinalQuantity => "QTY",
        }
    }

    pub fn is_derived(&self) -> bool {
        Column::DERIVED.contains(self)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

// ==========================================
// 输出行类型 (Row Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowKind {
    Header,           // 表头 / 分段标题
    SubsectionHeader, // 子目标题 / 组合构件分部标题
    Data,             // 明细行
    Sum,              // 汇总行
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKind::Header => write!(f, "HEADER"),
            RowKind::SubsectionHeader => write!(f, "SUBSECTION_HEADER"),
            RowKind::Data => write!(f, "DATA"),
            RowKind::Sum => write!(f, "SUM"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_parse_aliases() {
        assert_eq!(Unit::parse("ft"), Unit::Ft);
        assert_eq!(Unit::parse(" LF "), Unit::Ft);
        assert_eq!(Unit::parse("Sq Ft"), Unit::Sf);
        assert_eq!(Unit::parse("ea."), Unit::Ea);
        assert_eq!(Unit::parse("cu yd"), Unit::Cy);
        assert_eq!(Unit::parse(""), Unit::None);
        assert_eq!(Unit::parse("bananas"), Unit::None);
    }

    #[test]
    fn test_section_order_matches_declaration() {
        let mut sorted = Discipline::SECTION_ORDER.to_vec();
        sorted.sort();
        assert_eq!(sorted, Discipline::SECTION_ORDER.to_vec());
    }

    #[test]
    fn test_column_letters_are_contiguous() {
        let letters: String = Column::ALL.iter().map(|c| c.letter()).collect();
        assert_eq!(letters, "ABCDEFGHIJK");
    }
}
