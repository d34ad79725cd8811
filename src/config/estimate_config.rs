// ==========================================
// 施工算量清单编译器 - 估算配置
// ==========================================
// 职责: 流水线全部可调参数（系数 / 取整步长 / 工作表名）
// 说明: 核心只接收 &EstimateConfig,不读取文件或环境变量
// ==========================================

use serde::{Deserialize, Serialize};

/// 估算配置
///
/// 所有字段均可缺省,缺省值即行业常用值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateConfig {
    /// 松方系数（仅土方开挖）
    pub swell_factor: f64,

    /// 每立方码的立方英尺数
    pub cubic_feet_per_yard: f64,

    /// 桩长向上取整步长（英尺）
    pub height_round_step: f64,

    /// 钢管桩单位重量系数: (D - t) x t x 10.69
    pub pipe_weight_factor: f64,

    /// 分组键尺寸保留小数位
    pub group_key_decimals: u32,

    /// 壁厚笔误修正区间下限（含）
    pub thickness_typo_min: f64,

    /// 壁厚笔误修正区间上限（不含）
    pub thickness_typo_max: f64,

    /// 是否按原始行的 category 限定认领专业
    pub respect_category: bool,

    /// 明细工作表名
    pub detail_sheet_name: String,

    /// 汇总工作表名
    pub summary_sheet_name: String,

    /// 无构件的专业是否仍输出分段标题
    pub emit_empty_sections: bool,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            swell_factor: 1.3,
            cubic_feet_per_yard: 27.0,
            height_round_step: 5.0,
            pipe_weight_factor: 10.69,
            group_key_decimals: 2,
            thickness_typo_min: 100.0,
            thickness_typo_max: 1000.0,
            respect_category: true,
            detail_sheet_name: "Estimate".to_string(),
            summary_sheet_name: "Summary".to_string(),
            emit_empty_sections: false,
        }
    }
}

impl EstimateConfig {
    /// 校验配置取值
    ///
    /// # 返回
    /// - Ok(()): 全部合法
    /// - Err((key, message)): 第一个不合法的配置键及原因
    pub fn validate(&self) -> Result<(), (&'static str, String)> {
        use crate::config::config_keys as keys;

        if !(self.swell_factor.is_finite() && self.swell_factor >= 1.0) {
            return Err((keys::SWELL_FACTOR, "必须为 >= 1.0 的有限数".to_string()));
        }
        if !(self.cubic_feet_per_yard.is_finite() && self.cubic_feet_per_yard > 0.0) {
            return Err((keys::CUBIC_FEET_PER_YARD, "必须为正数".to_string()));
        }
        if !(self.height_round_step.is_finite() && self.height_round_step > 0.0) {
            return Err((keys::HEIGHT_ROUND_STEP, "必须为正数".to_string()));
        }
        if !(self.pipe_weight_factor.is_finite() && self.pipe_weight_factor > 0.0) {
            return Err((keys::PIPE_WEIGHT_FACTOR, "必须为正数".to_string()));
        }
        if self.group_key_decimals > 6 {
            return Err((keys::GROUP_KEY_DECIMALS, "不能超过 6".to_string()));
        }
        if self.thickness_typo_min >= self.thickness_typo_max {
            return Err((
                keys::THICKNESS_TYPO_MIN,
                format!(
                    "区间无效: [{}, {})",
                    self.thickness_typo_min, self.thickness_typo_max
                ),
            ));
        }
        if self.detail_sheet_name.trim().is_empty() {
            return Err((keys::DETAIL_SHEET_NAME, "不能为空".to_string()));
        }
        if self.summary_sheet_name.trim().is_empty()
            || self.summary_sheet_name == self.detail_sheet_name
        {
            return Err((keys::SUMMARY_SHEET_NAME, "不能为空且不能与明细表同名".to_string()));
        }
        Ok(())
    }
}
