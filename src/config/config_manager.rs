// ==========================================
// 施工算量清单编译器 - 配置管理器
// ==========================================
// 职责: 配置加载与覆写（缺省值 ← JSON 文件 ← 环境变量）
// 说明: 仅供二进制入口与外部调用方使用,核心流水线不读环境
// ==========================================

use crate::config::estimate_config::EstimateConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ConfigReadError { path: String, message: String },

    #[error("配置文件解析失败 ({path}): {message}")]
    ConfigParseError { path: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    file_path: Option<PathBuf>,
    /// 环境变量快照（键 → 值）,便于测试注入
    env: BTreeMap<String, String>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例,读取进程环境变量
    ///
    /// # 参数
    /// - file_path: 可选 JSON 配置文件路径
    pub fn new(file_path: Option<&Path>) -> Self {
        let env = std::env::vars()
            .filter(|(k, _)| k.starts_with(config_keys::ENV_PREFIX))
            .collect();
        Self {
            file_path: file_path.map(Path::to_path_buf),
            env,
        }
    }

    /// 使用给定环境变量快照创建（测试用）
    pub fn with_env(file_path: Option<&Path>, env: BTreeMap<String, String>) -> Self {
        Self {
            file_path: file_path.map(Path::to_path_buf),
            env,
        }
    }

    /// 加载配置: 缺省值 → 文件覆写 → 环境变量覆写 → 校验
    pub fn load(&self) -> Result<EstimateConfig, ConfigError> {
        let mut config = match &self.file_path {
            Some(path) => Self::load_file(path)?,
            None => EstimateConfig::default(),
        };

        self.apply_env_overrides(&mut config)?;

        config
            .validate()
            .map_err(|(key, message)| ConfigError::ConfigValueError {
                key: key.to_string(),
                value: self.describe_value(&config, key),
                message,
            })?;

        info!(
            swell_factor = config.swell_factor,
            height_round_step = config.height_round_step,
            respect_category = config.respect_category,
            "估算配置已加载"
        );
        Ok(config)
    }

    /// 从 JSON 文件读取配置（缺失字段取缺省值）
    fn load_file(path: &Path) -> Result<EstimateConfig, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigReadError {
            path: display.clone(),
            message: e.to_string(),
        })?;

        let config: EstimateConfig =
            serde_json::from_str(&raw).map_err(|e| ConfigError::ConfigParseError {
                path: display.clone(),
                message: e.to_string(),
            })?;

        debug!(path = %path.display(), "已读取配置文件");
        Ok(config)
    }

    fn env_value(&self, key: &str) -> Option<&str> {
        let env_key = format!("{}{}", config_keys::ENV_PREFIX, key.to_uppercase());
        self.env
            .get(&env_key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn parse_f64(&self, key: &str) -> Result<Option<f64>, ConfigError> {
        match self.env_value(key) {
            None => Ok(None),
            Some(v) => v.parse::<f64>().map(Some).map_err(|_| ConfigError::ConfigValueError {
                key: key.to_string(),
                value: v.to_string(),
                message: "无法解析为浮点数".to_string(),
            }),
        }
    }

    fn parse_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        match self.env_value(key) {
            None => Ok(None),
            Some(v) => match v.to_lowercase().as_str() {
                "1" | "true" | "yes" | "y" | "on" => Ok(Some(true)),
                "0" | "false" | "no" | "n" | "off" => Ok(Some(false)),
                _ => Err(ConfigError::ConfigValueError {
                    key: key.to_string(),
                    value: v.to_string(),
                    message: "无法解析为布尔值".to_string(),
                }),
            },
        }
    }

    fn apply_env_overrides(&self, config: &mut EstimateConfig) -> Result<(), ConfigError> {
        if let Some(v) = self.parse_f64(config_keys::SWELL_FACTOR)? {
            config.swell_factor = v;
        }
        if let Some(v) = self.parse_f64(config_keys::CUBIC_FEET_PER_YARD)? {
            config.cubic_feet_per_yard = v;
        }
        if let Some(v) = self.parse_f64(config_keys::HEIGHT_ROUND_STEP)? {
            config.height_round_step = v;
        }
        if let Some(v) = self.parse_f64(config_keys::PIPE_WEIGHT_FACTOR)? {
            config.pipe_weight_factor = v;
        }
        if let Some(v) = self.env_value(config_keys::GROUP_KEY_DECIMALS) {
            config.group_key_decimals =
                v.parse::<u32>()
                    .map_err(|_| ConfigError::ConfigValueError {
                        key: config_keys::GROUP_KEY_DECIMALS.to_string(),
                        value: v.to_string(),
                        message: "无法解析为非负整数".to_string(),
                    })?;
        }
        if let Some(v) = self.parse_bool(config_keys::RESPECT_CATEGORY)? {
            config.respect_category = v;
        }
        if let Some(v) = self.parse_bool(config_keys::EMIT_EMPTY_SECTIONS)? {
            config.emit_empty_sections = v;
        }
        if let Some(v) = self.env_value(config_keys::DETAIL_SHEET_NAME) {
            config.detail_sheet_name = v.to_string();
        }
        if let Some(v) = self.env_value(config_keys::SUMMARY_SHEET_NAME) {
            config.summary_sheet_name = v.to_string();
        }
        Ok(())
    }

    fn describe_value(&self, config: &EstimateConfig, key: &str) -> String {
        serde_json::to_value(config)
            .ok()
            .and_then(|v| v.get(key).map(|x| x.to_string()))
            .unwrap_or_default()
    }
}

// ==========================================
// 配置键（JSON 字段名;环境变量为 TAKEOFF_ + 大写键）
// ==========================================
pub mod config_keys {
    pub const ENV_PREFIX: &str = "TAKEOFF_";

    // 计算系数
    pub const SWELL_FACTOR: &str = "swell_factor";
    pub const CUBIC_FEET_PER_YARD: &str = "cubic_feet_per_yard";
    pub const PIPE_WEIGHT_FACTOR: &str = "pipe_weight_factor";

    // 取整与分组
    pub const HEIGHT_ROUND_STEP: &str = "height_round_step";
    pub const GROUP_KEY_DECIMALS: &str = "group_key_decimals";
    pub const THICKNESS_TYPO_MIN: &str = "thickness_typo_min";
    pub const THICKNESS_TYPO_MAX: &str = "thickness_typo_max";

    // 分类
    pub const RESPECT_CATEGORY: &str = "respect_category";

    // 输出
    pub const DETAIL_SHEET_NAME: &str = "detail_sheet_name";
    pub const SUMMARY_SHEET_NAME: &str = "summary_sheet_name";
    pub const EMIT_EMPTY_SECTIONS: &str = "emit_empty_sections";
}
