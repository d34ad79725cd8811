// ==========================================
// 施工算量清单编译器 - 配置层
// ==========================================
// 职责: 估算参数定义、加载与校验
// 来源: 缺省值 / JSON 文件 / TAKEOFF_* 环境变量
// ==========================================

pub mod config_manager;
pub mod estimate_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigError, ConfigManager};
pub use estimate_config::EstimateConfig;
