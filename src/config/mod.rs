// ==========================================
// 配件目录管理系统 - 配置模块声明
// ==========================================

pub mod config_manager;

pub use config_manager::{config_keys, defaults, ConfigManager, ValidationLimits};
