// ==========================================
// 班产损失追踪系统 - 配置层
// ==========================================
// 职责: 系统配置管理 (产线范围、远程存储地址)
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, EngineConfig, DEFAULT_PRODUCTION_LINES};
