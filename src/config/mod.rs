// ==========================================
// 生产订单管理 - 配置层
// ==========================================
// 职责: 订单策略参数管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod order_policy_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, is_valid_date_time_format, parse_flag, ConfigManager};
pub use order_policy_trait::OrderPolicyReader;
