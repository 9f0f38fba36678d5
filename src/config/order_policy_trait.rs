// ==========================================
// 生产订单管理 - 订单策略读取 Trait
// ==========================================
// 职责: 定义对账引擎所需的策略读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::parameter::OrderParameter;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// OrderPolicyReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait OrderPolicyReader: Send + Sync {
    /// 获取订单策略参数
    ///
    /// # 默认值
    /// - 所有开关 false
    async fn get_order_parameter(&self) -> Result<OrderParameter, Box<dyn Error>>;

    /// 获取数量小数位
    ///
    /// # 默认值
    /// - 5
    async fn get_number_scale(&self) -> Result<u32, Box<dyn Error>>;

    /// 获取审计时间格式（chrono strftime）
    ///
    /// # 默认值
    /// - "%Y-%m-%d %H:%M:%S"
    async fn get_audit_date_time_format(&self) -> Result<String, Box<dyn Error>>;
}
