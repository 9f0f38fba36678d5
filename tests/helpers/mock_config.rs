// ==========================================
// Mock 策略实现 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use mes_orders::config::OrderPolicyReader;
use mes_orders::domain::OrderParameter;
use mes_orders::engine::{DEFAULT_AUDIT_DATE_TIME_FORMAT, DEFAULT_SCALE};
use std::error::Error;

/// Mock 策略结构
#[derive(Debug, Clone)]
pub struct MockPolicy {
    pub parameter: OrderParameter,
    pub scale: u32,
    pub date_time_format: String,
}

impl MockPolicy {
    /// 所有开关关闭
    pub fn default() -> Self {
        Self {
            parameter: OrderParameter::default(),
            scale: DEFAULT_SCALE,
            date_time_format: DEFAULT_AUDIT_DATE_TIME_FORMAT.to_string(),
        }
    }

    /// 所有原因开关打开
    pub fn strict() -> Self {
        Self {
            parameter: OrderParameter::all_reasons_required(),
            ..Self::default()
        }
    }

    /// 自定义策略参数
    pub fn with_parameter(parameter: OrderParameter) -> Self {
        Self {
            parameter,
            ..Self::default()
        }
    }
}

#[async_trait]
impl OrderPolicyReader for MockPolicy {
    async fn get_order_parameter(&self) -> Result<OrderParameter, Box<dyn Error>> {
        Ok(self.parameter.clone())
    }

    async fn get_number_scale(&self) -> Result<u32, Box<dyn Error>> {
        Ok(self.scale)
    }

    async fn get_audit_date_time_format(&self) -> Result<String, Box<dyn Error>> {
        Ok(self.date_time_format.clone())
    }
}
