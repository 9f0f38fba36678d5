// ==========================================
// 生产订单管理 - 校验结果
// ==========================================
// 红线: 校验不抛错，只汇总结构化错误 (field, message_key, args)
// 说明: 翻译由 i18n 层完成，本结构只携带 message key
// ==========================================

use crate::domain::order::OrderField;
use crate::i18n;
use serde::{Deserialize, Serialize};

/// 消息键常量
pub mod message_keys {
    pub const DATES_ORDER: &str = "order.error.dates_order";
    pub const EFFECTIVE_DATE_TO: &str = "order.error.effective_date_to";
    pub const PLANNED_QUANTITY_REQUIRED: &str = "order.error.planned_quantity_required";
    pub const PRODUCT_REMOVED: &str = "order.error.product_removed";
    pub const REASON_CORRECTION_DATE_FROM_REQUIRED: &str =
        "order.error.reason_correction_date_from_required";
    pub const REASON_CORRECTION_DATE_TO_REQUIRED: &str =
        "order.error.reason_correction_date_to_required";
    pub const REASON_DELAYED_EFFECTIVE_DATE_FROM_REQUIRED: &str =
        "order.error.reason_delayed_effective_date_from_required";
    pub const REASON_EARLIER_EFFECTIVE_DATE_FROM_REQUIRED: &str =
        "order.error.reason_earlier_effective_date_from_required";
    pub const REASON_DELAYED_EFFECTIVE_DATE_TO_REQUIRED: &str =
        "order.error.reason_delayed_effective_date_to_required";
    pub const REASON_EARLIER_EFFECTIVE_DATE_TO_REQUIRED: &str =
        "order.error.reason_earlier_effective_date_to_required";
    pub const MISSING_CORRECTION_CAUSES: &str = "order.error.missing_correction_causes";
}

// ==========================================
// FieldError - 字段级错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: OrderField,
    pub message_key: String,
    pub args: Vec<String>,
}

// ==========================================
// GlobalError - 非字段错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalError {
    pub message_key: String,
    pub args: Vec<String>,
}

impl GlobalError {
    pub fn new(message_key: &str) -> Self {
        Self {
            message_key: message_key.to_string(),
            args: vec![],
        }
    }

    /// 翻译为当前语言的消息
    pub fn message(&self) -> String {
        translate(&self.message_key, &self.args)
    }
}

// ==========================================
// ValidationResult - 校验结果汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub field_errors: Vec<FieldError>,
    pub global_errors: Vec<GlobalError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// 挂载字段错误
    pub fn add_error(&mut self, field: OrderField, message_key: &str, args: Vec<String>) {
        self.field_errors.push(FieldError {
            field,
            message_key: message_key.to_string(),
            args,
        });
    }

    /// 挂载全局错误
    pub fn add_global_error(&mut self, message_key: &str) {
        self.global_errors.push(GlobalError::new(message_key));
    }

    /// 无任何错误即通过
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty() && self.global_errors.is_empty()
    }

    /// 查找字段错误
    pub fn error_for(&self, field: OrderField) -> Option<&FieldError> {
        self.field_errors.iter().find(|e| e.field == field)
    }

    /// 合并另一个结果
    pub fn merge(&mut self, other: ValidationResult) {
        self.field_errors.extend(other.field_errors);
        self.global_errors.extend(other.global_errors);
    }

    /// 渲染为可读消息（字段名: 消息）
    pub fn messages(&self) -> Vec<String> {
        let mut result: Vec<String> = self
            .field_errors
            .iter()
            .map(|e| format!("{}: {}", e.field.as_str(), translate(&e.message_key, &e.args)))
            .collect();
        result.extend(self.global_errors.iter().map(GlobalError::message));
        result
    }
}

fn translate(key: &str, args: &[String]) -> String {
    let named: Vec<(String, &str)> = args
        .iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v.as_str()))
        .collect();
    let pairs: Vec<(&str, &str)> = named.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    i18n::t_with_args(key, &pairs)
}
