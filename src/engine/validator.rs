// ==========================================
// 生产订单管理 - 订单校验引擎
// ==========================================
// 职责: 组合日期区间、数量、产品、原因策略检查
// 红线: 全部检查均执行（不短路），错误累积不抛出
// ==========================================

use crate::domain::order::{Order, OrderDateField, OrderField};
use crate::domain::parameter::OrderParameter;
use crate::domain::validation::{message_keys, ValidationResult};
use crate::engine::collaborators::ProductCatalog;
use crate::engine::date_range::{DateRange, DateRangeResolver};
use crate::engine::reason_policy::ReasonPolicyValidator;
use std::sync::Arc;
use tracing::debug;

// ==========================================
// OrderValidator
// ==========================================
pub struct OrderValidator {
    products: Arc<dyn ProductCatalog>,
}

impl OrderValidator {
    pub fn new(products: Arc<dyn ProductCatalog>) -> Self {
        Self { products }
    }

    /// 校验订单
    ///
    /// # 参数
    /// - order: 待保存订单
    /// - previous: 上次持久化的快照（首次保存为 None）
    /// - parameter: 策略参数
    ///
    /// # 返回
    /// ValidationResult，is_valid() 为全部检查结果的逻辑与
    pub fn validate(
        &self,
        order: &Order,
        previous: Option<&Order>,
        parameter: &OrderParameter,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();

        let checks = [
            check_order_dates(order, &mut result),
            check_planned_quantity(order, &mut result),
            self.check_product_not_removed(order, &mut result),
            ReasonPolicyValidator::check_start_correction(order, parameter, &mut result),
            ReasonPolicyValidator::check_end_correction(order, parameter, &mut result),
            ReasonPolicyValidator::check_effective_deviation(order, previous, parameter, &mut result),
            check_effective_dates(order, &mut result),
        ];

        debug!(
            order_id = ?order.order_id,
            state = %order.state,
            passed = checks.iter().filter(|c| **c).count(),
            total = checks.len(),
            "订单校验完成"
        );
        result
    }

    fn check_product_not_removed(&self, order: &Order, result: &mut ValidationResult) -> bool {
        match order.product_id.as_deref() {
            Some(product_id) if self.products.is_product_removed(product_id) => {
                result.add_error(
                    OrderField::Product,
                    message_keys::PRODUCT_REMOVED,
                    vec![product_id.to_string()],
                );
                false
            }
            _ => true,
        }
    }
}

/// 请求区间: 结束必须严格晚于开始
pub fn check_order_dates(order: &Order, result: &mut ValidationResult) -> bool {
    if DateRangeResolver::requested_range(order).is_ordered() {
        return true;
    }
    result.add_error(
        OrderField::Date(OrderDateField::FinishDate),
        message_keys::DATES_ORDER,
        vec![],
    );
    false
}

/// 设置了产品时计划数量必填
pub fn check_planned_quantity(order: &Order, result: &mut ValidationResult) -> bool {
    if order.product_id.is_some() && order.planned_quantity.is_none() {
        result.add_error(
            OrderField::PlannedQuantity,
            message_keys::PLANNED_QUANTITY_REQUIRED,
            vec![],
        );
        return false;
    }
    true
}

/// 实际区间: 实际结束不得早于实际开始
pub fn check_effective_dates(order: &Order, result: &mut ValidationResult) -> bool {
    let effective = DateRange::new(order.effective_date_from, order.effective_date_to);
    match (effective.from, effective.to) {
        (Some(from), Some(to)) if to < from => {
            result.add_error(
                OrderField::Date(OrderDateField::EffectiveDateTo),
                message_keys::EFFECTIVE_DATE_TO,
                vec![],
            );
            false
        }
        _ => true,
    }
}
