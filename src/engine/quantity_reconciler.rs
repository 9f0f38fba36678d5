// ==========================================
// 生产订单管理 - 数量对账引擎
// ==========================================
// 职责:
// 1. 计划数量 ⇄ 下达计划/下达修正数量
// 2. 完成数量 ⇄ 已产出数量（报工方式可覆盖）
// 3. 剩余待产数量重算
// 4. 数量修正原因检查（仅告警，不阻断保存）
// 约定: 空值与 0 等价，比较按数值而非引用
// ==========================================

use crate::domain::order::{Order, ReasonKind};
use crate::domain::parameter::OrderParameter;
use crate::domain::types::OrderState;
use crate::domain::validation::{message_keys, GlobalError};
use crate::engine::number::{differs, null_to_zero, NumberContext};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// 计划数量变更的写入目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityTarget {
    CommissionedPlanned,
    CommissionedCorrected,
}

/// 状态 → 计划数量写入目标
pub const PLANNED_QUANTITY_ROUTES: [(OrderState, QuantityTarget); 4] = [
    (OrderState::Pending, QuantityTarget::CommissionedPlanned),
    (OrderState::Accepted, QuantityTarget::CommissionedCorrected),
    (OrderState::InProgress, QuantityTarget::CommissionedCorrected),
    (OrderState::Interrupted, QuantityTarget::CommissionedCorrected),
];

/// 需要检查数量修正原因的状态
const CORRECTION_CAUSE_STATES: [OrderState; 3] = [
    OrderState::Accepted,
    OrderState::InProgress,
    OrderState::Interrupted,
];

pub fn route_planned_quantity(state: OrderState) -> Option<QuantityTarget> {
    PLANNED_QUANTITY_ROUTES
        .iter()
        .find(|(s, _)| *s == state)
        .map(|(_, target)| *target)
}

/// 数量对账结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityReconciliation {
    /// 计划数量变更写入的目标（None 表示未变更或走了反向级联）
    pub planned_routed_to: Option<QuantityTarget>,
    /// 非阻断的全局错误
    pub warnings: Vec<GlobalError>,
}

// ==========================================
// QuantityReconciler
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct QuantityReconciler {
    numbers: NumberContext,
}

impl QuantityReconciler {
    pub fn new(numbers: NumberContext) -> Self {
        Self { numbers }
    }

    /// 数量对账（主入口）
    ///
    /// # 参数
    /// - order: 待保存订单（原地修改）
    /// - previous: 上次持久化的快照（首次保存为 None）
    /// - parameter: 策略参数
    pub fn reconcile(
        &self,
        order: &mut Order,
        previous: Option<&Order>,
        parameter: &OrderParameter,
    ) -> QuantityReconciliation {
        let mut result = QuantityReconciliation::default();

        match previous.filter(|_| order.has_identity()) {
            Some(prev) => {
                result.planned_routed_to = self.reconcile_planned(order, prev);
                self.reconcile_produced(order, prev);
            }
            None => self.set_commissioned_planned_quantity(order),
        }

        self.set_remaining_quantity(order);

        if let Some(warning) = self.check_correction_causes(order, previous, parameter) {
            result.warnings.push(warning);
        }
        result
    }

    /// 首次保存: 计划数量锁定为下达计划数量
    pub fn set_commissioned_planned_quantity(&self, order: &mut Order) {
        if let Some(planned) = order.planned_quantity {
            order.commissioned_planned_quantity = Some(self.numbers.set_scale(planned));
        }
    }

    fn reconcile_planned(&self, order: &mut Order, previous: &Order) -> Option<QuantityTarget> {
        if differs(order.planned_quantity, previous.planned_quantity) {
            let target = route_planned_quantity(order.state)?;
            let scaled = self.numbers.set_scale_opt(order.planned_quantity);
            match target {
                QuantityTarget::CommissionedPlanned => order.commissioned_planned_quantity = scaled,
                QuantityTarget::CommissionedCorrected => {
                    order.commissioned_corrected_quantity = scaled
                }
            }
            debug!(
                order_id = ?order.order_id,
                state = %order.state,
                target = ?target,
                "计划数量变更已下达"
            );
            return Some(target);
        }

        // 计划数量未变: 反向级联（修正优先）
        if null_to_zero(order.commissioned_corrected_quantity) != Decimal::ZERO {
            order.planned_quantity = self.numbers.set_scale_opt(order.commissioned_corrected_quantity);
        } else if null_to_zero(order.commissioned_planned_quantity) != Decimal::ZERO {
            order.planned_quantity = self.numbers.set_scale_opt(order.commissioned_planned_quantity);
        }
        None
    }

    fn reconcile_produced(&self, order: &mut Order, previous: &Order) {
        let recording_mode_set = order
            .type_of_production_recording
            .as_deref()
            .map_or(false, |mode| !mode.is_empty());

        if recording_mode_set {
            order.amount_of_product_produced = self.numbers.set_scale_opt(order.done_quantity);
            return;
        }

        if differs(order.done_quantity, previous.done_quantity) {
            order.amount_of_product_produced = self.numbers.set_scale_opt(order.done_quantity);
        } else if differs(
            order.amount_of_product_produced,
            previous.amount_of_product_produced,
        ) {
            order.done_quantity = self.numbers.set_scale_opt(order.amount_of_product_produced);
        }
    }

    /// 剩余待产 = max(0, 计划) − max(0, 已产出)
    pub fn set_remaining_quantity(&self, order: &mut Order) {
        let planned = null_to_zero(order.planned_quantity).max(Decimal::ZERO);
        let produced = null_to_zero(order.amount_of_product_produced).max(Decimal::ZERO);
        order.remaining_amount_of_product_to_produce =
            Some(self.numbers.subtract(planned, produced));
    }

    /// 数量修正原因检查
    ///
    /// 仅在策略开启、订单已持久化且处于 ACCEPTED/IN_PROGRESS/INTERRUPTED 时生效
    pub fn check_correction_causes(
        &self,
        order: &Order,
        previous: Option<&Order>,
        parameter: &OrderParameter,
    ) -> Option<GlobalError> {
        if !parameter.reason_needed_when_correcting_the_requested_volume || !order.has_identity() {
            return None;
        }
        if !CORRECTION_CAUSE_STATES.contains(&order.state) {
            return None;
        }

        let previous_corrected = previous.and_then(|p| p.commissioned_corrected_quantity);
        if differs(order.commissioned_corrected_quantity, previous_corrected)
            && order.reasons(ReasonKind::CorrectionCause).is_empty()
        {
            warn!(
                order_id = ?order.order_id,
                state = %order.state,
                "修正计划数量缺少修正原因"
            );
            return Some(GlobalError::new(message_keys::MISSING_CORRECTION_CAUSES));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn persisted(state: OrderState, planned: &str) -> Order {
        let mut order = Order::new("ORD-QTY");
        order.order_id = Some(1);
        order.state = state;
        order.planned_quantity = Some(dec(planned));
        order.commissioned_planned_quantity = Some(dec(planned));
        order
    }

    #[test]
    fn test_first_save_commissions_planned_quantity() {
        let mut order = Order::new("ORD-NEW");
        order.planned_quantity = Some(dec("10"));

        let result = QuantityReconciler::default().reconcile(
            &mut order,
            None,
            &OrderParameter::default(),
        );

        assert_eq!(order.commissioned_planned_quantity, Some(dec("10")));
        assert_eq!(
            order.commissioned_planned_quantity.unwrap().to_string(),
            "10.00000"
        );
        assert_eq!(order.remaining_amount_of_product_to_produce, Some(dec("10")));
        assert!(result.warnings.is_empty());
        assert_eq!(result.planned_routed_to, None);
    }

    #[test]
    fn test_pending_planned_change_goes_to_commissioned_planned() {
        let previous = persisted(OrderState::Pending, "10");
        let mut order = previous.clone();
        order.planned_quantity = Some(dec("12"));

        let result =
            QuantityReconciler::default().reconcile(&mut order, Some(&previous), &OrderParameter::default());

        assert_eq!(result.planned_routed_to, Some(QuantityTarget::CommissionedPlanned));
        assert_eq!(order.commissioned_planned_quantity, Some(dec("12")));
        assert_eq!(order.commissioned_corrected_quantity, None);
    }

    #[test]
    fn test_accepted_planned_change_goes_to_commissioned_corrected() {
        for state in [OrderState::Accepted, OrderState::InProgress, OrderState::Interrupted] {
            let previous = persisted(state, "10");
            let mut order = previous.clone();
            order.planned_quantity = Some(dec("8"));

            QuantityReconciler::default().reconcile(&mut order, Some(&previous), &OrderParameter::default());

            assert_eq!(order.commissioned_corrected_quantity, Some(dec("8")));
            assert_eq!(order.commissioned_planned_quantity, Some(dec("10")));
        }
    }

    #[test]
    fn test_completed_planned_change_is_not_propagated() {
        let previous = persisted(OrderState::Completed, "10");
        let mut order = previous.clone();
        order.planned_quantity = Some(dec("9"));

        let result =
            QuantityReconciler::default().reconcile(&mut order, Some(&previous), &OrderParameter::default());

        assert_eq!(result.planned_routed_to, None);
        assert_eq!(order.planned_quantity, Some(dec("9")));
        assert_eq!(order.commissioned_corrected_quantity, None);
    }

    #[test]
    fn test_unchanged_planned_cascades_from_corrected_first() {
        let mut previous = persisted(OrderState::Accepted, "10");
        previous.commissioned_corrected_quantity = Some(dec("7"));
        let mut order = previous.clone();

        QuantityReconciler::default().reconcile(&mut order, Some(&previous), &OrderParameter::default());
        assert_eq!(order.planned_quantity, Some(dec("7")));

        let mut only_planned = persisted(OrderState::Accepted, "10");
        only_planned.commissioned_planned_quantity = Some(dec("11"));
        let snapshot = only_planned.clone();
        QuantityReconciler::default().reconcile(&mut only_planned, Some(&snapshot), &OrderParameter::default());
        assert_eq!(only_planned.planned_quantity, Some(dec("11")));
    }

    #[test]
    fn test_zero_and_null_are_equal() {
        let mut previous = persisted(OrderState::Pending, "0");
        previous.planned_quantity = None;
        previous.commissioned_planned_quantity = None;
        let mut order = previous.clone();
        order.planned_quantity = Some(Decimal::ZERO);

        let result =
            QuantityReconciler::default().reconcile(&mut order, Some(&previous), &OrderParameter::default());
        assert_eq!(result.planned_routed_to, None);
        assert_eq!(order.commissioned_planned_quantity, None);
    }

    #[test]
    fn test_done_quantity_syncs_both_ways() {
        let previous = persisted(OrderState::InProgress, "10");

        let mut done_edit = previous.clone();
        done_edit.done_quantity = Some(dec("4"));
        QuantityReconciler::default().reconcile(&mut done_edit, Some(&previous), &OrderParameter::default());
        assert_eq!(done_edit.amount_of_product_produced, Some(dec("4")));
        assert_eq!(done_edit.remaining_amount_of_product_to_produce, Some(dec("6")));

        let mut produced_edit = previous.clone();
        produced_edit.amount_of_product_produced = Some(dec("3"));
        QuantityReconciler::default().reconcile(&mut produced_edit, Some(&previous), &OrderParameter::default());
        assert_eq!(produced_edit.done_quantity, Some(dec("3")));
    }

    #[test]
    fn test_recording_mode_forces_produced_from_done() {
        let mut previous = persisted(OrderState::InProgress, "10");
        previous.done_quantity = Some(dec("2"));
        previous.amount_of_product_produced = Some(dec("2"));
        let mut order = previous.clone();
        order.type_of_production_recording = Some("02cumulated".to_string());
        order.amount_of_product_produced = Some(dec("5"));

        QuantityReconciler::default().reconcile(&mut order, Some(&previous), &OrderParameter::default());

        assert_eq!(order.amount_of_product_produced, Some(dec("2")));
        assert_eq!(order.done_quantity, Some(dec("2")));
    }

    #[test]
    fn test_remaining_floors_negative_inputs() {
        let mut order = Order::new("ORD-NEG");
        order.planned_quantity = Some(dec("-5"));
        order.amount_of_product_produced = Some(dec("-2"));
        QuantityReconciler::default().set_remaining_quantity(&mut order);
        assert_eq!(order.remaining_amount_of_product_to_produce, Some(Decimal::ZERO));

        order.planned_quantity = Some(dec("5"));
        order.amount_of_product_produced = Some(dec("7.5"));
        QuantityReconciler::default().set_remaining_quantity(&mut order);
        assert_eq!(order.remaining_amount_of_product_to_produce, Some(dec("-2.5")));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let reconciler = QuantityReconciler::default();
        let previous = persisted(OrderState::Accepted, "10");
        let mut order = previous.clone();
        order.planned_quantity = Some(dec("15"));
        order.done_quantity = Some(dec("6"));

        reconciler.reconcile(&mut order, Some(&previous), &OrderParameter::default());
        let first = order.clone();
        reconciler.reconcile(&mut order, Some(&previous), &OrderParameter::default());

        assert_eq!(order, first);
    }

    #[test]
    fn test_correction_cause_warning() {
        let parameter = OrderParameter {
            reason_needed_when_correcting_the_requested_volume: true,
            ..OrderParameter::default()
        };
        let previous = persisted(OrderState::Accepted, "10");
        let mut order = previous.clone();
        order.planned_quantity = Some(dec("9"));

        let result = QuantityReconciler::default().reconcile(&mut order, Some(&previous), &parameter);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].message_key, message_keys::MISSING_CORRECTION_CAUSES);

        let mut with_cause = previous.clone();
        with_cause.planned_quantity = Some(dec("9"));
        with_cause.type_of_correction_causes.push("CUSTOMER_REQUEST".to_string());
        let result = QuantityReconciler::default().reconcile(&mut with_cause, Some(&previous), &parameter);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_correction_cause_disabled_by_policy() {
        let previous = persisted(OrderState::Accepted, "10");
        let mut order = previous.clone();
        order.planned_quantity = Some(dec("9"));

        let result =
            QuantityReconciler::default().reconcile(&mut order, Some(&previous), &OrderParameter::default());
        assert!(result.warnings.is_empty());
    }
}
