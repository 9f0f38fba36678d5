// ==========================================
// 生产订单管理 - 订单生命周期钩子
// ==========================================
// 职责:
// 1. 新建: 强制 PENDING、下达计划数量、工艺取自模板、附加设置取自策略
// 2. 复制: 副本回到 PENDING，执行期字段全部清空
// ==========================================

use crate::domain::order::{Order, ReasonKind, SOURCE_DATE_FIELDS};
use crate::domain::parameter::OrderParameter;
use crate::domain::types::OrderState;
use crate::engine::number::NumberContext;
use crate::engine::quantity_reconciler::QuantityReconciler;
use tracing::debug;

const ALL_REASON_KINDS: [ReasonKind; 5] = [
    ReasonKind::CorrectionCause,
    ReasonKind::CorrectionDateFrom,
    ReasonKind::CorrectionDateTo,
    ReasonKind::DeviationEffectiveStart,
    ReasonKind::DeviationEffectiveEnd,
];

pub struct OrderLifecycle;

impl OrderLifecycle {
    /// 新建订单的初始化
    pub fn prepare_new(
        order: &mut Order,
        parameter: &OrderParameter,
        quantities: &QuantityReconciler,
    ) {
        order.state = OrderState::Pending;
        order.dates_changed = false;
        quantities.set_commissioned_planned_quantity(order);
        order.technology_id = order.technology_prototype_id.clone();
        if !order.has_identity() {
            order.include_tpz = parameter.include_tpz_ps;
            order.include_additional_time = parameter.include_additional_time_ps;
        }
        debug!(
            number = %order.number,
            technology = ?order.technology_id,
            include_tpz = order.include_tpz,
            "新建订单初始化完成"
        );
    }

    /// 生成订单副本（未持久化）
    pub fn copy_of(source: &Order, number: impl Into<String>, numbers: &NumberContext) -> Order {
        let mut copy = source.clone();
        copy.order_id = None;
        copy.number = number.into();
        copy.state = OrderState::Pending;

        // ===== 日期 =====
        copy.effective_date_from = None;
        copy.effective_date_to = None;
        copy.corrected_date_from = None;
        copy.corrected_date_to = None;
        copy.date_from = copy.start_date;
        copy.date_to = copy.finish_date;
        for field in SOURCE_DATE_FIELDS {
            copy.set_date(field, None);
        }
        copy.dates_changed = false;

        // ===== 数量 =====
        copy.done_quantity = None;
        copy.wastes_quantity = None;
        copy.commissioned_planned_quantity = numbers.set_scale_opt(copy.planned_quantity);
        copy.commissioned_corrected_quantity = None;
        copy.amount_of_product_produced = None;
        copy.remaining_amount_of_product_to_produce = None;

        // ===== 外部同步 =====
        copy.external_number = None;
        copy.external_synchronized = true;

        // ===== 原因与备注 =====
        for kind in ALL_REASON_KINDS {
            copy.reasons_mut(kind).clear();
        }
        copy.comment_reason_type_correction_date_from = None;
        copy.comment_reason_type_correction_date_to = None;
        copy.comment_reason_deviation_effective_start = None;
        copy.comment_reason_deviation_effective_end = None;
        copy.comment_reason_type_deviations_quantity = None;

        copy.technology_id = copy.technology_prototype_id.clone();
        copy.worker_to_change = None;
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn test_prepare_new() {
        let parameter = OrderParameter {
            include_tpz_ps: true,
            ..OrderParameter::default()
        };
        let mut order = Order::new("ORD-NEW");
        order.state = OrderState::Accepted;
        order.planned_quantity = Some(Decimal::from(25));
        order.technology_prototype_id = Some("TECH-PROTO".to_string());

        OrderLifecycle::prepare_new(&mut order, &parameter, &QuantityReconciler::default());

        assert_eq!(order.state, OrderState::Pending);
        assert_eq!(order.commissioned_planned_quantity, Some(Decimal::from(25)));
        assert_eq!(order.technology_id, Some("TECH-PROTO".to_string()));
        assert!(order.include_tpz);
        assert!(!order.include_additional_time);
    }

    #[test]
    fn test_copy_resets_execution_fields() {
        let start = NaiveDate::from_ymd_opt(2025, 9, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        let finish = NaiveDate::from_ymd_opt(2025, 9, 4)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();

        let mut source = Order::new("ORD-SRC");
        source.order_id = Some(4);
        source.state = OrderState::Completed;
        source.start_date = Some(start);
        source.finish_date = Some(finish);
        source.effective_date_from = Some(start);
        source.corrected_date_to = Some(finish);
        source.source_start_date = Some(start);
        source.dates_changed = true;
        source.planned_quantity = Some(Decimal::from(40));
        source.commissioned_corrected_quantity = Some(Decimal::from(38));
        source.done_quantity = Some(Decimal::from(38));
        source.amount_of_product_produced = Some(Decimal::from(38));
        source.external_number = Some("EXT-1".to_string());
        source.external_synchronized = false;
        source.type_of_correction_causes.push("SCRAP".to_string());
        source.comment_reason_deviation_effective_end = Some("late".to_string());
        source.technology_id = Some("TECH-OWN".to_string());
        source.technology_prototype_id = Some("TECH-PROTO".to_string());

        let copy = OrderLifecycle::copy_of(&source, "ORD-COPY", &NumberContext::default());

        assert_eq!(copy.order_id, None);
        assert_eq!(copy.number, "ORD-COPY");
        assert_eq!(copy.state, OrderState::Pending);
        assert_eq!(copy.date_from, Some(start));
        assert_eq!(copy.date_to, Some(finish));
        assert_eq!(copy.effective_date_from, None);
        assert_eq!(copy.corrected_date_to, None);
        assert_eq!(copy.source_start_date, None);
        assert!(!copy.dates_changed);
        assert_eq!(copy.commissioned_planned_quantity, Some(Decimal::from(40)));
        assert_eq!(copy.commissioned_corrected_quantity, None);
        assert_eq!(copy.done_quantity, None);
        assert_eq!(copy.amount_of_product_produced, None);
        assert_eq!(copy.external_number, None);
        assert!(copy.external_synchronized);
        assert!(copy.type_of_correction_causes.is_empty());
        assert_eq!(copy.comment_reason_deviation_effective_end, None);
        assert_eq!(copy.technology_id, Some("TECH-PROTO".to_string()));
    }
}
