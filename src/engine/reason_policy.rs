// ==========================================
// 生产订单管理 - 原因策略校验
// ==========================================
// 职责: 按策略参数检查日期修正/实际偏差是否附带原因
// 规则表: (状态集合, 日期字段, 原因集合, 策略开关, 消息键)
// 红线: 策略开关为 false 时不产生任何错误
// ==========================================

use crate::domain::order::{Order, OrderDateField, OrderField, ReasonKind};
use crate::domain::parameter::OrderParameter;
use crate::domain::types::OrderState;
use crate::domain::validation::{message_keys, ValidationResult};
use crate::engine::date_range::DateRangeResolver;
use crate::engine::number::format_elapsed;
use chrono::NaiveDateTime;
use tracing::debug;

// ==========================================
// 修正原因规则
// ==========================================
pub struct CorrectionRule {
    pub states: &'static [OrderState],
    pub date_field: OrderDateField,
    pub reason: ReasonKind,
    pub enabled: fn(&OrderParameter) -> bool,
    pub message_key: &'static str,
}

pub const CORRECTION_RULES: [CorrectionRule; 2] = [
    CorrectionRule {
        states: &[OrderState::Accepted],
        date_field: OrderDateField::CorrectedDateFrom,
        reason: ReasonKind::CorrectionDateFrom,
        enabled: |p| p.reason_needed_when_correcting_date_from,
        message_key: message_keys::REASON_CORRECTION_DATE_FROM_REQUIRED,
    },
    CorrectionRule {
        states: &[
            OrderState::Accepted,
            OrderState::InProgress,
            OrderState::Interrupted,
        ],
        date_field: OrderDateField::CorrectedDateTo,
        reason: ReasonKind::CorrectionDateTo,
        enabled: |p| p.reason_needed_when_correcting_date_to,
        message_key: message_keys::REASON_CORRECTION_DATE_TO_REQUIRED,
    },
];

// ==========================================
// 实际偏差规则
// ==========================================

/// 偏差方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deviation {
    Delayed, // 晚于基准
    Earlier, // 早于基准
}

pub struct DeviationRule {
    pub states: &'static [OrderState],
    pub date_field: OrderDateField,
    pub reason: ReasonKind,
    pub direction: Deviation,
    pub enabled: fn(&OrderParameter) -> bool,
    pub message_key: &'static str,
}

const EFFECTIVE_FROM_STATES: &[OrderState] = &[
    OrderState::Completed,
    OrderState::Abandoned,
    OrderState::InProgress,
    OrderState::Interrupted,
];

const EFFECTIVE_TO_STATES: &[OrderState] = &[OrderState::Completed, OrderState::Abandoned];

pub const DEVIATION_RULES: [DeviationRule; 4] = [
    DeviationRule {
        states: EFFECTIVE_FROM_STATES,
        date_field: OrderDateField::EffectiveDateFrom,
        reason: ReasonKind::DeviationEffectiveStart,
        direction: Deviation::Delayed,
        enabled: |p| p.reason_needed_when_delayed_effective_date_from,
        message_key: message_keys::REASON_DELAYED_EFFECTIVE_DATE_FROM_REQUIRED,
    },
    DeviationRule {
        states: EFFECTIVE_FROM_STATES,
        date_field: OrderDateField::EffectiveDateFrom,
        reason: ReasonKind::DeviationEffectiveStart,
        direction: Deviation::Earlier,
        enabled: |p| p.reason_needed_when_earlier_effective_date_from,
        message_key: message_keys::REASON_EARLIER_EFFECTIVE_DATE_FROM_REQUIRED,
    },
    DeviationRule {
        states: EFFECTIVE_TO_STATES,
        date_field: OrderDateField::EffectiveDateTo,
        reason: ReasonKind::DeviationEffectiveEnd,
        direction: Deviation::Delayed,
        enabled: |p| p.reason_needed_when_delayed_effective_date_to,
        message_key: message_keys::REASON_DELAYED_EFFECTIVE_DATE_TO_REQUIRED,
    },
    DeviationRule {
        states: EFFECTIVE_TO_STATES,
        date_field: OrderDateField::EffectiveDateTo,
        reason: ReasonKind::DeviationEffectiveEnd,
        direction: Deviation::Earlier,
        enabled: |p| p.reason_needed_when_earlier_effective_date_to,
        message_key: message_keys::REASON_EARLIER_EFFECTIVE_DATE_TO_REQUIRED,
    },
];

// ==========================================
// ReasonPolicyValidator
// ==========================================
pub struct ReasonPolicyValidator;

impl ReasonPolicyValidator {
    /// 开始日期修正原因（仅 ACCEPTED）
    pub fn check_start_correction(
        order: &Order,
        parameter: &OrderParameter,
        result: &mut ValidationResult,
    ) -> bool {
        check_correction(&CORRECTION_RULES[0], order, parameter, result)
    }

    /// 结束日期修正原因（ACCEPTED / IN_PROGRESS / INTERRUPTED）
    pub fn check_end_correction(
        order: &Order,
        parameter: &OrderParameter,
        result: &mut ValidationResult,
    ) -> bool {
        check_correction(&CORRECTION_RULES[1], order, parameter, result)
    }

    /// 实际日期偏差原因
    ///
    /// 偏差 = 当前实际日期 − 基准（上次持久化的实际日期，缺失时用修正/计划日期）
    /// 每条规则独立评估，错误携带 HH:MM:SS 格式的偏差时长
    pub fn check_effective_deviation(
        order: &Order,
        previous: Option<&Order>,
        parameter: &OrderParameter,
        result: &mut ValidationResult,
    ) -> bool {
        let mut valid = true;
        for rule in DEVIATION_RULES.iter() {
            if !rule.states.contains(&order.state) || !(rule.enabled)(parameter) {
                continue;
            }
            let Some(difference) = effective_difference(order, previous, rule.date_field) else {
                continue;
            };
            let matches = match rule.direction {
                Deviation::Delayed => difference > 0,
                Deviation::Earlier => difference < 0,
            };
            if !matches || !order.reasons(rule.reason).is_empty() {
                continue;
            }

            debug!(
                order_id = ?order.order_id,
                state = %order.state,
                field = rule.date_field.as_str(),
                difference,
                "实际日期偏差缺少原因"
            );
            result.add_error(
                OrderField::Reasons(rule.reason),
                rule.message_key,
                vec![format_elapsed(difference)],
            );
            valid = false;
        }
        valid
    }
}

fn check_correction(
    rule: &CorrectionRule,
    order: &Order,
    parameter: &OrderParameter,
    result: &mut ValidationResult,
) -> bool {
    if !rule.states.contains(&order.state) || !(rule.enabled)(parameter) {
        return true;
    }
    if order.date(rule.date_field).is_some() && order.reasons(rule.reason).is_empty() {
        result.add_error(OrderField::Reasons(rule.reason), rule.message_key, vec![]);
        return false;
    }
    true
}

/// 实际日期相对基准的偏差（秒），任一端缺失返回 None
pub fn effective_difference(
    order: &Order,
    previous: Option<&Order>,
    field: OrderDateField,
) -> Option<i64> {
    let current = order.date(field)?;
    let baseline = deviation_baseline(order, previous, field)?;
    Some((current - baseline).num_seconds())
}

fn deviation_baseline(
    order: &Order,
    previous: Option<&Order>,
    field: OrderDateField,
) -> Option<NaiveDateTime> {
    if let Some(recorded) = previous.and_then(|p| p.date(field)) {
        return Some(recorded);
    }
    match field {
        OrderDateField::EffectiveDateFrom => DateRangeResolver::planned_from(order),
        OrderDateField::EffectiveDateTo => DateRangeResolver::planned_to(order),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, d)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn order_in(state: OrderState) -> Order {
        let mut order = Order::new("ORD-R");
        order.order_id = Some(7);
        order.state = state;
        order
    }

    #[test]
    fn test_start_correction_requires_reason_when_accepted() {
        let parameter = OrderParameter {
            reason_needed_when_correcting_date_from: true,
            ..OrderParameter::default()
        };
        let mut order = order_in(OrderState::Accepted);
        order.corrected_date_from = Some(day(2));

        let mut result = ValidationResult::new();
        assert!(!ReasonPolicyValidator::check_start_correction(&order, &parameter, &mut result));
        let error = result
            .error_for(OrderField::Reasons(ReasonKind::CorrectionDateFrom))
            .unwrap();
        assert_eq!(error.message_key, message_keys::REASON_CORRECTION_DATE_FROM_REQUIRED);

        order.reason_types_correction_date_from.push("LATE_MATERIAL".to_string());
        let mut result = ValidationResult::new();
        assert!(ReasonPolicyValidator::check_start_correction(&order, &parameter, &mut result));
        assert!(result.is_valid());
    }

    #[test]
    fn test_start_correction_ignored_outside_accepted() {
        let parameter = OrderParameter::all_reasons_required();
        let mut order = order_in(OrderState::InProgress);
        order.corrected_date_from = Some(day(2));

        let mut result = ValidationResult::new();
        assert!(ReasonPolicyValidator::check_start_correction(&order, &parameter, &mut result));
        assert!(result.is_valid());
    }

    #[test]
    fn test_end_correction_states() {
        let parameter = OrderParameter::all_reasons_required();
        for state in OrderState::ALL {
            let mut order = order_in(state);
            order.corrected_date_to = Some(day(9));
            let mut result = ValidationResult::new();
            let passed = ReasonPolicyValidator::check_end_correction(&order, &parameter, &mut result);
            let expected_failure = matches!(
                state,
                OrderState::Accepted | OrderState::InProgress | OrderState::Interrupted
            );
            assert_eq!(passed, !expected_failure, "state={}", state);
        }
    }

    #[test]
    fn test_policy_off_never_raises() {
        let parameter = OrderParameter::default();
        let mut previous = order_in(OrderState::Completed);
        previous.effective_date_from = Some(day(1));
        previous.effective_date_to = Some(day(5));
        let mut order = previous.clone();
        order.effective_date_from = Some(day(3));
        order.effective_date_to = Some(day(2));
        order.corrected_date_from = Some(day(1));
        order.corrected_date_to = Some(day(4));

        let mut result = ValidationResult::new();
        ReasonPolicyValidator::check_start_correction(&order, &parameter, &mut result);
        ReasonPolicyValidator::check_end_correction(&order, &parameter, &mut result);
        ReasonPolicyValidator::check_effective_deviation(&order, Some(&previous), &parameter, &mut result);
        assert!(result.is_valid());
    }

    #[test]
    fn test_delayed_effective_start_carries_elapsed() {
        let parameter = OrderParameter::all_reasons_required();
        let mut previous = order_in(OrderState::InProgress);
        previous.effective_date_from = Some(day(1));
        let mut order = previous.clone();
        order.effective_date_from = Some(day(3));

        let mut result = ValidationResult::new();
        assert!(!ReasonPolicyValidator::check_effective_deviation(
            &order,
            Some(&previous),
            &parameter,
            &mut result
        ));
        let error = result
            .error_for(OrderField::Reasons(ReasonKind::DeviationEffectiveStart))
            .unwrap();
        assert_eq!(
            error.message_key,
            message_keys::REASON_DELAYED_EFFECTIVE_DATE_FROM_REQUIRED
        );
        assert_eq!(error.args, vec!["48:00:00".to_string()]);
    }

    #[test]
    fn test_earlier_effective_end_against_planned_baseline() {
        let parameter = OrderParameter::all_reasons_required();
        let mut order = order_in(OrderState::Completed);
        order.date_to = Some(day(10));
        order.effective_date_to = Some(day(9));

        let mut result = ValidationResult::new();
        ReasonPolicyValidator::check_effective_deviation(&order, None, &parameter, &mut result);
        let error = result
            .error_for(OrderField::Reasons(ReasonKind::DeviationEffectiveEnd))
            .unwrap();
        assert_eq!(
            error.message_key,
            message_keys::REASON_EARLIER_EFFECTIVE_DATE_TO_REQUIRED
        );
        assert_eq!(error.args, vec!["24:00:00".to_string()]);
    }

    #[test]
    fn test_effective_end_ignored_while_in_progress() {
        let parameter = OrderParameter::all_reasons_required();
        let mut order = order_in(OrderState::InProgress);
        order.date_to = Some(day(10));
        order.effective_date_to = Some(day(12));

        let mut result = ValidationResult::new();
        assert!(ReasonPolicyValidator::check_effective_deviation(&order, None, &parameter, &mut result));
    }

    #[test]
    fn test_no_deviation_no_error() {
        let parameter = OrderParameter::all_reasons_required();
        let mut previous = order_in(OrderState::Completed);
        previous.effective_date_from = Some(day(1));
        previous.effective_date_to = Some(day(5));
        let order = previous.clone();

        let mut result = ValidationResult::new();
        assert!(ReasonPolicyValidator::check_effective_deviation(
            &order,
            Some(&previous),
            &parameter,
            &mut result
        ));
        assert_eq!(effective_difference(&order, Some(&previous), OrderDateField::EffectiveDateTo), Some(0));
    }
}
