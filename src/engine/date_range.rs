// ==========================================
// 生产订单管理 - 日期区间解析
// ==========================================
// 职责: 从计划/修正/实际字段解析订单的权威日期区间
// 规则: 实际 > 修正 > 计划，逐端独立解析
// ==========================================

use crate::domain::order::{Order, OrderDateField};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 日期区间（两端均可为空）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Self {
        Self { from, to }
    }

    /// 两端均存在时，结束必须严格晚于开始
    pub fn is_ordered(&self) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => to > from,
            _ => true,
        }
    }
}

const FROM_PRIORITY: [OrderDateField; 3] = [
    OrderDateField::EffectiveDateFrom,
    OrderDateField::CorrectedDateFrom,
    OrderDateField::DateFrom,
];

const TO_PRIORITY: [OrderDateField; 3] = [
    OrderDateField::EffectiveDateTo,
    OrderDateField::CorrectedDateTo,
    OrderDateField::DateTo,
];

// ==========================================
// DateRangeResolver
// ==========================================
pub struct DateRangeResolver;

impl DateRangeResolver {
    /// 解析后的权威区间（不含用户原始录入）
    pub fn calculated_dates(order: &Order) -> DateRange {
        DateRange {
            from: first_present(order, &FROM_PRIORITY),
            to: first_present(order, &TO_PRIORITY),
        }
    }

    /// 校验使用的请求区间
    ///
    /// 用户录入的 start_date/finish_date 优先，缺失时回退到解析区间
    pub fn requested_range(order: &Order) -> DateRange {
        let calculated = Self::calculated_dates(order);
        DateRange {
            from: order.start_date.or(calculated.from),
            to: order.finish_date.or(calculated.to),
        }
    }

    /// 计划开始基准（修正优先于计划）
    pub fn planned_from(order: &Order) -> Option<NaiveDateTime> {
        order.corrected_date_from.or(order.date_from)
    }

    /// 计划结束基准（修正优先于计划）
    pub fn planned_to(order: &Order) -> Option<NaiveDateTime> {
        order.corrected_date_to.or(order.date_to)
    }
}

fn first_present(order: &Order, priority: &[OrderDateField]) -> Option<NaiveDateTime> {
    priority.iter().find_map(|field| order.date(*field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, d)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_priority_effective_over_corrected_over_requested() {
        let mut order = Order::new("ORD-1");
        order.date_from = Some(day(1));
        order.date_to = Some(day(10));
        assert_eq!(
            DateRangeResolver::calculated_dates(&order),
            DateRange::new(Some(day(1)), Some(day(10)))
        );

        order.corrected_date_from = Some(day(2));
        assert_eq!(DateRangeResolver::calculated_dates(&order).from, Some(day(2)));

        order.effective_date_from = Some(day(3));
        order.corrected_date_to = Some(day(12));
        let range = DateRangeResolver::calculated_dates(&order);
        assert_eq!(range.from, Some(day(3)));
        assert_eq!(range.to, Some(day(12)));
    }

    #[test]
    fn test_empty_order_has_no_range() {
        let order = Order::new("ORD-2");
        let range = DateRangeResolver::calculated_dates(&order);
        assert_eq!(range, DateRange::default());
        assert!(range.is_ordered());
    }

    #[test]
    fn test_requested_range_prefers_raw_input() {
        let mut order = Order::new("ORD-3");
        order.date_from = Some(day(1));
        order.date_to = Some(day(5));
        order.finish_date = Some(day(1));

        let range = DateRangeResolver::requested_range(&order);
        assert_eq!(range.from, Some(day(1)));
        assert_eq!(range.to, Some(day(1)));
        assert!(!range.is_ordered());
    }

    #[test]
    fn test_planned_baselines() {
        let mut order = Order::new("ORD-4");
        order.date_to = Some(day(9));
        assert_eq!(DateRangeResolver::planned_to(&order), Some(day(9)));
        order.corrected_date_to = Some(day(11));
        assert_eq!(DateRangeResolver::planned_to(&order), Some(day(11)));
        assert_eq!(DateRangeResolver::planned_from(&order), None);
    }
}
