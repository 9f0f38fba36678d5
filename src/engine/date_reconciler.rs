// ==========================================
// 生产订单管理 - 日期字段对账引擎
// ==========================================
// 职责:
// 1. 受保护日期变更检测（非 PENDING 状态写快照字段、置脏标记）
// 2. 按状态把 start_date/finish_date 的修改路由到 计划/修正/实际 字段
// 3. 区间回填，保持原始录入字段与解析区间一致
// 输出: DateReconciliation（审计步骤直接消费，不回读脏标记）
// ==========================================

use crate::domain::order::{Order, OrderDateField, PROTECTED_DATE_FIELDS};
use crate::domain::types::OrderState;
use crate::engine::date_range::DateRangeResolver;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ==========================================
// 路由表
// ==========================================

/// 原始日期录入类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateKind {
    Start,
    Finish,
}

impl DateKind {
    /// 用户录入字段
    pub fn raw_field(&self) -> OrderDateField {
        match self {
            DateKind::Start => OrderDateField::StartDate,
            DateKind::Finish => OrderDateField::FinishDate,
        }
    }
}

/// (状态, 录入类型) → 目标字段
///
/// INTERRUPTED 下开始/结束日期的修改均不路由
pub const DATE_ROUTES: [(OrderState, DateKind, OrderDateField); 10] = [
    (OrderState::Pending, DateKind::Start, OrderDateField::DateFrom),
    (OrderState::Accepted, DateKind::Start, OrderDateField::CorrectedDateFrom),
    (OrderState::InProgress, DateKind::Start, OrderDateField::EffectiveDateFrom),
    (OrderState::Completed, DateKind::Start, OrderDateField::EffectiveDateFrom),
    (OrderState::Abandoned, DateKind::Start, OrderDateField::EffectiveDateFrom),
    (OrderState::Pending, DateKind::Finish, OrderDateField::DateTo),
    (OrderState::Accepted, DateKind::Finish, OrderDateField::CorrectedDateTo),
    (OrderState::InProgress, DateKind::Finish, OrderDateField::CorrectedDateTo),
    (OrderState::Completed, DateKind::Finish, OrderDateField::EffectiveDateTo),
    (OrderState::Abandoned, DateKind::Finish, OrderDateField::EffectiveDateTo),
];

/// 查路由表
pub fn route_date_edit(state: OrderState, kind: DateKind) -> Option<OrderDateField> {
    DATE_ROUTES
        .iter()
        .find(|(s, k, _)| *s == state && *k == kind)
        .map(|(_, _, target)| *target)
}

// ==========================================
// 基准缺失策略
// ==========================================

/// 已持久化订单缺少原始日期时的比较基准
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingBaseline {
    /// 无法比较，跳过路由
    #[default]
    Skip,
    /// 以当前时间作为基准（兼容旧行为，几乎总判定为已修改）
    DefaultToNow,
}

// ==========================================
// 对账输出
// ==========================================

/// 单个受保护字段的变更
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateChange {
    pub field: OrderDateField,
    pub source_field: Option<OrderDateField>,
    pub old_value: NaiveDateTime,
    pub new_value: NaiveDateTime,
}

/// 日期对账结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateReconciliation {
    /// 是否需要写审计记录
    pub audit_needed: bool,
    /// 本次检测到的受保护字段变更
    pub changes: Vec<DateChange>,
    /// 本次路由写入的目标字段
    pub routed: Vec<(DateKind, OrderDateField)>,
}

// ==========================================
// DateFieldReconciler
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DateFieldReconciler {
    missing_baseline: MissingBaseline,
}

impl DateFieldReconciler {
    pub fn new(missing_baseline: MissingBaseline) -> Self {
        Self { missing_baseline }
    }

    /// 日期对账（主入口）
    ///
    /// # 参数
    /// - order: 待保存订单（原地修改）
    /// - previous: 上次持久化的快照（首次保存为 None）
    ///
    /// # 返回
    /// - DateReconciliation: 审计步骤消费的结果
    pub fn reconcile(&self, order: &mut Order, previous: Option<&Order>) -> DateReconciliation {
        let mut result = DateReconciliation::default();

        // === 步骤 1: 变更检测（基于用户录入与快照）===
        if let Some(prev) = previous {
            for field in PROTECTED_DATE_FIELDS {
                let new_value = order.date(field);
                if let Some(change) = set_date_changed(order, field, prev.date(field), new_value) {
                    result.changes.push(change);
                }
            }
        }

        // === 步骤 2: 按状态路由 ===
        if order.has_identity() {
            for kind in [DateKind::Start, DateKind::Finish] {
                if let Some(target) = self.route(order, previous, kind) {
                    result.routed.push((kind, target));
                }
            }
        }

        // === 步骤 3: 区间回填 ===
        fill_start_date(order);
        fill_end_date(order);

        result.audit_needed = order.dates_changed && !order.state.is_pending();
        result
    }

    fn route(&self, order: &mut Order, previous: Option<&Order>, kind: DateKind) -> Option<OrderDateField> {
        let raw_field = kind.raw_field();
        let value = order.date(raw_field)?;

        let baseline = match previous.and_then(|p| p.date(raw_field)) {
            Some(date) => date,
            None => match self.missing_baseline {
                MissingBaseline::Skip => return None,
                MissingBaseline::DefaultToNow => chrono::Local::now().naive_local(),
            },
        };
        if baseline == value {
            return None;
        }

        let target = route_date_edit(order.state, kind)?;
        debug!(
            order_id = ?order.order_id,
            state = %order.state,
            field = target.as_str(),
            "日期修改路由"
        );
        order.set_date(target, Some(value));
        Some(target)
    }
}

/// 受保护日期变更检测
///
/// 新旧值均存在、不相等且状态不是 PENDING 时：
/// 置 dates_changed，并把旧值写入对应的快照字段
pub fn set_date_changed(
    order: &mut Order,
    field: OrderDateField,
    old_value: Option<NaiveDateTime>,
    new_value: Option<NaiveDateTime>,
) -> Option<DateChange> {
    let (old_value, new_value) = match (old_value, new_value) {
        (Some(old), Some(new)) => (old, new),
        _ => return None,
    };
    if order.state.is_pending() || old_value == new_value {
        return None;
    }

    order.dates_changed = true;
    let source_field = field.source_field();
    if let Some(source) = source_field {
        order.set_date(source, Some(old_value));
    }

    Some(DateChange {
        field,
        source_field,
        old_value,
        new_value,
    })
}

/// 开始日期回填
///
/// 解析区间无开始 → 计划开始取原始录入；否则原始录入被解析值覆盖
pub fn fill_start_date(order: &mut Order) {
    let range = DateRangeResolver::calculated_dates(order);
    match range.from {
        None => order.date_from = order.start_date,
        Some(from) => order.start_date = Some(from),
    }
}

/// 结束日期回填
pub fn fill_end_date(order: &mut Order) {
    let range = DateRangeResolver::calculated_dates(order);
    match range.to {
        None => order.date_to = order.finish_date,
        Some(to) => order.finish_date = Some(to),
    }
}
