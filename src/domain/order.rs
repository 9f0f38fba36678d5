// ==========================================
// 生产订单管理 - 订单领域模型
// ==========================================
// 职责: 订单实体、日期字段/原因集合的类型化访问
// 红线: 不含数据访问逻辑，不含对账规则
// ==========================================

use crate::domain::types::{OrderState, OrderType};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// Order - 生产订单
// ==========================================
// 对齐: orders 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // ===== 主键与基本信息 =====
    pub order_id: Option<i64>, // None 表示尚未持久化（首次保存）
    pub number: String,
    pub name: Option<String>,
    pub state: OrderState,
    pub order_type: OrderType,
    pub product_id: Option<String>,
    pub technology_id: Option<String>,
    pub technology_prototype_id: Option<String>,

    // ===== 数量台账 =====
    pub planned_quantity: Option<Decimal>,
    pub commissioned_planned_quantity: Option<Decimal>,
    pub commissioned_corrected_quantity: Option<Decimal>,
    pub done_quantity: Option<Decimal>,
    pub wastes_quantity: Option<Decimal>,
    pub amount_of_product_produced: Option<Decimal>,
    pub remaining_amount_of_product_to_produce: Option<Decimal>,
    pub type_of_production_recording: Option<String>, // 报工方式，非空时覆盖双向同步

    // ===== 日期 =====
    pub start_date: Option<NaiveDateTime>,  // 用户录入的开始日期
    pub finish_date: Option<NaiveDateTime>, // 用户录入的结束日期
    pub date_from: Option<NaiveDateTime>,   // 计划开始（PENDING）
    pub date_to: Option<NaiveDateTime>,     // 计划结束（PENDING）
    pub corrected_date_from: Option<NaiveDateTime>,
    pub corrected_date_to: Option<NaiveDateTime>,
    pub effective_date_from: Option<NaiveDateTime>,
    pub effective_date_to: Option<NaiveDateTime>,

    // ===== 变更前快照（仅在非 PENDING 状态修改受保护日期时写入）=====
    pub source_corrected_date_from: Option<NaiveDateTime>,
    pub source_corrected_date_to: Option<NaiveDateTime>,
    pub source_start_date: Option<NaiveDateTime>,
    pub source_finish_date: Option<NaiveDateTime>,
    pub dates_changed: bool,

    // ===== 原因集合（为空即触发“需填写原因”）=====
    pub type_of_correction_causes: Vec<String>,
    pub reason_types_correction_date_from: Vec<String>,
    pub reason_types_correction_date_to: Vec<String>,
    pub reason_types_deviations_of_effective_start: Vec<String>,
    pub reason_types_deviations_of_effective_end: Vec<String>,

    // ===== 原因备注 =====
    pub comment_reason_type_correction_date_from: Option<String>,
    pub comment_reason_type_correction_date_to: Option<String>,
    pub comment_reason_deviation_effective_start: Option<String>,
    pub comment_reason_deviation_effective_end: Option<String>,
    pub comment_reason_type_deviations_quantity: Option<String>,

    // ===== 外部同步与附加设置 =====
    pub external_number: Option<String>,
    pub external_synchronized: bool,
    pub include_tpz: bool,
    pub include_additional_time: bool,

    // ===== 审计 =====
    pub worker_to_change: Option<String>, // 显式指定的操作人，写入审计后清空
}

impl Order {
    /// 创建新的待处理订单（未持久化）
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            order_id: None,
            number: number.into(),
            name: None,
            state: OrderState::Pending,
            order_type: OrderType::default(),
            product_id: None,
            technology_id: None,
            technology_prototype_id: None,
            planned_quantity: None,
            commissioned_planned_quantity: None,
            commissioned_corrected_quantity: None,
            done_quantity: None,
            wastes_quantity: None,
            amount_of_product_produced: None,
            remaining_amount_of_product_to_produce: None,
            type_of_production_recording: None,
            start_date: None,
            finish_date: None,
            date_from: None,
            date_to: None,
            corrected_date_from: None,
            corrected_date_to: None,
            effective_date_from: None,
            effective_date_to: None,
            source_corrected_date_from: None,
            source_corrected_date_to: None,
            source_start_date: None,
            source_finish_date: None,
            dates_changed: false,
            type_of_correction_causes: vec![],
            reason_types_correction_date_from: vec![],
            reason_types_correction_date_to: vec![],
            reason_types_deviations_of_effective_start: vec![],
            reason_types_deviations_of_effective_end: vec![],
            comment_reason_type_correction_date_from: None,
            comment_reason_type_correction_date_to: None,
            comment_reason_deviation_effective_start: None,
            comment_reason_deviation_effective_end: None,
            comment_reason_type_deviations_quantity: None,
            external_number: None,
            external_synchronized: true,
            include_tpz: false,
            include_additional_time: false,
            worker_to_change: None,
        }
    }

    /// 是否已持久化（有主键）
    pub fn has_identity(&self) -> bool {
        self.order_id.is_some()
    }

    /// 读取日期字段
    pub fn date(&self, field: OrderDateField) -> Option<NaiveDateTime> {
        match field {
            OrderDateField::StartDate => self.start_date,
            OrderDateField::FinishDate => self.finish_date,
            OrderDateField::DateFrom => self.date_from,
            OrderDateField::DateTo => self.date_to,
            OrderDateField::CorrectedDateFrom => self.corrected_date_from,
            OrderDateField::CorrectedDateTo => self.corrected_date_to,
            OrderDateField::EffectiveDateFrom => self.effective_date_from,
            OrderDateField::EffectiveDateTo => self.effective_date_to,
            OrderDateField::SourceCorrectedDateFrom => self.source_corrected_date_from,
            OrderDateField::SourceCorrectedDateTo => self.source_corrected_date_to,
            OrderDateField::SourceStartDate => self.source_start_date,
            OrderDateField::SourceFinishDate => self.source_finish_date,
        }
    }

    /// 写入日期字段
    pub fn set_date(&mut self, field: OrderDateField, value: Option<NaiveDateTime>) {
        let slot = match field {
            OrderDateField::StartDate => &mut self.start_date,
            OrderDateField::FinishDate => &mut self.finish_date,
            OrderDateField::DateFrom => &mut self.date_from,
            OrderDateField::DateTo => &mut self.date_to,
            OrderDateField::CorrectedDateFrom => &mut self.corrected_date_from,
            OrderDateField::CorrectedDateTo => &mut self.corrected_date_to,
            OrderDateField::EffectiveDateFrom => &mut self.effective_date_from,
            OrderDateField::EffectiveDateTo => &mut self.effective_date_to,
            OrderDateField::SourceCorrectedDateFrom => &mut self.source_corrected_date_from,
            OrderDateField::SourceCorrectedDateTo => &mut self.source_corrected_date_to,
            OrderDateField::SourceStartDate => &mut self.source_start_date,
            OrderDateField::SourceFinishDate => &mut self.source_finish_date,
        };
        *slot = value;
    }

    /// 读取原因集合
    pub fn reasons(&self, kind: ReasonKind) -> &[String] {
        match kind {
            ReasonKind::CorrectionCause => &self.type_of_correction_causes,
            ReasonKind::CorrectionDateFrom => &self.reason_types_correction_date_from,
            ReasonKind::CorrectionDateTo => &self.reason_types_correction_date_to,
            ReasonKind::DeviationEffectiveStart => &self.reason_types_deviations_of_effective_start,
            ReasonKind::DeviationEffectiveEnd => &self.reason_types_deviations_of_effective_end,
        }
    }

    /// 可变访问原因集合
    pub fn reasons_mut(&mut self, kind: ReasonKind) -> &mut Vec<String> {
        match kind {
            ReasonKind::CorrectionCause => &mut self.type_of_correction_causes,
            ReasonKind::CorrectionDateFrom => &mut self.reason_types_correction_date_from,
            ReasonKind::CorrectionDateTo => &mut self.reason_types_correction_date_to,
            ReasonKind::DeviationEffectiveStart => {
                &mut self.reason_types_deviations_of_effective_start
            }
            ReasonKind::DeviationEffectiveEnd => &mut self.reason_types_deviations_of_effective_end,
        }
    }
}

// ==========================================
// OrderDateField - 日期字段标识
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDateField {
    StartDate,
    FinishDate,
    DateFrom,
    DateTo,
    CorrectedDateFrom,
    CorrectedDateTo,
    EffectiveDateFrom,
    EffectiveDateTo,
    SourceCorrectedDateFrom,
    SourceCorrectedDateTo,
    SourceStartDate,
    SourceFinishDate,
}

/// 快照字段名单（按此顺序匹配）
pub const SOURCE_DATE_FIELDS: [OrderDateField; 4] = [
    OrderDateField::SourceCorrectedDateFrom,
    OrderDateField::SourceCorrectedDateTo,
    OrderDateField::SourceStartDate,
    OrderDateField::SourceFinishDate,
];

/// 受保护的日期字段（非 PENDING 状态修改需审计）
pub const PROTECTED_DATE_FIELDS: [OrderDateField; 4] = [
    OrderDateField::StartDate,
    OrderDateField::FinishDate,
    OrderDateField::CorrectedDateFrom,
    OrderDateField::CorrectedDateTo,
];

impl OrderDateField {
    /// 字段名（与 orders 表列名一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDateField::StartDate => "start_date",
            OrderDateField::FinishDate => "finish_date",
            OrderDateField::DateFrom => "date_from",
            OrderDateField::DateTo => "date_to",
            OrderDateField::CorrectedDateFrom => "corrected_date_from",
            OrderDateField::CorrectedDateTo => "corrected_date_to",
            OrderDateField::EffectiveDateFrom => "effective_date_from",
            OrderDateField::EffectiveDateTo => "effective_date_to",
            OrderDateField::SourceCorrectedDateFrom => "source_corrected_date_from",
            OrderDateField::SourceCorrectedDateTo => "source_corrected_date_to",
            OrderDateField::SourceStartDate => "source_start_date",
            OrderDateField::SourceFinishDate => "source_finish_date",
        }
    }

    /// 查找对应的快照字段
    ///
    /// 规则: 快照字段名（忽略大小写）包含当前字段名即匹配，取名单中第一个
    pub fn source_field(&self) -> Option<OrderDateField> {
        let target = self.as_str().to_lowercase();
        SOURCE_DATE_FIELDS
            .iter()
            .copied()
            .find(|source| source.as_str().to_lowercase().contains(&target))
    }
}

// ==========================================
// ReasonKind - 原因集合类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    CorrectionCause,         // 数量修正原因
    CorrectionDateFrom,      // 开始日期修正原因
    CorrectionDateTo,        // 结束日期修正原因
    DeviationEffectiveStart, // 实际开始偏差原因
    DeviationEffectiveEnd,   // 实际结束偏差原因
}

impl ReasonKind {
    /// 字段名（与 orders 表列名一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonKind::CorrectionCause => "type_of_correction_causes",
            ReasonKind::CorrectionDateFrom => "reason_types_correction_date_from",
            ReasonKind::CorrectionDateTo => "reason_types_correction_date_to",
            ReasonKind::DeviationEffectiveStart => "reason_types_deviations_of_effective_start",
            ReasonKind::DeviationEffectiveEnd => "reason_types_deviations_of_effective_end",
        }
    }
}

// ==========================================
// OrderField - 错误挂载字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderField {
    Date(OrderDateField),
    Reasons(ReasonKind),
    PlannedQuantity,
    Product,
}

impl OrderField {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderField::Date(field) => field.as_str(),
            OrderField::Reasons(kind) => kind.as_str(),
            OrderField::PlannedQuantity => "planned_quantity",
            OrderField::Product => "product",
        }
    }
}
