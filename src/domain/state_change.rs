// ==========================================
// 生产订单管理 - 订单状态变更审计记录
// ==========================================
// 红线: 记录创建后不可修改，只追加
// 用途: 非 PENDING 状态下受保护日期的修改追踪
// 对齐: order_state_change 表
// ==========================================

use crate::domain::order::Order;
use crate::domain::types::{OrderState, StateChangeStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// OrderStateChange - 状态变更审计记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStateChange {
    // ===== 主键 =====
    pub state_change_id: String,
    pub order_id: i64,

    // ===== 状态 =====
    pub source_state: Option<OrderState>, // 初始记录无来源状态
    pub target_state: OrderState,

    // ===== 日期快照（修改前）=====
    pub source_corrected_date_from: Option<NaiveDateTime>,
    pub source_corrected_date_to: Option<NaiveDateTime>,
    pub source_start_date: Option<NaiveDateTime>,
    pub source_finish_date: Option<NaiveDateTime>,

    // ===== 日期快照（修改后）=====
    pub target_corrected_date_from: Option<NaiveDateTime>,
    pub target_corrected_date_to: Option<NaiveDateTime>,
    pub target_start_date: Option<NaiveDateTime>,
    pub target_finish_date: Option<NaiveDateTime>,

    // ===== 元信息 =====
    pub dates_changed: bool,
    pub worker: String,
    pub date_and_time: String, // 按配置的文本格式记录
    pub status: StateChangeStatus,
}

impl OrderStateChange {
    /// 创建日期变更审计记录
    ///
    /// 来源/目标状态均取订单当前状态（本记录只追踪日期）
    ///
    /// # 参数
    /// - `state_change_id`: 记录ID (通常使用UUID)
    /// - `order_id`: 订单ID
    /// - `order`: 已完成日期对账的订单
    /// - `worker`: 操作人
    /// - `date_and_time`: 已格式化的时间戳
    pub fn for_dates_change(
        state_change_id: String,
        order_id: i64,
        order: &Order,
        worker: String,
        date_and_time: String,
    ) -> Self {
        Self {
            state_change_id,
            order_id,
            source_state: Some(order.state),
            target_state: order.state,
            source_corrected_date_from: order.source_corrected_date_from,
            source_corrected_date_to: order.source_corrected_date_to,
            source_start_date: order.source_start_date,
            source_finish_date: order.source_finish_date,
            target_corrected_date_from: order.corrected_date_from,
            target_corrected_date_to: order.corrected_date_to,
            target_start_date: order.start_date,
            target_finish_date: order.finish_date,
            dates_changed: true,
            worker,
            date_and_time,
            status: StateChangeStatus::Successful,
        }
    }

    /// 创建订单初始记录（新建订单进入 PENDING）
    pub fn initial(
        state_change_id: String,
        order_id: i64,
        worker: String,
        date_and_time: String,
    ) -> Self {
        Self {
            state_change_id,
            order_id,
            source_state: None,
            target_state: OrderState::Pending,
            source_corrected_date_from: None,
            source_corrected_date_to: None,
            source_start_date: None,
            source_finish_date: None,
            target_corrected_date_from: None,
            target_corrected_date_to: None,
            target_start_date: None,
            target_finish_date: None,
            dates_changed: false,
            worker,
            date_and_time,
            status: StateChangeStatus::Successful,
        }
    }

    /// 是否为日期变更记录
    pub fn is_dates_change(&self) -> bool {
        self.dates_changed
    }
}
