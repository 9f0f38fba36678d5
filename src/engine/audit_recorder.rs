// ==========================================
// 生产订单管理 - 审计记录器
// ==========================================
// 职责: 非 PENDING 状态下受保护日期变更时写入状态变更审计记录
// 红线: 审计失败不阻断订单保存，记录一旦写入不可修改
// 事务: 记录写入调用方事务内的独立保存点，与订单写入同提交/同回滚
// ==========================================

use crate::domain::order::Order;
use crate::domain::state_change::OrderStateChange;
use crate::engine::collaborators::UserContext;
use crate::repository::error::RepositoryResult;
use crate::repository::OrderStateChangeRepository;
use chrono::Local;
use rusqlite::Transaction;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// 无会话用户时的操作人
pub const SYSTEM_WORKER: &str = "system";

/// 默认审计时间格式
pub const DEFAULT_AUDIT_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// AuditRecorder
// ==========================================
pub struct AuditRecorder {
    user: Arc<dyn UserContext>,
    date_time_format: String,
}

impl AuditRecorder {
    pub fn new(user: Arc<dyn UserContext>, date_time_format: impl Into<String>) -> Self {
        Self {
            user,
            date_time_format: date_time_format.into(),
        }
    }

    /// 构建日期变更审计记录（不落库）
    ///
    /// 未持久化的订单或无需审计时返回 None；
    /// 显式指定的操作人在构建后清空
    pub fn prepare(&self, order: &mut Order, audit_needed: bool) -> Option<OrderStateChange> {
        if !audit_needed || order.state.is_pending() {
            return None;
        }
        let order_id = order.order_id?;
        let worker = self.resolve_worker(order);
        Some(OrderStateChange::for_dates_change(
            Uuid::new_v4().to_string(),
            order_id,
            order,
            worker,
            self.timestamp(),
        ))
    }

    /// 按需写入审计记录
    ///
    /// # 返回
    /// - Ok(Some(record)): 已写入，dates_changed 已清除
    /// - Ok(None): 无需审计
    /// - Err(..): 写入失败（保存点已回滚），订单的 dates_changed 与操作人保持原值
    pub fn record_if_needed(
        &self,
        tx: &mut Transaction<'_>,
        order: &mut Order,
        audit_needed: bool,
    ) -> RepositoryResult<Option<OrderStateChange>> {
        let worker_override = order.worker_to_change.clone();
        let Some(record) = self.prepare(order, audit_needed) else {
            return Ok(None);
        };

        if let Err(e) = OrderStateChangeRepository::insert_in_savepoint(tx, &record) {
            warn!(
                order_id = record.order_id,
                error = %e,
                "审计记录写入失败"
            );
            order.worker_to_change = worker_override;
            return Err(e);
        }

        order.dates_changed = false;
        info!(
            order_id = record.order_id,
            state = %record.target_state,
            worker = %record.worker,
            state_change_id = %record.state_change_id,
            "日期变更审计记录已写入"
        );
        Ok(Some(record))
    }

    /// 新建订单的初始记录
    ///
    /// 写入失败时显式指定的操作人保持原值
    pub fn record_initial(
        &self,
        tx: &mut Transaction<'_>,
        order: &mut Order,
    ) -> RepositoryResult<Option<OrderStateChange>> {
        let Some(order_id) = order.order_id else {
            return Ok(None);
        };
        let worker_override = order.worker_to_change.clone();
        let worker = self.resolve_worker(order);
        let record = OrderStateChange::initial(
            Uuid::new_v4().to_string(),
            order_id,
            worker,
            self.timestamp(),
        );

        if let Err(e) = OrderStateChangeRepository::insert_in_savepoint(tx, &record) {
            warn!(order_id, error = %e, "订单初始记录写入失败");
            order.worker_to_change = worker_override;
            return Err(e);
        }
        info!(order_id, worker = %record.worker, "订单初始记录已写入");
        Ok(Some(record))
    }

    /// 操作人: 显式指定 > 会话用户 > system
    fn resolve_worker(&self, order: &mut Order) -> String {
        order
            .worker_to_change
            .take()
            .filter(|w| !w.trim().is_empty())
            .or_else(|| self.user.current_username())
            .unwrap_or_else(|| SYSTEM_WORKER.to_string())
    }

    /// 按配置格式输出当前时间，格式无法解析时回退默认格式
    fn timestamp(&self) -> String {
        let now = Local::now().naive_local();
        let mut formatted = String::new();
        if write!(formatted, "{}", now.format(&self.date_time_format)).is_err() {
            warn!(
                date_time_format = %self.date_time_format,
                "审计时间格式无效，使用默认格式"
            );
            return now.format(DEFAULT_AUDIT_DATE_TIME_FORMAT).to_string();
        }
        formatted
    }
}
