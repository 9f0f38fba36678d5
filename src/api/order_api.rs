// ==========================================
// 生产订单管理 - 订单 API
// ==========================================
// 职责: 订单新建、保存、校验、复制、查询
// 流程: 读取快照 → 编排器(校验/对账/审计) → 持久化
// 红线: 校验失败返回 saved=false，存储失败返回 ApiError
// 事务: 订单写入与审计记录同一事务提交，审计单独失败不阻断订单写入
// ==========================================

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, OrderPolicyReader};
use crate::domain::order::Order;
use crate::domain::state_change::OrderStateChange;
use crate::domain::validation::{GlobalError, ValidationResult};
use crate::engine::collaborators::{ProductCatalog, TechnologyService, UserContext};
use crate::engine::date_reconciler::MissingBaseline;
use crate::engine::lifecycle::OrderLifecycle;
use crate::engine::orchestrator::{OrderSaveOrchestrator, OrderSaveOutcome, SavePolicy};
use crate::i18n;
use crate::repository::{OrderRepository, OrderStateChangeRepository};

// ==========================================
// OrderSaveResult - 保存结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSaveResult {
    /// 对账后的订单（saved=true 时即为已持久化的值）
    pub order: Order,
    pub validation: ValidationResult,
    pub saved: bool,
    /// 本次写入的审计记录
    pub audit_record: Option<OrderStateChange>,
    /// 非阻断告警（如缺少数量修正原因）
    pub warnings: Vec<GlobalError>,
    /// 审计写入失败原因（不影响订单保存）
    pub audit_error: Option<String>,
}

impl OrderSaveResult {
    fn from_outcome(outcome: OrderSaveOutcome, saved: bool) -> Self {
        Self {
            order: outcome.order,
            validation: outcome.validation,
            saved,
            audit_record: outcome.audit_record,
            warnings: outcome.quantities.warnings,
            audit_error: outcome.audit_error,
        }
    }

    /// 当前语言的结果摘要
    pub fn summary(&self) -> String {
        if self.saved {
            i18n::t("order.save.success")
        } else {
            i18n::t("order.save.failure")
        }
    }

    /// 全部错误与告警消息
    pub fn messages(&self) -> Vec<String> {
        let mut messages = self.validation.messages();
        messages.extend(self.warnings.iter().map(GlobalError::message));
        messages
    }
}

// ==========================================
// OrderApi - 订单 API
// ==========================================

/// 订单API
///
/// 职责：
/// 1. 新建/保存订单（对账流水线）
/// 2. 只读校验
/// 3. 复制订单
/// 4. 订单与审计记录查询
pub struct OrderApi<C = ConfigManager>
where
    C: OrderPolicyReader,
{
    order_repo: Arc<OrderRepository>,
    state_change_repo: Arc<OrderStateChangeRepository>,
    orchestrator: OrderSaveOrchestrator<C>,
}

impl<C> OrderApi<C>
where
    C: OrderPolicyReader,
{
    /// 创建新的OrderApi实例
    ///
    /// # 参数
    /// - order_repo: 订单仓储
    /// - state_change_repo: 审计记录仓储
    /// - config: 策略读取器
    /// - products: 产品目录
    /// - technology: 工艺服务
    /// - user: 当前用户上下文
    pub fn new(
        order_repo: Arc<OrderRepository>,
        state_change_repo: Arc<OrderStateChangeRepository>,
        config: Arc<C>,
        products: Arc<dyn ProductCatalog>,
        technology: Arc<dyn TechnologyService>,
        user: Arc<dyn UserContext>,
    ) -> Self {
        let orchestrator = OrderSaveOrchestrator::new(config, products, technology, user);
        Self {
            order_repo,
            state_change_repo,
            orchestrator,
        }
    }

    /// 指定快照缺少原始日期时的处理方式
    pub fn with_missing_baseline(mut self, missing_baseline: MissingBaseline) -> Self {
        self.orchestrator = self.orchestrator.with_missing_baseline(missing_baseline);
        self
    }

    async fn load_policy(&self) -> ApiResult<SavePolicy> {
        self.orchestrator
            .load_policy()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 新建订单
    ///
    /// # 返回
    /// - Ok(OrderSaveResult): saved=false 表示校验未通过
    /// - Err(ApiError): 输入非法或存储失败
    pub async fn create_order(&self, order: Order) -> ApiResult<OrderSaveResult> {
        if order.number.trim().is_empty() {
            return Err(ApiError::InvalidInput("订单号不能为空".to_string()));
        }
        if order.has_identity() {
            return Err(ApiError::InvalidInput("新建订单不能携带主键".to_string()));
        }

        let policy = self.load_policy().await?;
        let mut outcome = self
            .orchestrator
            .prepare_create(order, &policy)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        if !outcome.is_valid() {
            return Ok(OrderSaveResult::from_outcome(outcome, false));
        }

        let orchestrator = &self.orchestrator;
        let order_id = self.order_repo.in_transaction(|tx| {
            let order_id = OrderRepository::insert_tx(tx, &outcome.order)?;
            outcome.order.order_id = Some(order_id);

            let had_override = outcome.order.worker_to_change.is_some();
            match orchestrator.record_initial(tx, &mut outcome.order, &policy) {
                Ok(record) => {
                    outcome.audit_record = record;
                    if had_override {
                        OrderRepository::update_tx(tx, &outcome.order)?;
                    }
                }
                Err(e) => outcome.audit_error = Some(e.to_string()),
            }
            Ok(order_id)
        })?;

        info!(order_id, number = %outcome.order.number, "订单已创建");
        Ok(OrderSaveResult::from_outcome(outcome, true))
    }

    /// 保存订单（未持久化的订单按新建处理）
    ///
    /// # 流程
    /// 校验 → 日期对账 → 数量对账 → 工艺钩子 → 持久化（订单与审计同一事务）
    pub async fn save_order(&self, order: Order) -> ApiResult<OrderSaveResult> {
        let Some(order_id) = order.order_id else {
            return self.create_order(order).await;
        };

        let previous = self.order_repo.get(order_id)?;
        let policy = self.load_policy().await?;
        let mut outcome = self
            .orchestrator
            .process_save(order, &previous, &policy)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        if !outcome.is_valid() {
            return Ok(OrderSaveResult::from_outcome(outcome, false));
        }

        let orchestrator = &self.orchestrator;
        self.order_repo.in_transaction(|tx| {
            orchestrator.record_audit(tx, &mut outcome, &policy);
            OrderRepository::update_tx(tx, &outcome.order)
        })?;

        if let Some(error) = &outcome.audit_error {
            warn!(order_id, error = %error, "审计记录写入失败，订单已保存");
        }
        info!(
            order_id,
            state = %outcome.order.state,
            audited = outcome.audit_record.is_some(),
            "订单已保存"
        );
        Ok(OrderSaveResult::from_outcome(outcome, true))
    }

    /// 复制订单
    ///
    /// # 参数
    /// - order_id: 源订单
    /// - new_number: 副本订单号
    ///
    /// # 返回
    /// 已持久化的副本（PENDING）
    pub async fn copy_order(&self, order_id: i64, new_number: &str) -> ApiResult<Order> {
        if new_number.trim().is_empty() {
            return Err(ApiError::InvalidInput("订单号不能为空".to_string()));
        }

        let source = self.order_repo.get(order_id)?;
        let policy = self.load_policy().await?;
        let mut copy = OrderLifecycle::copy_of(&source, new_number, &policy.numbers);

        let validation = self.orchestrator.validate(&copy, None, &policy);
        if !validation.is_valid() {
            return Err(ApiError::ValidationFailed(validation));
        }

        let orchestrator = &self.orchestrator;
        let copy_id = self.order_repo.in_transaction(|tx| {
            let copy_id = OrderRepository::insert_tx(tx, &copy)?;
            copy.order_id = Some(copy_id);
            if let Err(e) = orchestrator.record_initial(tx, &mut copy, &policy) {
                warn!(order_id = copy_id, error = %e, "副本初始记录写入失败");
            }
            Ok(copy_id)
        })?;

        info!(source_id = order_id, copy_id, number = %copy.number, "订单已复制");
        Ok(copy)
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 只读校验（不落库）
    pub async fn validate_order(&self, order: &Order) -> ApiResult<ValidationResult> {
        let previous = match order.order_id {
            Some(id) => self.order_repo.find_by_id(id)?,
            None => None,
        };
        let policy = self.load_policy().await?;
        Ok(self.orchestrator.validate(order, previous.as_ref(), &policy))
    }

    /// 查询订单
    pub fn get_order(&self, order_id: i64) -> ApiResult<Order> {
        Ok(self.order_repo.get(order_id)?)
    }

    /// 查询订单的审计记录（按写入顺序）
    pub fn list_state_changes(&self, order_id: i64) -> ApiResult<Vec<OrderStateChange>> {
        Ok(self.state_change_repo.find_by_order_id(order_id)?)
    }
}
