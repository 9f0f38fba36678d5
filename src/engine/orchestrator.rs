// ==========================================
// 生产订单管理 - 保存流程编排器
// ==========================================
// 用途: 协调校验与各对账引擎的执行顺序
// 流程: 校验 → (通过) 日期对账 → 数量对账 → 工艺钩子 → 审计
// 说明: 审计与订单写入由 API 层放入同一事务
// ==========================================

use crate::config::OrderPolicyReader;
use crate::domain::order::Order;
use crate::domain::parameter::OrderParameter;
use crate::domain::state_change::OrderStateChange;
use crate::domain::validation::ValidationResult;
use crate::engine::audit_recorder::AuditRecorder;
use crate::engine::collaborators::{ProductCatalog, TechnologyService, UserContext};
use crate::engine::date_reconciler::{DateFieldReconciler, DateReconciliation, MissingBaseline};
use crate::engine::lifecycle::OrderLifecycle;
use crate::engine::number::NumberContext;
use crate::engine::quantity_reconciler::{QuantityReconciler, QuantityReconciliation};
use crate::engine::validator::OrderValidator;
use crate::repository::error::RepositoryResult;
use rusqlite::Transaction;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info};

// ==========================================
// SavePolicy - 单次保存使用的策略快照
// ==========================================
#[derive(Debug, Clone)]
pub struct SavePolicy {
    pub parameter: OrderParameter,
    pub numbers: NumberContext,
    pub date_time_format: String,
}

// ==========================================
// OrderSaveOutcome - 编排结果
// ==========================================
#[derive(Debug, Clone)]
pub struct OrderSaveOutcome {
    pub order: Order,
    pub validation: ValidationResult,
    pub dates: DateReconciliation,
    pub quantities: QuantityReconciliation,
    pub audit_record: Option<OrderStateChange>,
    pub audit_error: Option<String>,
}

impl OrderSaveOutcome {
    fn rejected(order: Order, validation: ValidationResult) -> Self {
        Self {
            order,
            validation,
            dates: DateReconciliation::default(),
            quantities: QuantityReconciliation::default(),
            audit_record: None,
            audit_error: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }
}

// ==========================================
// OrderSaveOrchestrator - 保存流程编排器
// ==========================================
pub struct OrderSaveOrchestrator<C>
where
    C: OrderPolicyReader,
{
    config: Arc<C>,
    validator: OrderValidator,
    dates: DateFieldReconciler,
    technology: Arc<dyn TechnologyService>,
    user: Arc<dyn UserContext>,
}

impl<C> OrderSaveOrchestrator<C>
where
    C: OrderPolicyReader,
{
    /// 创建新的编排器实例
    pub fn new(
        config: Arc<C>,
        products: Arc<dyn ProductCatalog>,
        technology: Arc<dyn TechnologyService>,
        user: Arc<dyn UserContext>,
    ) -> Self {
        Self {
            config,
            validator: OrderValidator::new(products),
            dates: DateFieldReconciler::default(),
            technology,
            user,
        }
    }

    /// 指定快照缺少原始日期时的处理方式
    pub fn with_missing_baseline(mut self, missing_baseline: MissingBaseline) -> Self {
        self.dates = DateFieldReconciler::new(missing_baseline);
        self
    }

    /// 读取本次保存的策略快照
    pub async fn load_policy(&self) -> Result<SavePolicy, Box<dyn Error>> {
        let parameter = self.config.get_order_parameter().await?;
        let scale = self.config.get_number_scale().await?;
        let date_time_format = self.config.get_audit_date_time_format().await?;
        Ok(SavePolicy {
            parameter,
            numbers: NumberContext::new(scale),
            date_time_format,
        })
    }

    /// 只读校验
    pub fn validate(
        &self,
        order: &Order,
        previous: Option<&Order>,
        policy: &SavePolicy,
    ) -> ValidationResult {
        self.validator.validate(order, previous, &policy.parameter)
    }

    /// 新建订单流程（不含落库与初始记录）
    pub fn prepare_create(
        &self,
        mut order: Order,
        policy: &SavePolicy,
    ) -> Result<OrderSaveOutcome, Box<dyn Error + Send + Sync>> {
        let quantities = QuantityReconciler::new(policy.numbers);
        OrderLifecycle::prepare_new(&mut order, &policy.parameter, &quantities);

        let validation = self.validate(&order, None, policy);
        if !validation.is_valid() {
            debug!(number = %order.number, errors = validation.field_errors.len(), "新建订单校验未通过");
            return Ok(OrderSaveOutcome::rejected(order, validation));
        }

        let dates = self.dates.reconcile(&mut order, None);
        let quantity_result = quantities.reconcile(&mut order, None, &policy.parameter);
        self.technology.create_or_update_technology(&mut order)?;

        Ok(OrderSaveOutcome {
            order,
            validation,
            dates,
            quantities: quantity_result,
            audit_record: None,
            audit_error: None,
        })
    }

    /// 新建订单落库后写入初始记录（调用方事务内）
    pub fn record_initial(
        &self,
        tx: &mut Transaction<'_>,
        order: &mut Order,
        policy: &SavePolicy,
    ) -> RepositoryResult<Option<OrderStateChange>> {
        self.audit_recorder(policy).record_initial(tx, order)
    }

    /// 写入日期变更审计（调用方事务内）
    ///
    /// 写入失败记录在 audit_error，外层事务继续
    pub fn record_audit(
        &self,
        tx: &mut Transaction<'_>,
        outcome: &mut OrderSaveOutcome,
        policy: &SavePolicy,
    ) {
        let audit_needed = outcome.dates.audit_needed;
        match self
            .audit_recorder(policy)
            .record_if_needed(tx, &mut outcome.order, audit_needed)
        {
            Ok(record) => outcome.audit_record = record,
            Err(e) => outcome.audit_error = Some(e.to_string()),
        }
    }

    /// 已有订单保存流程
    ///
    /// # 参数
    /// - order: 待保存订单
    /// - previous: 上次持久化的快照
    /// - policy: 策略快照
    ///
    /// # 返回
    /// 编排结果；审计由 record_audit 在持久化事务内完成
    pub fn process_save(
        &self,
        mut order: Order,
        previous: &Order,
        policy: &SavePolicy,
    ) -> Result<OrderSaveOutcome, Box<dyn Error + Send + Sync>> {
        let validation = self.validate(&order, Some(previous), policy);
        if !validation.is_valid() {
            debug!(
                order_id = ?order.order_id,
                state = %order.state,
                errors = validation.field_errors.len(),
                "订单校验未通过，跳过对账"
            );
            return Ok(OrderSaveOutcome::rejected(order, validation));
        }

        // ==========================================
        // 步骤1: 日期对账
        // ==========================================
        let dates = self.dates.reconcile(&mut order, Some(previous));

        // ==========================================
        // 步骤2: 数量对账
        // ==========================================
        let quantities = QuantityReconciler::new(policy.numbers).reconcile(
            &mut order,
            Some(previous),
            &policy.parameter,
        );

        // ==========================================
        // 步骤3: 工艺钩子
        // ==========================================
        self.technology.create_or_update_technology(&mut order)?;

        info!(
            order_id = ?order.order_id,
            state = %order.state,
            routed = dates.routed.len(),
            audit_needed = dates.audit_needed,
            warnings = quantities.warnings.len(),
            "订单对账完成"
        );

        Ok(OrderSaveOutcome {
            order,
            validation,
            dates,
            quantities,
            audit_record: None,
            audit_error: None,
        })
    }

    fn audit_recorder(&self, policy: &SavePolicy) -> AuditRecorder {
        AuditRecorder::new(self.user.clone(), policy.date_time_format.clone())
    }
}
