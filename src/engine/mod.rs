// ==========================================
// 生产订单管理 - 引擎层
// ==========================================
// 职责: 实现订单一致性与对账规则,不拼 SQL
// 红线: Engine 不拼 SQL, 校验只汇总错误不抛出
// ==========================================

pub mod audit_recorder;
pub mod collaborators;
pub mod date_range;
pub mod date_reconciler;
pub mod lifecycle;
pub mod number;
pub mod orchestrator;
pub mod quantity_reconciler;
pub mod reason_policy;
pub mod validator;

// 重导出核心引擎
pub use audit_recorder::{AuditRecorder, DEFAULT_AUDIT_DATE_TIME_FORMAT, SYSTEM_WORKER};
pub use collaborators::{
    ActiveProductCatalog, NoOpTechnologyService, ProductCatalog, RemovedProductSet,
    StaticUserContext, TechnologyService, UserContext,
};
pub use date_range::{DateRange, DateRangeResolver};
pub use date_reconciler::{
    route_date_edit, DateChange, DateFieldReconciler, DateKind, DateReconciliation,
    MissingBaseline, DATE_ROUTES,
};
pub use lifecycle::OrderLifecycle;
pub use number::{format_elapsed, NumberContext, DEFAULT_SCALE};
pub use orchestrator::{OrderSaveOrchestrator, OrderSaveOutcome, SavePolicy};
pub use quantity_reconciler::{
    route_planned_quantity, QuantityReconciler, QuantityReconciliation, QuantityTarget,
};
pub use reason_policy::{ReasonPolicyValidator, CORRECTION_RULES, DEVIATION_RULES};
pub use validator::OrderValidator;
