// ==========================================
// 生产订单管理 - 核心库
// ==========================================
// 定位: 订单状态一致性与对账引擎
// 技术栈: Rust + SQLite
// 流程: 校验 → 日期对账 → 数量对账 → 审计 → 持久化
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 策略参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{OrderState, OrderType, StateChangeStatus};

// 领域实体
pub use domain::{
    Order, OrderDateField, OrderField, OrderParameter, OrderStateChange, ReasonKind,
    ValidationResult,
};

// 引擎
pub use engine::{
    AuditRecorder, DateFieldReconciler, DateRangeResolver, NumberContext, OrderSaveOrchestrator,
    OrderValidator, QuantityReconciler, ReasonPolicyValidator,
};

// API
pub use api::{ApiError, ApiResult, OrderApi, OrderSaveResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "生产订单管理";
