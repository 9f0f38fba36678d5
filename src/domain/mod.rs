// ==========================================
// 生产订单管理 - 领域模型层
// ==========================================
// 职责: 定义订单实体、审计记录、策略参数、校验结果
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod order;
pub mod parameter;
pub mod state_change;
pub mod types;
pub mod validation;

// 重导出核心类型
pub use order::{
    Order, OrderDateField, OrderField, ReasonKind, PROTECTED_DATE_FIELDS, SOURCE_DATE_FIELDS,
};
pub use parameter::OrderParameter;
pub use state_change::OrderStateChange;
pub use types::{OrderState, OrderType, StateChangeStatus};
pub use validation::{message_keys, FieldError, GlobalError, ValidationResult};
