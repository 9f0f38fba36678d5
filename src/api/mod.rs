// ==========================================
// 生产订单管理 - API 层
// ==========================================
// 职责: 提供订单业务 API 接口,供宿主应用的保存/校验钩子调用
// ==========================================

pub mod error;
pub mod order_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use order_api::{OrderApi, OrderSaveResult};
