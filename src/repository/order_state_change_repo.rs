// ==========================================
// 生产订单管理 - 订单状态变更审计仓储
// ==========================================
// 对齐: order_state_change 表
// 红线: 只追加，不提供更新/删除
// ==========================================

mod core;


pub use core::OrderStateChangeRepository;
