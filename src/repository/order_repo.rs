// ==========================================
// 生产订单管理 - 订单数据仓储
// ==========================================
// 对齐: orders 表
// 红线: Repository 不含业务逻辑（对账规则全部在 engine 层）
// ==========================================

mod core;
mod queries;

#[cfg(test)]
mod tests;

pub use core::OrderRepository;
