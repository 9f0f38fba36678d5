// ==========================================
// 生产订单管理 - 领域类型定义
// ==========================================
// 职责: 订单生命周期状态、订单类型、状态变更结果码
// 存储: 数据库中保存 string value（与历史数据一致）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 订单状态 (Order State)
// ==========================================
// 生命周期: PENDING → ACCEPTED → IN_PROGRESS ⇄ INTERRUPTED → COMPLETED | ABANDONED
// 顺序: 按声明顺序比较（Ord）
// 说明: 状态迁移由外部状态机驱动，本模块只根据当前状态做字段对账
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    Pending,     // 待处理（计划阶段）
    Accepted,    // 已接受
    InProgress,  // 进行中
    Interrupted, // 已中断
    Completed,   // 已完成
    Abandoned,   // 已放弃
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderState::Pending => write!(f, "PENDING"),
            OrderState::Accepted => write!(f, "ACCEPTED"),
            OrderState::InProgress => write!(f, "IN_PROGRESS"),
            OrderState::Interrupted => write!(f, "INTERRUPTED"),
            OrderState::Completed => write!(f, "COMPLETED"),
            OrderState::Abandoned => write!(f, "ABANDONED"),
        }
    }
}

impl OrderState {
    /// 全部状态（按生命周期顺序）
    pub const ALL: [OrderState; 6] = [
        OrderState::Pending,
        OrderState::Accepted,
        OrderState::InProgress,
        OrderState::Interrupted,
        OrderState::Completed,
        OrderState::Abandoned,
    ];

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            OrderState::Pending => "01pending",
            OrderState::Accepted => "02accepted",
            OrderState::InProgress => "03inProgress",
            OrderState::Completed => "04completed",
            OrderState::Interrupted => "06interrupted",
            OrderState::Abandoned => "07abandoned",
        }
    }

    /// 从数据库字符串解析状态
    ///
    /// 同时接受 Display 形式（如 "IN_PROGRESS"），便于配置与测试数据录入
    pub fn from_db_str(s: &str) -> Option<Self> {
        OrderState::ALL
            .iter()
            .copied()
            .find(|state| state.to_db_str() == s || state.to_string() == s.to_uppercase())
    }

    /// 是否处于计划阶段（不产生审计记录）
    pub fn is_pending(&self) -> bool {
        matches!(self, OrderState::Pending)
    }
}

// ==========================================
// 订单类型 (Order Type)
// ==========================================
// 区分工艺来源: 模板工艺 / 订单自有工艺
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    WithPatternTechnology, // 基于模板工艺
    WithOwnTechnology,     // 订单自有工艺
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::WithPatternTechnology => write!(f, "WITH_PATTERN_TECHNOLOGY"),
            OrderType::WithOwnTechnology => write!(f, "WITH_OWN_TECHNOLOGY"),
        }
    }
}

impl OrderType {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            OrderType::WithPatternTechnology => "01withPatternTechnology",
            OrderType::WithOwnTechnology => "02withOwnTechnology",
        }
    }

    /// 从字符串解析订单类型
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "01withPatternTechnology" | "WITH_PATTERN_TECHNOLOGY" => {
                Some(OrderType::WithPatternTechnology)
            }
            "02withOwnTechnology" | "WITH_OWN_TECHNOLOGY" => Some(OrderType::WithOwnTechnology),
            _ => None,
        }
    }
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::WithPatternTechnology
    }
}

// ==========================================
// 状态变更结果码 (State Change Status)
// ==========================================
// 审计记录只由对账流程写入，结果码固定为成功
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateChangeStatus {
    InProgress, // 处理中
    Paused,     // 暂停
    Successful, // 成功
    Failure,    // 失败
    Canceled,   // 取消
}

impl StateChangeStatus {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            StateChangeStatus::InProgress => "01inProgress",
            StateChangeStatus::Paused => "02paused",
            StateChangeStatus::Successful => "03successful",
            StateChangeStatus::Failure => "04failure",
            StateChangeStatus::Canceled => "05canceled",
        }
    }

    /// 从字符串解析结果码
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "01inProgress" => Some(StateChangeStatus::InProgress),
            "02paused" => Some(StateChangeStatus::Paused),
            "03successful" => Some(StateChangeStatus::Successful),
            "04failure" => Some(StateChangeStatus::Failure),
            "05canceled" => Some(StateChangeStatus::Canceled),
            _ => None,
        }
    }
}
