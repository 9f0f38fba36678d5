// ==========================================
// 生产订单管理 - 订单参数（策略开关）
// ==========================================
// 来源: config_kv 表（scope_id = 'global'）
// 说明: 对本模块只读，一次对账过程中视为不可变
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// OrderParameter - 订单策略参数
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderParameter {
    // ===== 日期修正原因 =====
    pub reason_needed_when_correcting_date_from: bool,
    pub reason_needed_when_correcting_date_to: bool,

    // ===== 实际日期偏差原因 =====
    pub reason_needed_when_delayed_effective_date_from: bool,
    pub reason_needed_when_earlier_effective_date_from: bool,
    pub reason_needed_when_delayed_effective_date_to: bool,
    pub reason_needed_when_earlier_effective_date_to: bool,

    // ===== 数量修正原因 =====
    pub reason_needed_when_correcting_the_requested_volume: bool,

    // ===== 新订单默认设置 =====
    pub include_tpz_ps: bool,
    pub include_additional_time_ps: bool,
}

impl OrderParameter {
    /// 全部原因开关打开（测试与严格模式使用）
    pub fn all_reasons_required() -> Self {
        Self {
            reason_needed_when_correcting_date_from: true,
            reason_needed_when_correcting_date_to: true,
            reason_needed_when_delayed_effective_date_from: true,
            reason_needed_when_earlier_effective_date_from: true,
            reason_needed_when_delayed_effective_date_to: true,
            reason_needed_when_earlier_effective_date_to: true,
            reason_needed_when_correcting_the_requested_volume: true,
            include_tpz_ps: false,
            include_additional_time_ps: false,
        }
    }
}
