// ==========================================
// 生产订单管理 - 数值上下文
// ==========================================
// 职责: 统一数量的小数位与舍入规则（进程内共享）
// 规则: 固定 scale + 银行家舍入
// ==========================================

use rust_decimal::{Decimal, RoundingStrategy};

/// 默认小数位
pub const DEFAULT_SCALE: u32 = 5;

// ==========================================
// NumberContext
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberContext {
    scale: u32,
    strategy: RoundingStrategy,
}

impl NumberContext {
    pub fn new(scale: u32) -> Self {
        Self {
            scale,
            strategy: RoundingStrategy::MidpointNearestEven,
        }
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// 按默认上下文设置小数位
    pub fn set_scale(&self, value: Decimal) -> Decimal {
        let mut scaled = value.round_dp_with_strategy(self.scale, self.strategy);
        scaled.rescale(self.scale);
        scaled
    }

    /// 可空版本
    pub fn set_scale_opt(&self, value: Option<Decimal>) -> Option<Decimal> {
        value.map(|v| self.set_scale(v))
    }

    /// 减法（结果按上下文舍入）
    pub fn subtract(&self, minuend: Decimal, subtrahend: Decimal) -> Decimal {
        self.set_scale(minuend - subtrahend)
    }
}

impl Default for NumberContext {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE)
    }
}

/// 空值视为 0
pub fn null_to_zero(value: Option<Decimal>) -> Decimal {
    value.unwrap_or(Decimal::ZERO)
}

/// 两个可空数量是否不同（空值视为 0，按数值比较）
pub fn differs(a: Option<Decimal>, b: Option<Decimal>) -> bool {
    null_to_zero(a) != null_to_zero(b)
}

/// 时长格式化: 秒 → HH:MM:SS（取绝对值，小时不封顶）
pub fn format_elapsed(seconds: i64) -> String {
    let total = seconds.unsigned_abs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_set_scale_pads_and_rounds() {
        let ctx = NumberContext::default();
        let scaled = ctx.set_scale(Decimal::from(10));
        assert_eq!(scaled.to_string(), "10.00000");
        assert_eq!(scaled, Decimal::from(10));

        let rounded = ctx.set_scale(Decimal::from_str("1.234565").unwrap());
        assert_eq!(rounded.to_string(), "1.23456"); // 银行家舍入
    }

    #[test]
    fn test_subtract() {
        let ctx = NumberContext::new(2);
        let result = ctx.subtract(
            Decimal::from_str("10.5").unwrap(),
            Decimal::from_str("3.25").unwrap(),
        );
        assert_eq!(result.to_string(), "7.25");
    }

    #[test]
    fn test_null_semantics() {
        assert_eq!(null_to_zero(None), Decimal::ZERO);
        assert!(!differs(None, Some(Decimal::ZERO)));
        assert!(differs(Some(Decimal::ONE), None));
        assert!(!differs(
            Some(Decimal::from_str("2.00").unwrap()),
            Some(Decimal::from(2))
        ));
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00:00");
        assert_eq!(format_elapsed(3_661), "01:01:01");
        assert_eq!(format_elapsed(-172_800), "48:00:00");
    }
}
