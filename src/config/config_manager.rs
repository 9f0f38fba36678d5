// ==========================================
// 生产订单管理 - 配置管理器
// ==========================================
// 职责: 订单策略参数加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::order_policy_trait::OrderPolicyReader;
use crate::db::open_sqlite_connection;
use crate::domain::parameter::OrderParameter;
use crate::engine::audit_recorder::DEFAULT_AUDIT_DATE_TIME_FORMAT;
use crate::engine::number::DEFAULT_SCALE;
use async_trait::async_trait;
use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// 小数位上限（rust_decimal 最大 28）
const MAX_SCALE: u32 = 28;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![
                key,
                value,
                Local::now().naive_local().format("%Y-%m-%d %H:%M:%S").to_string()
            ],
        )?;
        Ok(())
    }

    /// 读取布尔开关（true/false/1/0，忽略大小写）
    ///
    /// 缺失返回 false，格式错误告警后返回 false
    fn get_flag(&self, key: &str) -> Result<bool, Box<dyn Error>> {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(false);
        };
        match parse_flag(&raw) {
            Some(flag) => Ok(flag),
            None => {
                warn!(config_key = key, raw_value = %raw, "布尔配置格式错误，使用默认值 false");
                Ok(false)
            }
        }
    }
}

/// 时间格式是否可被 chrono 完整解析（含未知占位符即无效）
pub fn is_valid_date_time_format(pattern: &str) -> bool {
    StrftimeItems::new(pattern).all(|item| !matches!(item, Item::Error))
}

/// 解析布尔配置值
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

// ==========================================
// OrderPolicyReader Trait 实现
// ==========================================
#[async_trait]
impl OrderPolicyReader for ConfigManager {
    async fn get_order_parameter(&self) -> Result<OrderParameter, Box<dyn Error>> {
        Ok(OrderParameter {
            reason_needed_when_correcting_date_from: self
                .get_flag(config_keys::REASON_NEEDED_WHEN_CORRECTING_DATE_FROM)?,
            reason_needed_when_correcting_date_to: self
                .get_flag(config_keys::REASON_NEEDED_WHEN_CORRECTING_DATE_TO)?,
            reason_needed_when_delayed_effective_date_from: self
                .get_flag(config_keys::REASON_NEEDED_WHEN_DELAYED_EFFECTIVE_DATE_FROM)?,
            reason_needed_when_earlier_effective_date_from: self
                .get_flag(config_keys::REASON_NEEDED_WHEN_EARLIER_EFFECTIVE_DATE_FROM)?,
            reason_needed_when_delayed_effective_date_to: self
                .get_flag(config_keys::REASON_NEEDED_WHEN_DELAYED_EFFECTIVE_DATE_TO)?,
            reason_needed_when_earlier_effective_date_to: self
                .get_flag(config_keys::REASON_NEEDED_WHEN_EARLIER_EFFECTIVE_DATE_TO)?,
            reason_needed_when_correcting_the_requested_volume: self
                .get_flag(config_keys::REASON_NEEDED_WHEN_CORRECTING_THE_REQUESTED_VOLUME)?,
            include_tpz_ps: self.get_flag(config_keys::INCLUDE_TPZ_PS)?,
            include_additional_time_ps: self.get_flag(config_keys::INCLUDE_ADDITIONAL_TIME_PS)?,
        })
    }

    async fn get_number_scale(&self) -> Result<u32, Box<dyn Error>> {
        let Some(raw) = self.get_config_value(config_keys::NUMBER_SCALE)? else {
            return Ok(DEFAULT_SCALE);
        };
        match raw.trim().parse::<u32>() {
            Ok(scale) if scale <= MAX_SCALE => Ok(scale),
            _ => {
                warn!(
                    config_key = config_keys::NUMBER_SCALE,
                    raw_value = %raw,
                    "小数位配置无效，使用默认值"
                );
                Ok(DEFAULT_SCALE)
            }
        }
    }

    async fn get_audit_date_time_format(&self) -> Result<String, Box<dyn Error>> {
        let Some(raw) = self
            .get_config_value(config_keys::AUDIT_DATE_TIME_FORMAT)?
            .filter(|v| !v.trim().is_empty())
        else {
            return Ok(DEFAULT_AUDIT_DATE_TIME_FORMAT.to_string());
        };
        if is_valid_date_time_format(&raw) {
            return Ok(raw);
        }
        warn!(
            config_key = config_keys::AUDIT_DATE_TIME_FORMAT,
            raw_value = %raw,
            "审计时间格式无效，使用默认值"
        );
        Ok(DEFAULT_AUDIT_DATE_TIME_FORMAT.to_string())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 日期修正原因
    pub const REASON_NEEDED_WHEN_CORRECTING_DATE_FROM: &str =
        "reason_needed_when_correcting_date_from";
    pub const REASON_NEEDED_WHEN_CORRECTING_DATE_TO: &str = "reason_needed_when_correcting_date_to";

    // 实际日期偏差原因
    pub const REASON_NEEDED_WHEN_DELAYED_EFFECTIVE_DATE_FROM: &str =
        "reason_needed_when_delayed_effective_date_from";
    pub const REASON_NEEDED_WHEN_EARLIER_EFFECTIVE_DATE_FROM: &str =
        "reason_needed_when_earlier_effective_date_from";
    pub const REASON_NEEDED_WHEN_DELAYED_EFFECTIVE_DATE_TO: &str =
        "reason_needed_when_delayed_effective_date_to";
    pub const REASON_NEEDED_WHEN_EARLIER_EFFECTIVE_DATE_TO: &str =
        "reason_needed_when_earlier_effective_date_to";

    // 数量修正原因
    pub const REASON_NEEDED_WHEN_CORRECTING_THE_REQUESTED_VOLUME: &str =
        "reason_needed_when_correcting_the_requested_volume";

    // 新订单附加设置
    pub const INCLUDE_TPZ_PS: &str = "include_tpz_ps";
    pub const INCLUDE_ADDITIONAL_TIME_PS: &str = "include_additional_time_ps";

    // 数值与审计格式
    pub const NUMBER_SCALE: &str = "number_scale";
    pub const AUDIT_DATE_TIME_FORMAT: &str = "audit_date_time_format";
}
