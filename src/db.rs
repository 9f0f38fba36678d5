// ==========================================
// 生产订单管理 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 幂等建表（CREATE TABLE IF NOT EXISTS）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;
use tracing::{info, warn};

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL DEFAULT 'global',
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT,
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS orders (
    order_id INTEGER PRIMARY KEY AUTOINCREMENT,
    number TEXT NOT NULL UNIQUE,
    name TEXT,
    state TEXT NOT NULL,
    order_type TEXT NOT NULL,
    product_id TEXT,
    technology_id TEXT,
    technology_prototype_id TEXT,

    planned_quantity TEXT,
    commissioned_planned_quantity TEXT,
    commissioned_corrected_quantity TEXT,
    done_quantity TEXT,
    wastes_quantity TEXT,
    amount_of_product_produced TEXT,
    remaining_amount_of_product_to_produce TEXT,
    type_of_production_recording TEXT,

    start_date TEXT,
    finish_date TEXT,
    date_from TEXT,
    date_to TEXT,
    corrected_date_from TEXT,
    corrected_date_to TEXT,
    effective_date_from TEXT,
    effective_date_to TEXT,
    source_corrected_date_from TEXT,
    source_corrected_date_to TEXT,
    source_start_date TEXT,
    source_finish_date TEXT,
    dates_changed INTEGER NOT NULL DEFAULT 0,

    type_of_correction_causes TEXT NOT NULL DEFAULT '[]',
    reason_types_correction_date_from TEXT NOT NULL DEFAULT '[]',
    reason_types_correction_date_to TEXT NOT NULL DEFAULT '[]',
    reason_types_deviations_of_effective_start TEXT NOT NULL DEFAULT '[]',
    reason_types_deviations_of_effective_end TEXT NOT NULL DEFAULT '[]',

    comment_reason_type_correction_date_from TEXT,
    comment_reason_type_correction_date_to TEXT,
    comment_reason_deviation_effective_start TEXT,
    comment_reason_deviation_effective_end TEXT,
    comment_reason_type_deviations_quantity TEXT,

    external_number TEXT,
    external_synchronized INTEGER NOT NULL DEFAULT 1,
    include_tpz INTEGER NOT NULL DEFAULT 0,
    include_additional_time INTEGER NOT NULL DEFAULT 0,
    worker_to_change TEXT
);

CREATE TABLE IF NOT EXISTS order_state_change (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    state_change_id TEXT NOT NULL UNIQUE,
    order_id INTEGER NOT NULL REFERENCES orders(order_id),
    source_state TEXT,
    target_state TEXT NOT NULL,
    source_corrected_date_from TEXT,
    source_corrected_date_to TEXT,
    source_start_date TEXT,
    source_finish_date TEXT,
    target_corrected_date_from TEXT,
    target_corrected_date_to TEXT,
    target_start_date TEXT,
    target_finish_date TEXT,
    dates_changed INTEGER NOT NULL,
    worker TEXT NOT NULL,
    date_and_time TEXT NOT NULL,
    status TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_order_state_change_order
    ON order_state_change(order_id, seq);
"#;

/// 建表（幂等）并登记 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    match read_schema_version(conn)? {
        Some(v) if v > CURRENT_SCHEMA_VERSION => {
            warn!(
                found = v,
                expected = CURRENT_SCHEMA_VERSION,
                "数据库 schema_version 高于当前代码版本"
            );
        }
        v => info!(schema_version = ?v, "数据库表结构已就绪"),
    }
    Ok(())
}
