use crate::domain::state_change::OrderStateChange;
use crate::domain::types::{OrderState, StateChangeStatus};
use crate::repository::codec::{bool_value, date_value, read_bool, read_date, read_enum, read_enum_opt};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row, Transaction};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    state_change_id, order_id, source_state, target_state,
    source_corrected_date_from, source_corrected_date_to, source_start_date, source_finish_date,
    target_corrected_date_from, target_corrected_date_to, target_start_date, target_finish_date,
    dates_changed, worker, date_and_time, status
"#;

// ==========================================
// OrderStateChangeRepository - 审计记录仓储
// ==========================================
pub struct OrderStateChangeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderStateChangeRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加审计记录
    ///
    /// # 返回
    /// - `Ok(state_change_id)`
    /// - `Err(ForeignKeyViolation)`: 订单不存在
    pub fn insert(&self, change: &OrderStateChange) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        Self::insert_tx(&conn, change)
    }

    /// 在独立保存点内追加审计记录
    ///
    /// 写入失败只回滚本条记录，外层事务继续有效
    pub fn insert_in_savepoint(
        tx: &mut Transaction<'_>,
        change: &OrderStateChange,
    ) -> RepositoryResult<String> {
        let savepoint = tx.savepoint()?;
        let id = Self::insert_tx(&savepoint, change)?;
        savepoint.commit()?;
        Ok(id)
    }

    /// 追加审计记录（调用方持有连接或事务）
    pub fn insert_tx(conn: &Connection, change: &OrderStateChange) -> RepositoryResult<String> {
        conn.execute(
            r#"
            INSERT INTO order_state_change (
                state_change_id, order_id, source_state, target_state,
                source_corrected_date_from, source_corrected_date_to,
                source_start_date, source_finish_date,
                target_corrected_date_from, target_corrected_date_to,
                target_start_date, target_finish_date,
                dates_changed, worker, date_and_time, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                change.state_change_id,
                change.order_id,
                change.source_state.map(|s| s.to_db_str()),
                change.target_state.to_db_str(),
                date_value(change.source_corrected_date_from),
                date_value(change.source_corrected_date_to),
                date_value(change.source_start_date),
                date_value(change.source_finish_date),
                date_value(change.target_corrected_date_from),
                date_value(change.target_corrected_date_to),
                date_value(change.target_start_date),
                date_value(change.target_finish_date),
                bool_value(change.dates_changed),
                change.worker,
                change.date_and_time,
                change.status.to_db_str(),
            ],
        )?;

        Ok(change.state_change_id.clone())
    }

    /// 查询订单的全部审计记录（按写入顺序）
    pub fn find_by_order_id(&self, order_id: i64) -> RepositoryResult<Vec<OrderStateChange>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM order_state_change WHERE order_id = ?1 ORDER BY seq",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let changes = stmt
            .query_map(params![order_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(changes)
    }

    /// 订单的审计记录数
    pub fn count_by_order_id(&self, order_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM order_state_change WHERE order_id = ?1",
            params![order_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn map_row(row: &Row) -> SqliteResult<OrderStateChange> {
    Ok(OrderStateChange {
        state_change_id: row.get("state_change_id")?,
        order_id: row.get("order_id")?,
        source_state: read_enum_opt(row, "source_state", OrderState::from_db_str)?,
        target_state: read_enum(row, "target_state", OrderState::from_db_str)?,
        source_corrected_date_from: read_date(row, "source_corrected_date_from")?,
        source_corrected_date_to: read_date(row, "source_corrected_date_to")?,
        source_start_date: read_date(row, "source_start_date")?,
        source_finish_date: read_date(row, "source_finish_date")?,
        target_corrected_date_from: read_date(row, "target_corrected_date_from")?,
        target_corrected_date_to: read_date(row, "target_corrected_date_to")?,
        target_start_date: read_date(row, "target_start_date")?,
        target_finish_date: read_date(row, "target_finish_date")?,
        dates_changed: read_bool(row, "dates_changed")?,
        worker: row.get("worker")?,
        date_and_time: row.get("date_and_time")?,
        status: read_enum(row, "status", StateChangeStatus::from_db_str)?,
    })
}
