use crate::domain::order::{Order, OrderDateField, ReasonKind, SOURCE_DATE_FIELDS};
use crate::repository::codec::{
    bool_value, date_value, decimal_value, reasons_value, text_value,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction};
use std::sync::{Arc, Mutex};

/// orders 表的可写列（不含主键），顺序与 order_values 一致
pub(super) const ORDER_COLUMNS: [&str; 43] = [
    "number",
    "name",
    "state",
    "order_type",
    "product_id",
    "technology_id",
    "technology_prototype_id",
    "planned_quantity",
    "commissioned_planned_quantity",
    "commissioned_corrected_quantity",
    "done_quantity",
    "wastes_quantity",
    "amount_of_product_produced",
    "remaining_amount_of_product_to_produce",
    "type_of_production_recording",
    "start_date",
    "finish_date",
    "date_from",
    "date_to",
    "corrected_date_from",
    "corrected_date_to",
    "effective_date_from",
    "effective_date_to",
    "source_corrected_date_from",
    "source_corrected_date_to",
    "source_start_date",
    "source_finish_date",
    "dates_changed",
    "type_of_correction_causes",
    "reason_types_correction_date_from",
    "reason_types_correction_date_to",
    "reason_types_deviations_of_effective_start",
    "reason_types_deviations_of_effective_end",
    "comment_reason_type_correction_date_from",
    "comment_reason_type_correction_date_to",
    "comment_reason_deviation_effective_start",
    "comment_reason_deviation_effective_end",
    "comment_reason_type_deviations_quantity",
    "external_number",
    "external_synchronized",
    "include_tpz",
    "include_additional_time",
    "worker_to_change",
];

const WORKING_DATE_FIELDS: [OrderDateField; 8] = [
    OrderDateField::StartDate,
    OrderDateField::FinishDate,
    OrderDateField::DateFrom,
    OrderDateField::DateTo,
    OrderDateField::CorrectedDateFrom,
    OrderDateField::CorrectedDateTo,
    OrderDateField::EffectiveDateFrom,
    OrderDateField::EffectiveDateTo,
];

const REASON_COLUMNS: [ReasonKind; 5] = [
    ReasonKind::CorrectionCause,
    ReasonKind::CorrectionDateFrom,
    ReasonKind::CorrectionDateTo,
    ReasonKind::DeviationEffectiveStart,
    ReasonKind::DeviationEffectiveEnd,
];

// ==========================================
// OrderRepository - 订单仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    /// 创建新的订单仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 在同一事务内执行多条写入
    ///
    /// 闭包返回 Err 时整个事务回滚
    pub fn in_transaction<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> RepositoryResult<T>,
    {
        let mut conn = self.get_conn()?;
        let mut tx = conn.transaction()?;

        let value = f(&mut tx)?;

        tx.commit()?;
        Ok(value)
    }

    /// 插入订单
    ///
    /// # 返回
    /// - `Ok(order_id)`: 新分配的主键
    /// - `Err(UniqueConstraintViolation)`: 订单号重复
    pub fn insert(&self, order: &Order) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_tx(&conn, order)
    }

    /// 插入订单（调用方持有连接或事务）
    pub fn insert_tx(conn: &Connection, order: &Order) -> RepositoryResult<i64> {
        let values = order_values(order)?;

        let placeholders = (1..=ORDER_COLUMNS.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO orders ({}) VALUES ({})",
            ORDER_COLUMNS.join(", "),
            placeholders
        );

        conn.execute(&sql, params_from_iter(values))?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新订单（整行覆盖）
    ///
    /// # 返回
    /// - `Err(NotFound)`: 订单未持久化或不存在
    pub fn update(&self, order: &Order) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::update_tx(&conn, order)
    }

    /// 更新订单（调用方持有连接或事务）
    pub fn update_tx(conn: &Connection, order: &Order) -> RepositoryResult<()> {
        let order_id = order.order_id.ok_or_else(|| RepositoryError::NotFound {
            entity: "Order".to_string(),
            id: order.number.clone(),
        })?;

        let mut values = order_values(order)?;
        values.push(Value::Integer(order_id));

        let assignments = ORDER_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE orders SET {} WHERE order_id = ?{}",
            assignments,
            ORDER_COLUMNS.len() + 1
        );

        let rows = conn.execute(&sql, params_from_iter(values))?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Order".to_string(),
                id: order_id.to_string(),
            });
        }
        Ok(())
    }
}

/// 按 ORDER_COLUMNS 顺序生成列值
fn order_values(order: &Order) -> RepositoryResult<Vec<Value>> {
    let mut values = vec![
        Value::Text(order.number.clone()),
        text_value(order.name.as_deref()),
        Value::Text(order.state.to_db_str().to_string()),
        Value::Text(order.order_type.to_db_str().to_string()),
        text_value(order.product_id.as_deref()),
        text_value(order.technology_id.as_deref()),
        text_value(order.technology_prototype_id.as_deref()),
        decimal_value(order.planned_quantity),
        decimal_value(order.commissioned_planned_quantity),
        decimal_value(order.commissioned_corrected_quantity),
        decimal_value(order.done_quantity),
        decimal_value(order.wastes_quantity),
        decimal_value(order.amount_of_product_produced),
        decimal_value(order.remaining_amount_of_product_to_produce),
        text_value(order.type_of_production_recording.as_deref()),
    ];

    values.extend(
        WORKING_DATE_FIELDS
            .iter()
            .chain(SOURCE_DATE_FIELDS.iter())
            .map(|field| date_value(order.date(*field))),
    );
    values.push(bool_value(order.dates_changed));

    for kind in REASON_COLUMNS {
        values.push(reasons_value(order.reasons(kind))?);
    }

    values.extend([
        text_value(order.comment_reason_type_correction_date_from.as_deref()),
        text_value(order.comment_reason_type_correction_date_to.as_deref()),
        text_value(order.comment_reason_deviation_effective_start.as_deref()),
        text_value(order.comment_reason_deviation_effective_end.as_deref()),
        text_value(order.comment_reason_type_deviations_quantity.as_deref()),
        text_value(order.external_number.as_deref()),
        bool_value(order.external_synchronized),
        bool_value(order.include_tpz),
        bool_value(order.include_additional_time),
        text_value(order.worker_to_change.as_deref()),
    ]);

    debug_assert_eq!(values.len(), ORDER_COLUMNS.len());
    Ok(values)
}
