use super::core::{OrderRepository, ORDER_COLUMNS};
use crate::domain::order::Order;
use crate::domain::types::{OrderState, OrderType};
use crate::repository::codec::{read_bool, read_date, read_decimal, read_enum, read_reasons};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row};

impl OrderRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按主键查询订单
    pub fn find_by_id(&self, order_id: i64) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT order_id, {} FROM orders WHERE order_id = ?1",
            ORDER_COLUMNS.join(", ")
        );
        let mut stmt = conn.prepare(&sql)?;

        let order = stmt
            .query_row(params![order_id], |row| self.map_row(row))
            .optional()?;
        Ok(order)
    }

    /// 按主键获取订单（不存在返回 NotFound）
    pub fn get(&self, order_id: i64) -> RepositoryResult<Order> {
        self.find_by_id(order_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Order".to_string(),
                id: order_id.to_string(),
            })
    }

    /// 全部订单主键（升序）
    pub fn list_ids(&self) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare("SELECT order_id FROM orders ORDER BY order_id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<SqliteResult<Vec<i64>>>()?;

        Ok(ids)
    }

    /// 映射数据库行到 Order
    fn map_row(&self, row: &Row) -> SqliteResult<Order> {
        Ok(Order {
            order_id: Some(row.get("order_id")?),
            number: row.get("number")?,
            name: row.get("name")?,
            state: read_enum(row, "state", OrderState::from_db_str)?,
            order_type: read_enum(row, "order_type", OrderType::from_db_str)?,
            product_id: row.get("product_id")?,
            technology_id: row.get("technology_id")?,
            technology_prototype_id: row.get("technology_prototype_id")?,

            planned_quantity: read_decimal(row, "planned_quantity")?,
            commissioned_planned_quantity: read_decimal(row, "commissioned_planned_quantity")?,
            commissioned_corrected_quantity: read_decimal(row, "commissioned_corrected_quantity")?,
            done_quantity: read_decimal(row, "done_quantity")?,
            wastes_quantity: read_decimal(row, "wastes_quantity")?,
            amount_of_product_produced: read_decimal(row, "amount_of_product_produced")?,
            remaining_amount_of_product_to_produce: read_decimal(
                row,
                "remaining_amount_of_product_to_produce",
            )?,
            type_of_production_recording: row.get("type_of_production_recording")?,

            start_date: read_date(row, "start_date")?,
            finish_date: read_date(row, "finish_date")?,
            date_from: read_date(row, "date_from")?,
            date_to: read_date(row, "date_to")?,
            corrected_date_from: read_date(row, "corrected_date_from")?,
            corrected_date_to: read_date(row, "corrected_date_to")?,
            effective_date_from: read_date(row, "effective_date_from")?,
            effective_date_to: read_date(row, "effective_date_to")?,
            source_corrected_date_from: read_date(row, "source_corrected_date_from")?,
            source_corrected_date_to: read_date(row, "source_corrected_date_to")?,
            source_start_date: read_date(row, "source_start_date")?,
            source_finish_date: read_date(row, "source_finish_date")?,
            dates_changed: read_bool(row, "dates_changed")?,

            type_of_correction_causes: read_reasons(row, "type_of_correction_causes")?,
            reason_types_correction_date_from: read_reasons(
                row,
                "reason_types_correction_date_from",
            )?,
            reason_types_correction_date_to: read_reasons(row, "reason_types_correction_date_to")?,
            reason_types_deviations_of_effective_start: read_reasons(
                row,
                "reason_types_deviations_of_effective_start",
            )?,
            reason_types_deviations_of_effective_end: read_reasons(
                row,
                "reason_types_deviations_of_effective_end",
            )?,

            comment_reason_type_correction_date_from: row
                .get("comment_reason_type_correction_date_from")?,
            comment_reason_type_correction_date_to: row
                .get("comment_reason_type_correction_date_to")?,
            comment_reason_deviation_effective_start: row
                .get("comment_reason_deviation_effective_start")?,
            comment_reason_deviation_effective_end: row
                .get("comment_reason_deviation_effective_end")?,
            comment_reason_type_deviations_quantity: row
                .get("comment_reason_type_deviations_quantity")?,

            external_number: row.get("external_number")?,
            external_synchronized: read_bool(row, "external_synchronized")?,
            include_tpz: read_bool(row, "include_tpz")?,
            include_additional_time: read_bool(row, "include_additional_time")?,
            worker_to_change: row.get("worker_to_change")?,
        })
    }
}
