// ==========================================
// 生产订单管理 - 列值编解码
// ==========================================
// 约定:
// - 日期: "%Y-%m-%d %H:%M:%S" 文本
// - 数量: Decimal 文本（保留 scale）
// - 枚举: 持久化字符串值
// - 原因集合: JSON 数组文本
// 解码失败统一转为 FromSqlConversionFailure，仓储层再映射为 FieldValueError
// ==========================================

use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::types::{Type, Value};
use rusqlite::Row;
use rust_decimal::Decimal;
use std::str::FromStr;

pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ===== 编码 =====

pub fn text_value(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |s| Value::Text(s.to_string()))
}

pub fn date_value(value: Option<NaiveDateTime>) -> Value {
    value.map_or(Value::Null, |d| {
        Value::Text(d.format(DATE_TIME_FORMAT).to_string())
    })
}

pub fn decimal_value(value: Option<Decimal>) -> Value {
    value.map_or(Value::Null, |d| Value::Text(d.to_string()))
}

pub fn bool_value(value: bool) -> Value {
    Value::Integer(i64::from(value))
}

pub fn reasons_value(reasons: &[String]) -> RepositoryResult<Value> {
    Ok(Value::Text(serde_json::to_string(reasons)?))
}

// ===== 解码 =====

fn conversion_error(
    row: &Row,
    column: &str,
    err: impl std::fmt::Display,
) -> rusqlite::Error {
    let index = row.as_ref().column_index(column).unwrap_or_default();
    rusqlite::Error::FromSqlConversionFailure(
        index,
        Type::Text,
        format!("{}: {}", column, err).into(),
    )
}

pub fn read_date(row: &Row, column: &str) -> rusqlite::Result<Option<NaiveDateTime>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|s| {
        NaiveDateTime::parse_from_str(&s, DATE_TIME_FORMAT)
            .map_err(|e| conversion_error(row, column, e))
    })
    .transpose()
}

pub fn read_decimal(row: &Row, column: &str) -> rusqlite::Result<Option<Decimal>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|s| Decimal::from_str(&s).map_err(|e| conversion_error(row, column, e)))
        .transpose()
}

pub fn read_reasons(row: &Row, column: &str) -> rusqlite::Result<Vec<String>> {
    let raw: Option<String> = row.get(column)?;
    match raw {
        Some(s) if !s.trim().is_empty() => {
            serde_json::from_str(&s).map_err(|e| conversion_error(row, column, e))
        }
        _ => Ok(vec![]),
    }
}

pub fn read_bool(row: &Row, column: &str) -> rusqlite::Result<bool> {
    let raw: i64 = row.get(column)?;
    Ok(raw != 0)
}

/// 按持久化字符串解析枚举
pub fn read_enum<T>(
    row: &Row,
    column: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(column)?;
    parse(&raw).ok_or_else(|| conversion_error(row, column, format!("未知取值 '{}'", raw)))
}

/// 可空枚举
pub fn read_enum_opt<T>(
    row: &Row,
    column: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|s| parse(&s).ok_or_else(|| conversion_error(row, column, format!("未知取值 '{}'", s))))
        .transpose()
}
