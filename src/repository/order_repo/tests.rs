use super::OrderRepository;
use crate::domain::order::Order;
use crate::domain::types::{OrderState, OrderType};
use crate::repository::error::RepositoryError;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    crate::db::init_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

fn day(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, d)
        .unwrap()
        .and_hms_opt(8, 30, 0)
        .unwrap()
}

fn make_test_order(number: &str) -> Order {
    let mut order = Order::new(number);
    order.name = Some("测试订单".to_string());
    order.state = OrderState::InProgress;
    order.order_type = OrderType::WithOwnTechnology;
    order.product_id = Some("P-100".to_string());
    order.planned_quantity = Some(Decimal::from_str("12.50000").unwrap());
    order.commissioned_planned_quantity = Some(Decimal::from_str("12.50000").unwrap());
    order.start_date = Some(day(3));
    order.effective_date_from = Some(day(3));
    order.source_start_date = Some(day(1));
    order.dates_changed = true;
    order
        .reason_types_deviations_of_effective_start
        .push("MACHINE_FAILURE".to_string());
    order.external_synchronized = false;
    order.include_tpz = true;
    order
}

#[test]
fn test_insert_and_find_by_id() {
    let repo = OrderRepository::new(setup_test_db());

    let order = make_test_order("ORD-001");
    let id = repo.insert(&order).unwrap();
    assert!(id > 0);

    let found = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(found.order_id, Some(id));
    assert_eq!(found.number, "ORD-001");
    assert_eq!(found.state, OrderState::InProgress);
    assert_eq!(found.order_type, OrderType::WithOwnTechnology);
    assert_eq!(found.planned_quantity.unwrap().to_string(), "12.50000");
    assert_eq!(found.start_date, Some(day(3)));
    assert_eq!(found.source_start_date, Some(day(1)));
    assert_eq!(found.finish_date, None);
    assert!(found.dates_changed);
    assert_eq!(
        found.reason_types_deviations_of_effective_start,
        vec!["MACHINE_FAILURE".to_string()]
    );
    assert!(found.type_of_correction_causes.is_empty());
    assert!(!found.external_synchronized);
    assert!(found.include_tpz);

    let mut expected = order.clone();
    expected.order_id = Some(id);
    assert_eq!(found, expected);
}

#[test]
fn test_find_missing_and_get() {
    let repo = OrderRepository::new(setup_test_db());

    assert!(repo.find_by_id(42).unwrap().is_none());
    match repo.get(42) {
        Err(RepositoryError::NotFound { entity, id }) => {
            assert_eq!(entity, "Order");
            assert_eq!(id, "42");
        }
        other => panic!("unexpected result: {:?}", other.map(|o| o.number)),
    }
}

#[test]
fn test_update_overwrites_row() {
    let repo = OrderRepository::new(setup_test_db());

    let mut order = make_test_order("ORD-002");
    order.order_id = Some(repo.insert(&order).unwrap());

    order.state = OrderState::Completed;
    order.effective_date_to = Some(day(9));
    order.dates_changed = false;
    order.reason_types_deviations_of_effective_start.clear();
    order.worker_to_change = Some("shift-lead".to_string());
    repo.update(&order).unwrap();

    let found = repo.get(order.order_id.unwrap()).unwrap();
    assert_eq!(found, order);
}

#[test]
fn test_update_requires_identity() {
    let repo = OrderRepository::new(setup_test_db());

    let order = make_test_order("ORD-003");
    assert!(matches!(
        repo.update(&order),
        Err(RepositoryError::NotFound { .. })
    ));

    let mut ghost = make_test_order("ORD-004");
    ghost.order_id = Some(777);
    assert!(matches!(
        repo.update(&ghost),
        Err(RepositoryError::NotFound { .. })
    ));
}

#[test]
fn test_duplicate_number_rejected() {
    let repo = OrderRepository::new(setup_test_db());

    repo.insert(&make_test_order("ORD-DUP")).unwrap();
    assert!(matches!(
        repo.insert(&make_test_order("ORD-DUP")),
        Err(RepositoryError::UniqueConstraintViolation(_))
    ));
}

#[test]
fn test_list_ids() {
    let repo = OrderRepository::new(setup_test_db());

    let a = repo.insert(&make_test_order("ORD-A")).unwrap();
    let b = repo.insert(&make_test_order("ORD-B")).unwrap();
    assert_eq!(repo.list_ids().unwrap(), vec![a, b]);
}

#[test]
fn test_bad_persisted_value_is_field_error() {
    let conn = setup_test_db();
    let repo = OrderRepository::new(conn.clone());
    let id = repo.insert(&make_test_order("ORD-BAD")).unwrap();

    conn.lock()
        .unwrap()
        .execute(
            "UPDATE orders SET state = 'unknown' WHERE order_id = ?1",
            [id],
        )
        .unwrap();

    assert!(matches!(
        repo.find_by_id(id),
        Err(RepositoryError::FieldValueError { .. })
    ));
}

#[test]
fn test_in_transaction_rolls_back_on_error() {
    let repo = OrderRepository::new(setup_test_db());
    let existing = repo.insert(&make_test_order("ORD-KEEP")).unwrap();

    let result = repo.in_transaction(|tx| {
        OrderRepository::insert_tx(tx, &make_test_order("ORD-LOST"))?;
        OrderRepository::insert_tx(tx, &make_test_order("ORD-KEEP"))
    });
    assert!(matches!(
        result,
        Err(RepositoryError::UniqueConstraintViolation(_))
    ));
    assert_eq!(repo.list_ids().unwrap(), vec![existing]);

    let committed = repo
        .in_transaction(|tx| OrderRepository::insert_tx(tx, &make_test_order("ORD-NEW")))
        .unwrap();
    assert_eq!(repo.list_ids().unwrap(), vec![existing, committed]);
}
