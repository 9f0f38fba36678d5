// ==========================================
// 策略配置集成测试
// ==========================================
// 覆盖: config_kv 读取、默认值、非法值回退，以及策略对保存流程的影响
// ==========================================


use chrono::NaiveDate;
use mes_orders::config::{config_keys, OrderPolicyReader};
use mes_orders::domain::types::OrderState;
use mes_orders::domain::{Order, OrderField, ReasonKind};
use mes_orders::engine::{DEFAULT_AUDIT_DATE_TIME_FORMAT, DEFAULT_SCALE};
use rust_decimal::Decimal;
use test_helpers::TestContext;

#[tokio::test]
async fn test_defaults_when_config_is_empty() {
    let ctx = TestContext::new().unwrap();
    let config = ctx.config_manager().unwrap();

    let parameter = config.get_order_parameter().await.unwrap();
    assert!(!parameter.reason_needed_when_correcting_date_from);
    assert!(!parameter.reason_needed_when_correcting_the_requested_volume);
    assert!(!parameter.include_tpz_ps);

    assert_eq!(config.get_number_scale().await.unwrap(), DEFAULT_SCALE);
    assert_eq!(
        config.get_audit_date_time_format().await.unwrap(),
        DEFAULT_AUDIT_DATE_TIME_FORMAT
    );
}

#[tokio::test]
async fn test_invalid_values_fall_back_to_defaults() {
    let ctx = TestContext::new().unwrap();
    let config = ctx.config_manager().unwrap();

    config
        .set_config_value(config_keys::REASON_NEEDED_WHEN_CORRECTING_DATE_TO, "yes")
        .unwrap();
    config.set_config_value(config_keys::NUMBER_SCALE, "40").unwrap();
    config
        .set_config_value(config_keys::AUDIT_DATE_TIME_FORMAT, "   ")
        .unwrap();

    let parameter = config.get_order_parameter().await.unwrap();
    assert!(!parameter.reason_needed_when_correcting_date_to);
    assert_eq!(config.get_number_scale().await.unwrap(), DEFAULT_SCALE);
    assert_eq!(
        config.get_audit_date_time_format().await.unwrap(),
        DEFAULT_AUDIT_DATE_TIME_FORMAT
    );
}

#[tokio::test]
async fn test_stored_policy_drives_save_flow() {
    let ctx = TestContext::new().unwrap();
    let config = ctx.config_manager().unwrap();
    config
        .set_config_value(config_keys::REASON_NEEDED_WHEN_CORRECTING_DATE_TO, "TRUE")
        .unwrap();
    config.set_config_value(config_keys::NUMBER_SCALE, "2").unwrap();
    config
        .set_config_value(config_keys::AUDIT_DATE_TIME_FORMAT, "%d.%m.%Y %H:%M")
        .unwrap();

    let api = ctx.order_api(config, "dispatcher");

    // 新建: 初始记录使用配置的时间格式
    let mut order = Order::new("ORD-CFG");
    order.product_id = Some("P-1".to_string());
    order.planned_quantity = Some(Decimal::new(10_127, 3));
    let created = api.create_order(order).await.unwrap();
    assert!(created.saved);
    assert_eq!(
        created.order.commissioned_planned_quantity,
        Some(Decimal::new(1013, 2))
    );
    assert_eq!(created.audit_record.unwrap().date_and_time.len(), 16);

    // 进入执行中后修正结束日期: 缺少原因被拒绝
    let id = created.order.order_id.unwrap();
    let mut in_progress = api.get_order(id).unwrap();
    in_progress.state = OrderState::InProgress;
    ctx.order_repo.update(&in_progress).unwrap();

    let mut edited = in_progress.clone();
    edited.corrected_date_to = Some(
        NaiveDate::from_ymd_opt(2025, 7, 1)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap(),
    );
    let result = api.save_order(edited).await.unwrap();
    assert!(!result.saved);
    assert!(result
        .validation
        .error_for(OrderField::Reasons(ReasonKind::CorrectionDateTo))
        .is_some());
}

#[tokio::test]
async fn test_unparseable_audit_format_falls_back_to_default() {
    let ctx = TestContext::new().unwrap();
    let config = ctx.config_manager().unwrap();
    config
        .set_config_value(config_keys::AUDIT_DATE_TIME_FORMAT, "%Y-%Q")
        .unwrap();

    assert_eq!(
        config.get_audit_date_time_format().await.unwrap(),
        DEFAULT_AUDIT_DATE_TIME_FORMAT
    );

    // 新建订单不因格式错误中断，初始记录使用默认格式
    let api = ctx.order_api(config, "dispatcher");
    let mut order = Order::new("ORD-FMT");
    order.product_id = Some("P-1".to_string());
    order.planned_quantity = Some(Decimal::new(5, 0));
    let created = api.create_order(order).await.unwrap();
    assert!(created.saved);
    assert!(created.audit_error.is_none());
    assert_eq!(created.audit_record.unwrap().date_and_time.len(), 19);
}
