//! Integration tests for the order lifecycle.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::Duration;
use rust_decimal::Decimal;

use cleanpro_api::services::orders::{OrderChanges, OrderError};
use cleanpro_core::{OrderStatus, PaymentMethod, PaymentStatus};
use cleanpro_integration_tests::{SentNotification, TestApp, draft};

const SHIRTS_AND_TROUSERS: &[(&str, i64, i64)] = &[("Shirt", 3, 1500), ("Trousers", 2, 2000)];

fn ready_notices(app: &TestApp) -> usize {
    app.notifier
        .sent()
        .iter()
        .filter(|n| matches!(n, SentNotification::OrderReady { .. }))
        .count()
}

fn status_change(status: &str) -> OrderChanges {
    OrderChanges {
        status: Some(status.to_owned()),
        ..OrderChanges::default()
    }
}

// =============================================================================
// Creation
// =============================================================================

#[tokio::test]
async fn test_total_defaults_to_sum_of_items() {
    let app = TestApp::new();
    let order = app
        .create_order(&draft("Jean Marie", "0788123456", SHIRTS_AND_TROUSERS))
        .await;

    assert_eq!(order.total_amount, Decimal::from(8500));
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_method, PaymentMethod::Cash);
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    assert!(order.order_code.as_str().starts_with("DC"));
    assert_eq!(order.order_code.as_str().len(), 11);
}

#[tokio::test]
async fn test_explicit_total_is_kept() {
    let app = TestApp::new();
    let mut input = draft("Jean Marie", "0788123456", SHIRTS_AND_TROUSERS);
    input.total_amount = Some(Decimal::from(8000));

    let order = app.create_order(&input).await;
    assert_eq!(order.total_amount, Decimal::from(8000));
}

#[tokio::test]
async fn test_empty_items_rejected_and_nothing_stored() {
    let app = TestApp::new();
    let err = app
        .state
        .order_service()
        .create_order(&draft("Jean Marie", "0788123456", &[]))
        .await
        .unwrap_err();

    match err {
        OrderError::Validation(errors) => {
            assert_eq!(errors, vec!["At least one item is required".to_owned()]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(app.state.order_service().get_all_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_validation_collects_every_problem() {
    let app = TestApp::new();
    let mut input = draft("", "12345", &[("", 0, -5)]);
    input.client_email = Some("nope".to_owned());
    input.payment_method = Some("Cheque".to_owned());

    let Err(OrderError::Validation(errors)) =
        app.state.order_service().create_order(&input).await
    else {
        panic!("expected validation error");
    };

    assert_eq!(
        errors,
        vec![
            "Client name is required",
            "Valid phone number is required (format: 078XXXXXXX)",
            "Valid email address is required",
            "Valid payment method is required",
            "Item 1: type is required",
            "Item 1: quantity must be at least 1",
            "Item 1: price cannot be negative",
        ]
    );
}

#[tokio::test]
async fn test_confirmation_sent_only_with_email() {
    let app = TestApp::new();
    app.create_order(&draft("No Email", "0788123456", SHIRTS_AND_TROUSERS))
        .await;
    assert!(app.notifier.sent().is_empty());

    let mut input = draft("Alice Uwase", "0789234567", SHIRTS_AND_TROUSERS);
    input.client_email = Some("alice@example.rw".to_owned());
    let order = app.create_order(&input).await;

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(matches!(
        &sent[0],
        SentNotification::OrderConfirmation { order_code, .. } if order_code == order.order_code.as_str()
    ));
}

#[tokio::test]
async fn test_create_succeeds_when_email_fails() {
    let app = TestApp::new();
    app.notifier.set_failing(true);

    let mut input = draft("Alice Uwase", "0789234567", SHIRTS_AND_TROUSERS);
    input.client_email = Some("alice@example.rw".to_owned());
    let order = app.create_order(&input).await;

    assert_eq!(
        app.state.order_service().get_order(order.id).await.unwrap(),
        order
    );
}

// =============================================================================
// Updates and the ready notice
// =============================================================================

#[tokio::test]
async fn test_ready_notice_sent_exactly_once() {
    let app = TestApp::new();
    let mut input = draft("Alice Uwase", "0789234567", SHIRTS_AND_TROUSERS);
    input.client_email = Some("alice@example.rw".to_owned());
    let order = app.create_order(&input).await;
    let orders = app.state.order_service();

    orders.update_order(order.id, &status_change("Washing")).await.unwrap();
    assert_eq!(ready_notices(&app), 0);

    orders.update_order(order.id, &status_change("Ready")).await.unwrap();
    assert_eq!(ready_notices(&app), 1);

    // Ready again, then an unrelated field: no further notices
    orders.update_order(order.id, &status_change("Ready")).await.unwrap();
    orders
        .update_order(
            order.id,
            &OrderChanges {
                payment_status: Some("Paid".to_owned()),
                ..OrderChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ready_notices(&app), 1);
}

#[tokio::test]
async fn test_ready_without_email_sends_nothing() {
    let app = TestApp::new();
    let order = app
        .create_order(&draft("Jean Marie", "0788123456", SHIRTS_AND_TROUSERS))
        .await;

    let updated = app
        .state
        .order_service()
        .update_order(order.id, &status_change("Ready"))
        .await
        .unwrap();

    assert_eq!(updated.status, OrderStatus::Ready);
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_update_changes_only_given_fields() {
    let app = TestApp::new();
    let mut input = draft("Jean Marie", "0788123456", SHIRTS_AND_TROUSERS);
    input.client_email = Some("jean@example.rw".to_owned());
    let order = app.create_order(&input).await;

    let updated = app
        .state
        .order_service()
        .update_order(
            order.id,
            &OrderChanges {
                client_phone: Some("0722000111".to_owned()),
                client_email: Some(String::new()),
                ..OrderChanges::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.client_phone.as_str(), "0722000111");
    assert!(updated.client_email.is_none());
    assert_eq!(updated.client_name, order.client_name);
    assert_eq!(updated.order_code, order.order_code);
    assert_eq!(updated.items, order.items);
}

#[tokio::test]
async fn test_update_rejects_empty_and_invalid_changes() {
    let app = TestApp::new();
    let order = app
        .create_order(&draft("Jean Marie", "0788123456", SHIRTS_AND_TROUSERS))
        .await;
    let orders = app.state.order_service();

    let empty = orders.update_order(order.id, &OrderChanges::default()).await;
    assert!(matches!(empty, Err(OrderError::NoValidFields)));

    let blank = orders.update_order(order.id, &status_change("")).await;
    assert!(matches!(blank, Err(OrderError::NoValidFields)));
    let unchanged = orders.get_order(order.id).await.unwrap();
    assert_eq!(unchanged.status, OrderStatus::Pending);

    let bad = orders.update_order(order.id, &status_change("Lost")).await;
    assert!(matches!(bad, Err(OrderError::Validation(_))));

    let unknown = orders
        .update_order(cleanpro_core::OrderId::new(9999), &status_change("Ready"))
        .await;
    assert!(matches!(unknown, Err(OrderError::NotFound)));
}

// =============================================================================
// Delete, search, stats
// =============================================================================

#[tokio::test]
async fn test_delete_removes_order_with_items() {
    let app = TestApp::new();
    let order = app
        .create_order(&draft("Jean Marie", "0788123456", SHIRTS_AND_TROUSERS))
        .await;
    let orders = app.state.order_service();

    orders.delete_order(order.id).await.unwrap();

    assert!(matches!(orders.get_order(order.id).await, Err(OrderError::NotFound)));
    assert!(matches!(orders.delete_order(order.id).await, Err(OrderError::NotFound)));
    assert!(orders.get_all_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let app = TestApp::new();
    let first = app
        .create_order(&draft("First", "0788123456", SHIRTS_AND_TROUSERS))
        .await;
    let second = app
        .create_order(&draft("Second", "0789234567", SHIRTS_AND_TROUSERS))
        .await;

    let ids: Vec<_> = app
        .state
        .order_service()
        .get_all_orders()
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn test_search_by_phone_fragment() {
    let app = TestApp::new();
    for (name, phone) in [
        ("Jean Marie Nkurunziza", "0788123456"),
        ("Alice Uwase", "0789234567"),
        ("Patrick Mugabo", "0790345678"),
        ("Marie Claire Uwera", "0791456789"),
        ("Emmanuel Habimana", "0792567890"),
    ] {
        app.create_order(&draft(name, phone, SHIRTS_AND_TROUSERS)).await;
    }

    let found = app.state.order_service().search_orders(" 078 ").await.unwrap();

    // Generated codes are digits too, so a code may also contain the fragment
    let mut phones: Vec<&str> = found
        .iter()
        .filter(|o| o.client_phone.as_str().contains("078"))
        .map(|o| o.client_phone.as_str())
        .collect();
    phones.sort_unstable();
    assert_eq!(phones, vec!["0788123456", "0789234567"]);
    assert!(found.iter().all(|o| {
        o.client_phone.as_str().contains("078") || o.order_code.as_str().contains("078")
    }));
}

#[tokio::test]
async fn test_search_by_name_is_case_insensitive() {
    let app = TestApp::new();
    app.create_order(&draft("Alice Uwase", "0789234567", SHIRTS_AND_TROUSERS))
        .await;
    app.create_order(&draft("Patrick Mugabo", "0790345678", SHIRTS_AND_TROUSERS))
        .await;

    let found = app.state.order_service().search_orders("uwase").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].client_name, "Alice Uwase");

    let blank = app.state.order_service().search_orders("   ").await;
    assert!(matches!(blank, Err(OrderError::EmptyQuery)));
}

#[tokio::test]
async fn test_stats_on_fixtures() {
    let app = TestApp::new();

    // Yesterday: unpaid 5000, still pending
    app.clock.advance(-Duration::days(1));
    app.create_order(&draft("Yesterday", "0788000001", &[("Coat", 1, 5000)]))
        .await;
    app.clock.advance(Duration::days(1));

    // Today: paid 8500 picked up, unpaid 10000, partial 3000
    let mut paid = draft("Paid", "0788000002", SHIRTS_AND_TROUSERS);
    paid.payment_status = Some("Paid".to_owned());
    paid.status = Some("Picked Up".to_owned());
    app.create_order(&paid).await;

    app.create_order(&draft("Unpaid", "0788000003", &[("Dress", 2, 3000), ("Coat", 1, 4000)]))
        .await;

    let mut partial = draft("Partial", "0788000004", &[("Suit", 1, 3000)]);
    partial.payment_status = Some("Partial".to_owned());
    app.create_order(&partial).await;

    let stats = app.state.order_service().get_stats().await.unwrap();
    assert_eq!(stats.today_orders, 3);
    assert_eq!(stats.pending_orders, 3);
    assert_eq!(stats.today_income, Decimal::from(8500));
    assert_eq!(stats.unpaid_amount, Decimal::from(15000));
}

#[tokio::test]
async fn test_stats_empty() {
    let app = TestApp::new();
    let stats = app.state.order_service().get_stats().await.unwrap();
    assert_eq!(stats.today_orders, 0);
    assert_eq!(stats.pending_orders, 0);
    assert_eq!(stats.today_income, Decimal::ZERO);
    assert_eq!(stats.unpaid_amount, Decimal::ZERO);
}
