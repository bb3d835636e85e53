use actix_web::{http::StatusCode, web};
use market_payment_engine::{
    db_types::{CheckoutManifest, ManifestEntry, OrderStatus},
    traits::GatewaySession,
    OrderFlowApi,
};
use mps_common::Money;
use serde_json::json;

use crate::{
    endpoint_tests::{
        helpers::{address, client, order, order_item, product, sign, webhook_request},
        mocks::{MockGateway, MockMarketplaceDb},
    },
    webhook_routes::GatewayWebhookRoute,
};

fn completed_event(session_id: &str) -> serde_json::Value {
    json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": session_id,
            "payment_status": "paid",
            "metadata": {}
        }}
    })
}

fn paid_session(session_id: &str) -> GatewaySession {
    GatewaySession {
        session_id: session_id.to_string(),
        paid: true,
        manifest: Some(CheckoutManifest {
            items: vec![ManifestEntry { product_id: 5, quantity: 2, unit_price: Money::from_cents(1000) }],
            client_id: Some(1),
            address_id: Some(3),
        }),
    }
}

#[actix_web::test]
async fn signed_completion_events_finalize_the_order() {
    let event = completed_event("cs_1");
    let signature = sign(&event);
    let (status, body) = webhook_request(Some(&signature), &event, |cfg| {
        let mut gateway = MockGateway::new();
        gateway.expect_fetch_checkout_session().returning(|id| Ok(Some(paid_session(id))));
        let mut db = MockMarketplaceDb::new();
        db.expect_fetch_client_by_id().returning(|_| Ok(Some(client(1, "alice"))));
        db.expect_fetch_address_by_id().returning(|id| Ok(Some(address(id, 1))));
        db.expect_fetch_products_by_ids()
            .returning(|_| Ok(vec![product(5, 2, "Dune", Money::from_cents(1000), 10)]));
        db.expect_insert_order().times(1).returning(|_, _| Ok((order(77, "cs_1", 1, OrderStatus::Paid), true)));
        db.expect_fetch_cart_for_client().returning(|_| Ok(None));
        db.expect_fetch_order_items()
            .returning(|_| Ok(vec![order_item(500, 77, 5, "Dune", 2, Money::from_cents(1000))]));
        cfg.app_data(web::Data::new(OrderFlowApi::new(db, gateway)))
            .service(GatewayWebhookRoute::<MockMarketplaceDb, MockGateway>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""received":true"#), "{body}");
}

#[actix_web::test]
async fn payment_succeeded_events_finalize_the_order_too() {
    let event = json!({
        "id": "evt_4",
        "type": "payment_succeeded",
        "data": { "object": {
            "id": "cs_1",
            "payment_status": "paid",
            "metadata": {}
        }}
    });
    let signature = sign(&event);
    let (status, body) = webhook_request(Some(&signature), &event, |cfg| {
        let mut gateway = MockGateway::new();
        gateway.expect_fetch_checkout_session().returning(|id| Ok(Some(paid_session(id))));
        let mut db = MockMarketplaceDb::new();
        db.expect_fetch_client_by_id().returning(|_| Ok(Some(client(1, "alice"))));
        db.expect_fetch_address_by_id().returning(|id| Ok(Some(address(id, 1))));
        db.expect_fetch_products_by_ids()
            .returning(|_| Ok(vec![product(5, 2, "Dune", Money::from_cents(1000), 10)]));
        db.expect_insert_order().times(1).returning(|_, _| Ok((order(77, "cs_1", 1, OrderStatus::Paid), true)));
        db.expect_fetch_cart_for_client().returning(|_| Ok(None));
        db.expect_fetch_order_items()
            .returning(|_| Ok(vec![order_item(500, 77, 5, "Dune", 2, Money::from_cents(1000))]));
        cfg.app_data(web::Data::new(OrderFlowApi::new(db, gateway)))
            .service(GatewayWebhookRoute::<MockMarketplaceDb, MockGateway>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""received":true"#), "{body}");
}

#[actix_web::test]
async fn unsigned_events_are_rejected() {
    let event = completed_event("cs_1");
    let (status, _) = webhook_request(None, &event, |cfg| {
        let mut gateway = MockGateway::new();
        gateway.expect_fetch_checkout_session().never();
        cfg.app_data(web::Data::new(OrderFlowApi::new(MockMarketplaceDb::new(), gateway)))
            .service(GatewayWebhookRoute::<MockMarketplaceDb, MockGateway>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn tampered_events_are_rejected() {
    let event = completed_event("cs_1");
    let mut tampered = event.clone();
    tampered["data"]["object"]["id"] = json!("cs_other");
    // Signature covers the original body, not the one delivered.
    let signature = sign(&event);
    let (status, _) = webhook_request(Some(&signature), &tampered, |cfg| {
        let mut gateway = MockGateway::new();
        gateway.expect_fetch_checkout_session().never();
        cfg.app_data(web::Data::new(OrderFlowApi::new(MockMarketplaceDb::new(), gateway)))
            .service(GatewayWebhookRoute::<MockMarketplaceDb, MockGateway>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unrelated_event_types_are_acknowledged_and_ignored() {
    let event = json!({
        "id": "evt_2",
        "type": "invoice.created",
        "data": { "object": {} }
    });
    let signature = sign(&event);
    let (status, body) = webhook_request(Some(&signature), &event, |cfg| {
        let mut gateway = MockGateway::new();
        gateway.expect_fetch_checkout_session().never();
        cfg.app_data(web::Data::new(OrderFlowApi::new(MockMarketplaceDb::new(), gateway)))
            .service(GatewayWebhookRoute::<MockMarketplaceDb, MockGateway>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""received":true"#), "{body}");
}

#[actix_web::test]
async fn finalization_failures_are_still_acknowledged() {
    let event = completed_event("cs_gone");
    let signature = sign(&event);
    let (status, body) = webhook_request(Some(&signature), &event, |cfg| {
        let mut gateway = MockGateway::new();
        // The gateway has no such session, so finalization fails. The delivery is acknowledged regardless; retrying
        // it would not make it processable.
        gateway.expect_fetch_checkout_session().returning(|_| Ok(None));
        cfg.app_data(web::Data::new(OrderFlowApi::new(MockMarketplaceDb::new(), gateway)))
            .service(GatewayWebhookRoute::<MockMarketplaceDb, MockGateway>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""received":true"#), "{body}");
}

#[actix_web::test]
async fn unpaid_sessions_are_acknowledged_but_never_finalized() {
    let event = json!({
        "id": "evt_3",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": "cs_1",
            "payment_status": "unpaid",
            "metadata": {}
        }}
    });
    let signature = sign(&event);
    let (status, body) = webhook_request(Some(&signature), &event, |cfg| {
        let mut gateway = MockGateway::new();
        gateway.expect_fetch_checkout_session().never();
        let mut db = MockMarketplaceDb::new();
        db.expect_insert_order().never();
        cfg.app_data(web::Data::new(OrderFlowApi::new(db, gateway)))
            .service(GatewayWebhookRoute::<MockMarketplaceDb, MockGateway>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""received":true"#), "{body}");
}
